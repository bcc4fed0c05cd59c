//! Sector boundary reconstruction.
//!
//! A sector stores no outline of its own; it is implied by every linedef
//! side that references it. Rebuilding the closed polygon is a one-time
//! load step: chain the directed edges end-to-start, and when the data is
//! too sloppy to chain (open loops, disconnected pieces), fall back to a
//! centroid-angle ordering of the referenced vertices. A sector that still
//! cannot produce 3 points is dropped from rendering and collision alike.

use glam::Vec2;
use smallvec::SmallVec;

use crate::world::geometry::{Level, SectorId};

/// One traversal-directed boundary edge: front references run v1→v2,
/// back references run v2→v1.
#[derive(Clone, Copy, Debug)]
struct DirectedEdge {
    from: Vec2,
    to: Vec2,
}

/// Collect the directed edges bounding `sector`.
fn sector_edges(level: &Level, sector: SectorId) -> Vec<DirectedEdge> {
    let mut edges = Vec::new();

    for (i, ld) in level.linedefs.iter().enumerate() {
        let (Some(v1), Some(v2)) = (
            level.vertices.get(ld.v1 as usize),
            level.vertices.get(ld.v2 as usize),
        ) else {
            log::warn!("linedef #{i} references missing vertices; skipped");
            continue;
        };

        let side_sector = |sd: Option<u16>| {
            sd.and_then(|sd| level.sidedefs.get(sd as usize))
                .map(|sd| sd.sector)
        };

        if side_sector(ld.right_sidedef) == Some(sector) {
            edges.push(DirectedEdge {
                from: v1.pos,
                to: v2.pos,
            });
        }
        if side_sector(ld.left_sidedef) == Some(sector) {
            edges.push(DirectedEdge {
                from: v2.pos,
                to: v1.pos,
            });
        }
    }
    edges
}

/// Chain edges into a closed loop. Returns the boundary in traversal
/// order, or `None` if the walk never closes.
fn chain_edges(edges: &[DirectedEdge]) -> Option<Vec<Vec2>> {
    let first = edges.first()?;
    let mut used: SmallVec<[bool; 32]> = SmallVec::from_elem(false, edges.len());
    used[0] = true;

    let mut points = vec![first.from, first.to];
    let mut current = first.to;
    let mut closed = first.to == first.from;

    // bounded walk guarantees termination on malformed data
    for _ in 0..edges.len() * 2 {
        let Some(next) = edges
            .iter()
            .enumerate()
            .position(|(i, e)| !used[i] && e.from == current)
        else {
            break;
        };
        used[next] = true;
        current = edges[next].to;

        if current == points[0] {
            closed = true;
            break;
        }
        points.push(current);
    }

    (closed && points.len() >= 3).then_some(points)
}

/// Centroid fallback: deduplicate the referenced vertices by exact
/// coordinate and order them by angle around their centroid. Convex-ish,
/// not edge-exact, but usable for irregular sectors.
fn centroid_ordering(edges: &[DirectedEdge]) -> Vec<Vec2> {
    let mut points: Vec<Vec2> = Vec::new();
    for e in edges {
        for p in [e.from, e.to] {
            if !points.contains(&p) {
                points.push(p);
            }
        }
    }
    if points.is_empty() {
        return points;
    }

    let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
    points.sort_by(|a, b| {
        let aa = (a.y - centroid.y).atan2(a.x - centroid.x);
        let ab = (b.y - centroid.y).atan2(b.x - centroid.x);
        aa.total_cmp(&ab)
    });
    points
}

/// Reconstruct the boundary polygon of one sector.
///
/// `None` means the sector is degenerate even after the fallback; it must
/// contribute no floor/ceiling surface and stay invisible to
/// point-location.
pub fn sector_boundary(level: &Level, sector: SectorId) -> Option<Vec<Vec2>> {
    let edges = sector_edges(level, sector);
    if edges.is_empty() {
        log::warn!("sector #{sector}: no referencing linedefs, excluded");
        return None;
    }

    if let Some(points) = chain_edges(&edges) {
        return Some(points);
    }

    let points = centroid_ordering(&edges);
    if points.len() >= 3 {
        log::debug!(
            "sector #{sector}: open edge set, using centroid ordering ({} points)",
            points.len()
        );
        Some(points)
    } else {
        log::warn!(
            "sector #{sector}: degenerate boundary ({} points), excluded",
            points.len()
        );
        None
    }
}

/// Boundaries for every sector, indexed by sector id.
pub fn sector_polygons(level: &Level) -> Vec<Option<Vec<Vec2>>> {
    (0..level.sectors.len())
        .map(|s| sector_boundary(level, s as SectorId))
        .collect()
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::*;
    use glam::vec2;

    /// Build a level with a single sector bounded by the given linedefs.
    /// `lines` are (v1, v2, front_is_sector0) tuples.
    fn rig(verts: &[(f32, f32)], lines: &[(u16, u16)]) -> Level {
        let vertices = verts
            .iter()
            .map(|&(x, y)| Vertex { pos: vec2(x, y) })
            .collect();
        let sidedefs = vec![Sidedef {
            x_off: 0.0,
            y_off: 0.0,
            upper: 0,
            lower: 0,
            middle: 0,
            sector: 0,
        }];
        let linedefs = lines
            .iter()
            .map(|&(v1, v2)| Linedef {
                v1,
                v2,
                flags: LinedefFlags::IMPASSABLE,
                special: 0,
                tag: 0,
                right_sidedef: Some(0),
                left_sidedef: None,
            })
            .collect();
        Level {
            name: "RIG".into(),
            things: vec![],
            linedefs,
            sidedefs,
            vertices,
            segs: vec![],
            subsectors: vec![],
            nodes: vec![],
            sectors: vec![Sector {
                floor_h: 0.0,
                ceil_h: 128.0,
                floor_pic: 0,
                ceil_pic: 0,
                light: 255,
                special: 0,
                tag: 0,
            }],
            sector_of_subsector: vec![],
        }
    }

    const SQUARE: [(f32, f32); 4] = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)];

    #[test]
    fn rectangle_in_order() {
        let lvl = rig(&SQUARE, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let poly = sector_boundary(&lvl, 0).unwrap();
        assert_eq!(
            poly,
            vec![
                vec2(0.0, 0.0),
                vec2(100.0, 0.0),
                vec2(100.0, 100.0),
                vec2(0.0, 100.0),
            ]
        );
    }

    #[test]
    fn rectangle_scrambled_still_closes() {
        let lvl = rig(&SQUARE, &[(2, 3), (0, 1), (3, 0), (1, 2)]);
        let poly = sector_boundary(&lvl, 0).unwrap();
        assert_eq!(poly.len(), 4);
        // closed 4-point loop starting from the first collected edge
        assert_eq!(poly[0], vec2(100.0, 100.0));
        assert_eq!(poly[1], vec2(0.0, 100.0));
        assert_eq!(poly[2], vec2(0.0, 0.0));
        assert_eq!(poly[3], vec2(100.0, 0.0));
    }

    #[test]
    fn back_side_reverses_direction() {
        let mut lvl = rig(&SQUARE, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        // flip one edge to a back reference: stored 1→0, traversed 0→1
        lvl.linedefs[0].v1 = 1;
        lvl.linedefs[0].v2 = 0;
        lvl.linedefs[0].right_sidedef = None;
        lvl.linedefs[0].left_sidedef = Some(0);
        let poly = sector_boundary(&lvl, 0).unwrap();
        assert_eq!(poly.len(), 4);
        assert_eq!(poly[0], vec2(0.0, 0.0));
        assert_eq!(poly[1], vec2(100.0, 0.0));
    }

    #[test]
    fn open_chain_falls_back_to_centroid_order() {
        // one wall removed — the loop cannot close
        let lvl = rig(&SQUARE, &[(0, 1), (1, 2), (2, 3)]);
        let poly = sector_boundary(&lvl, 0).unwrap();
        assert_eq!(poly.len(), 4);

        // counter-clockwise by angle around the centroid (50,50),
        // starting in the third quadrant
        assert_eq!(
            poly,
            vec![
                vec2(0.0, 0.0),
                vec2(100.0, 0.0),
                vec2(100.0, 100.0),
                vec2(0.0, 100.0),
            ]
        );
    }

    #[test]
    fn degenerate_sector_excluded() {
        // a single zero-area edge cannot make a polygon
        let lvl = rig(&[(0.0, 0.0), (10.0, 0.0)], &[(0, 1)]);
        assert!(sector_boundary(&lvl, 0).is_none());
    }

    #[test]
    fn unreferenced_sector_excluded() {
        let lvl = rig(&SQUARE, &[]);
        assert!(sector_boundary(&lvl, 0).is_none());
        assert_eq!(sector_polygons(&lvl), vec![None]);
    }
}
