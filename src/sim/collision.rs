//! Runtime collision model: impassable wall segments plus closed floor
//! regions, rebuilt wholesale on every map load and read-only afterwards
//! except for the one-shot door removal.
//!
//! Two-sided portal lines are pure sight/height transitions and never
//! enter the collision set; only solid walls and closed door specials do.

use glam::Vec2;
use smallvec::SmallVec;

use crate::world::geometry::{Level, LinedefId, SectorId};
use crate::world::polygon;

/// Linedef specials that put a closed, openable door on a two-sided line.
pub const DOOR_SPECIALS: [u16; 10] = [1, 26, 27, 28, 31, 32, 33, 34, 117, 118];

/// How far a "use" press reaches (map units).
pub const USE_RANGE: f32 = 64.0;

/*====================================================================*/
/*                         Derived entities                           */
/*====================================================================*/

/// One impassable wall segment.
#[derive(Clone, Debug)]
pub struct CollisionLine {
    pub a: Vec2,
    pub b: Vec2,
    pub is_door: bool,
    /// Originating linedef, for diagnostics.
    pub linedef: LinedefId,
}

impl CollisionLine {
    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        (self.a + self.b) * 0.5
    }

    /// Circle-vs-segment test: project the center onto the segment, clamp
    /// the parameter to [0,1] and compare squared distances. A zero-length
    /// line degenerates to a point test.
    pub fn hit_by_circle(&self, center: Vec2, radius: f32) -> bool {
        let d = self.b - self.a;
        let len_sq = d.length_squared();
        let t = if len_sq == 0.0 {
            0.0
        } else {
            ((center - self.a).dot(d) / len_sq).clamp(0.0, 1.0)
        };
        let closest = self.a + d * t;
        (center - closest).length_squared() < radius * radius
    }
}

/// One walkable region: a sector's reconstructed boundary plus heights.
#[derive(Clone, Debug)]
pub struct FloorRegion {
    pub sector: SectorId,
    pub boundary: Vec<Vec2>,
    pub floor_h: f32,
    pub ceil_h: f32,
    centroid: Vec2,
}

impl FloorRegion {
    fn new(sector: SectorId, boundary: Vec<Vec2>, floor_h: f32, ceil_h: f32) -> Self {
        let centroid = boundary.iter().copied().sum::<Vec2>() / boundary.len() as f32;
        Self {
            sector,
            boundary,
            floor_h,
            ceil_h,
            centroid,
        }
    }

    pub fn centroid(&self) -> Vec2 {
        self.centroid
    }

    /// Even-odd ray-cast membership: count boundary edges whose endpoints
    /// strictly straddle the query's y and whose crossing x lies to the
    /// right of the query point.
    pub fn contains(&self, p: Vec2) -> bool {
        let mut inside = false;
        let n = self.boundary.len();
        for i in 0..n {
            let a = self.boundary[i];
            let b = self.boundary[(i + 1) % n];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if x_cross > p.x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/*====================================================================*/
/*                         CollisionModel                             */
/*====================================================================*/

pub struct CollisionModel {
    lines: Vec<CollisionLine>,
    regions: Vec<FloorRegion>,
}

impl CollisionModel {
    /// Derive the full model from a loaded level. Regions whose polygon
    /// failed reconstruction are skipped (already logged by the
    /// reconstructor).
    pub fn build(level: &Level) -> Self {
        let mut lines = Vec::new();

        for (i, ld) in level.linedefs.iter().enumerate() {
            let (Some(v1), Some(v2)) = (
                level.vertices.get(ld.v1 as usize),
                level.vertices.get(ld.v2 as usize),
            ) else {
                continue; // already reported by the loader
            };

            let is_door = match (ld.right_sidedef, ld.left_sidedef) {
                (None, None) => continue, // no sides, no wall
                // portal line: collidable only while a closed door
                (Some(_), Some(_)) => {
                    if DOOR_SPECIALS.contains(&ld.special) {
                        true
                    } else {
                        continue;
                    }
                }
                // one-sided walls are always solid
                _ => false,
            };

            lines.push(CollisionLine {
                a: v1.pos,
                b: v2.pos,
                is_door,
                linedef: i as LinedefId,
            });
        }

        let regions = polygon::sector_polygons(level)
            .into_iter()
            .enumerate()
            .filter_map(|(s, poly)| {
                let sector = &level.sectors[s];
                poly.map(|boundary| {
                    FloorRegion::new(s as SectorId, boundary, sector.floor_h, sector.ceil_h)
                })
            })
            .collect();

        Self { lines, regions }
    }

    pub fn lines(&self) -> &[CollisionLine] {
        &self.lines
    }

    pub fn regions(&self) -> &[FloorRegion] {
        &self.regions
    }

    pub fn door_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_door).count()
    }

    /*----------------------------------------------------------------*/
    /* Queries                                                        */
    /*----------------------------------------------------------------*/

    /// Which region contains `p`? First match wins in insertion order;
    /// a miss falls back to the region with the nearest centroid, so the
    /// answer is `None` only when the map has no usable region at all.
    pub fn region_at(&self, p: Vec2) -> Option<&FloorRegion> {
        if let Some(region) = self.regions.iter().find(|r| r.contains(p)) {
            return Some(region);
        }
        self.regions
            .iter()
            .min_by(|a, b| {
                let da = (a.centroid - p).length_squared();
                let db = (b.centroid - p).length_squared();
                da.total_cmp(&db)
            })
    }

    /// Does a body of `radius` at `center` overlap any active wall?
    pub fn blocked(&self, center: Vec2, radius: f32) -> bool {
        self.lines.iter().any(|l| l.hit_by_circle(center, radius))
    }

    /*----------------------------------------------------------------*/
    /* Door toggling                                                  */
    /*----------------------------------------------------------------*/

    /// Open the nearest door in front of `pos` (facing unit vector),
    /// within `USE_RANGE` of its midpoint. Opening removes the line from
    /// the active set — one-shot, no re-closing.
    pub fn open_door(&mut self, pos: Vec2, facing: Vec2) -> bool {
        let mut candidates: SmallVec<[(usize, f32); 4]> = SmallVec::new();

        for (i, line) in self.lines.iter().enumerate() {
            if !line.is_door {
                continue;
            }
            let to_mid = line.midpoint() - pos;
            let dist_sq = to_mid.length_squared();
            if dist_sq > USE_RANGE * USE_RANGE {
                continue;
            }
            if to_mid.dot(facing) <= 0.0 {
                continue; // behind the facing half-plane
            }
            candidates.push((i, dist_sq));
        }

        let Some(&(idx, _)) = candidates
            .iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
        else {
            return false;
        };

        let line = self.lines.remove(idx);
        log::debug!("door on linedef #{} opened", line.linedef);
        true
    }
}

/*====================================================================*/
/*                        Test-only fixtures                          */
/*====================================================================*/

#[cfg(test)]
impl CollisionModel {
    pub(crate) fn from_parts(lines: Vec<CollisionLine>, regions: Vec<FloorRegion>) -> Self {
        Self { lines, regions }
    }
}

#[cfg(test)]
impl FloorRegion {
    /// Axis-aligned rectangular region for hand-built models.
    pub(crate) fn rect(sector: SectorId, min: Vec2, max: Vec2, floor_h: f32, ceil_h: f32) -> Self {
        Self::new(
            sector,
            vec![
                min,
                Vec2::new(max.x, min.y),
                max,
                Vec2::new(min.x, max.y),
            ],
            floor_h,
            ceil_h,
        )
    }
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
