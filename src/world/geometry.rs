use bitflags::bitflags;
use glam::Vec2;

use crate::world::texture::PictureId;

pub type LinedefId = u16;
pub type VertexId = u16;
pub type SidedefId = u16;
pub type SectorId = u16;
pub type SegmentId = u16;
pub type SubsectorId = u16;

/// Runtime snapshot of one map (immutable after load).
#[derive(Debug)]
pub struct Level {
    pub name: String,
    pub things: Vec<Thing>,
    pub linedefs: Vec<Linedef>,
    pub sidedefs: Vec<Sidedef>,
    pub vertices: Vec<Vertex>,
    pub segs: Vec<Seg>,
    pub subsectors: Vec<Subsector>,
    pub nodes: Vec<Node>,
    pub sectors: Vec<Sector>,
    /// lookup: subsector → sector (filled by `Level::finalise_bsp`)
    pub sector_of_subsector: Vec<SectorId>,
}

/*------------------------- game objects -----------------------------*/

#[derive(Clone, Debug)]
pub struct Thing {
    pub pos: Vec2,
    pub angle: f32, // radians
    pub type_id: u16,
    pub min_skill: u8, // 1 easy, 2 medium, 3 hard
    pub is_deaf: bool,
    pub multiplayer: bool, // multiplayer-only spawn
}

/*--------------------------- linedefs -------------------------------*/

bitflags! {
    #[derive(Debug, Clone, Copy)]
    pub struct LinedefFlags: u16 {
        const IMPASSABLE      = 0x0001;
        const BLOCK_MONSTERS  = 0x0002;
        const TWO_SIDED       = 0x0004;
        const UPPER_UNPEGGED  = 0x0010;
        const LOWER_UNPEGGED  = 0x0020;
        const SECRET          = 0x0040;
        const BLOCK_SOUND     = 0x0080;
        const NOT_ON_MAP      = 0x0200;
        const ALREADY_ON_MAP  = 0x1000; // editor flag
    }
}

#[derive(Clone, Debug)]
pub struct Linedef {
    pub v1: VertexId,
    pub v2: VertexId,
    pub flags: LinedefFlags,
    pub special: u16,
    pub tag: u16,
    /// Front side. A linedef with only this side is a solid wall.
    pub right_sidedef: Option<SidedefId>,
    /// Back side; present on portal lines.
    pub left_sidedef: Option<SidedefId>,
}

/*--------------------------- sidedefs -------------------------------*/

#[derive(Clone, Debug)]
pub struct Sidedef {
    pub x_off: f32,
    pub y_off: f32,
    pub upper: PictureId,
    pub lower: PictureId,
    pub middle: PictureId,
    pub sector: SectorId,
}

/*----------------------- simple primitives --------------------------*/

#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub pos: Vec2,
}

#[derive(Clone, Debug)]
pub struct Seg {
    pub v1: VertexId,
    pub v2: VertexId,
    pub linedef: LinedefId,
    pub dir: u16, // 0 = same direction as the linedef
    pub offset: f32,
}

#[derive(Clone, Debug)]
pub struct Subsector {
    pub seg_count: u16,
    pub first_seg: SegmentId,
}

#[derive(Clone, Debug)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub bbox: [Aabb; 2],
    pub child: [u16; 2],
}

#[derive(Clone, Debug)]
pub struct Sector {
    pub floor_h: f32,
    pub ceil_h: f32,
    pub floor_pic: PictureId,
    pub ceil_pic: PictureId,
    pub light: u8,
    pub special: i16,
    pub tag: i16,
}

/*====================================================================*/
/*              BSP point classification (optional, precise)          */
/*====================================================================*/

pub const SUBSECTOR_BIT: u16 = 0x8000;
pub const CHILD_MASK: u16 = 0x7FFF;

impl Level {
    /// Index of the BSP root (`nodes.len()-1` in Doom), if BSP lumps are
    /// present at all.
    #[inline]
    pub fn bsp_root(&self) -> Option<u16> {
        (!self.nodes.is_empty()).then(|| (self.nodes.len() - 1) as u16)
    }

    /// Walk the BSP and return the subsector id containing `p`.
    ///
    /// `None` when the map carries no NODES lump (synthetic and stripped
    /// maps) — callers fall back to polygon point-location.
    pub fn locate_subsector(&self, p: Vec2) -> Option<SubsectorId> {
        let mut idx = self.bsp_root()?;
        loop {
            let node = self.nodes.get(idx as usize)?;
            let child = node.child[node.point_side(p) as usize];
            if child & SUBSECTOR_BIT != 0 {
                return Some(child & CHILD_MASK);
            }
            idx = child;
        }
    }

    /// Sector containing `p` according to the BSP, when available.
    pub fn sector_at_bsp(&self, p: Vec2) -> Option<SectorId> {
        let ss = self.locate_subsector(p)?;
        match self.sector_of_subsector.get(ss as usize) {
            Some(&s) if s != SectorId::MAX => Some(s),
            _ => None,
        }
    }

    /// Fill the subsector → sector table from each subsector's first seg.
    pub fn finalise_bsp(&mut self) {
        self.sector_of_subsector = self
            .subsectors
            .iter()
            .map(|ss| {
                self.segs
                    .get(ss.first_seg as usize)
                    .and_then(|seg| self.linedefs.get(seg.linedef as usize).map(|ld| (seg, ld)))
                    .and_then(|(seg, ld)| {
                        if seg.dir == 0 {
                            ld.right_sidedef
                        } else {
                            ld.left_sidedef
                        }
                    })
                    .and_then(|sd| self.sidedefs.get(sd as usize))
                    .map(|sd| sd.sector)
                    .unwrap_or(SectorId::MAX)
            })
            .collect();
    }
}

impl Node {
    /// 0 = *front* of splitter, 1 = *back*.
    #[inline]
    pub fn point_side(&self, p: Vec2) -> i32 {
        if self.dx == 0.0 {
            return if p.x <= self.x {
                (self.dy > 0.0) as i32
            } else {
                (self.dy < 0.0) as i32
            };
        }
        if self.dy == 0.0 {
            return if p.y <= self.y {
                (self.dx < 0.0) as i32
            } else {
                (self.dx > 0.0) as i32
            };
        }

        let d = (p.x - self.x) * self.dy - (p.y - self.y) * self.dx;
        (d < 0.0) as i32
    }
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    #[test]
    fn point_side_axis_aligned() {
        // vertical splitter at x = 0 pointing +y: front is x > 0... vanilla
        // convention: dx == 0, p.x <= x → side depends on dy sign
        let node = Node {
            x: 0.0,
            y: 0.0,
            dx: 0.0,
            dy: 64.0,
            bbox: [
                Aabb {
                    min: vec2(-64.0, 0.0),
                    max: vec2(0.0, 64.0),
                },
                Aabb {
                    min: vec2(0.0, 0.0),
                    max: vec2(64.0, 64.0),
                },
            ],
            child: [0, 1],
        };
        assert_eq!(node.point_side(vec2(-10.0, 5.0)), 1);
        assert_eq!(node.point_side(vec2(10.0, 5.0)), 0);
    }

    #[test]
    fn locate_without_nodes_is_none() {
        let lvl = Level {
            name: "EMPTY".into(),
            things: vec![],
            linedefs: vec![],
            sidedefs: vec![],
            vertices: vec![],
            segs: vec![],
            subsectors: vec![],
            nodes: vec![],
            sectors: vec![],
            sector_of_subsector: vec![],
        };
        assert!(lvl.locate_subsector(vec2(0.0, 0.0)).is_none());
        assert!(lvl.sector_at_bsp(vec2(0.0, 0.0)).is_none());
    }
}
