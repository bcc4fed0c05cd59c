pub mod geometry;
pub mod polygon;
pub mod texture;

pub use geometry::{
    Aabb, Level, Linedef, LinedefFlags, LinedefId, Node, Sector, SectorId, Seg, SegmentId,
    Sidedef, SidedefId, Subsector, SubsectorId, Thing, Vertex, VertexId,
};

pub use texture::{NO_PICTURE, Palette, Picture, PictureBank, PictureBankError, PictureId};
