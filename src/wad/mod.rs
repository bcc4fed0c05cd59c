pub mod level;
pub mod loader;
pub mod picture;
mod wad;

#[cfg(test)]
pub(crate) mod testwad;

pub use level::{LevelError, RawLevel, is_map_marker};
pub use loader::{LoadError, load_level};
pub use wad::{LumpInfo, Wad, WadError, WadKind};
