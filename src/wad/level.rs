//! Map record decoding.
//!
//! A map occupies a contiguous window of the directory: its marker lump
//! (`E#M#` / `MAP##`, empty) followed by named sub-lumps, ending at the
//! next marker or the end of the directory. Sub-lumps may appear in any
//! order and may be missing entirely — a missing or zero-length category
//! simply decodes to an empty vector.

use crate::wad::{Wad, WadError};
use bincode::{Decode, Encode};
use once_cell::sync::Lazy;
use regex::Regex;

/*=======================================================================*/
/*                         Raw binary records                            */
/*=======================================================================*/

#[repr(C)]
#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq)]
pub struct RawThing {
    pub x: i16,
    pub y: i16,
    pub angle: i16,
    pub type_: i16,
    pub options: i16,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq)]
pub struct RawLinedef {
    pub v1: i16,
    pub v2: i16,
    pub flags: i16,
    pub special: i16,
    pub tag: i16,
    pub sidenum: [i16; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq)]
pub struct RawSidedef {
    pub x_off: i16,
    pub y_off: i16,
    pub top_tex: [u8; 8],
    pub bottom_tex: [u8; 8],
    pub mid_tex: [u8; 8],
    pub sector: i16,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq)]
pub struct RawVertex {
    pub x: i16,
    pub y: i16,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq)]
pub struct RawSeg {
    pub v1: i16,
    pub v2: i16,
    pub angle: i16,
    pub linedef: i16,
    pub side: i16,
    pub offset: i16,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq)]
pub struct RawSubsector {
    pub seg_count: i16,
    pub first_seg: i16,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq)]
pub struct RawNode {
    pub x: i16,
    pub y: i16,
    pub dx: i16,
    pub dy: i16,
    pub bbox: [[i16; 4]; 2],
    pub child: [u16; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Encode, Debug, PartialEq)]
pub struct RawSector {
    pub floor_h: i16,
    pub ceil_h: i16,
    pub floor_tex: [u8; 8],
    pub ceil_tex: [u8; 8],
    pub light: i16,
    pub special: i16,
    pub tag: i16,
}

/*=======================================================================*/
/*                     Aggregate returned by `parse_level`               */
/*=======================================================================*/

#[derive(Debug)]
pub struct RawLevel {
    pub name: String,
    pub things: Vec<RawThing>,
    pub linedefs: Vec<RawLinedef>,
    pub sidedefs: Vec<RawSidedef>,
    pub vertices: Vec<RawVertex>,
    pub segs: Vec<RawSeg>,
    pub subsectors: Vec<RawSubsector>,
    pub nodes: Vec<RawNode>,
    pub sectors: Vec<RawSector>,
}

/*=======================================================================*/
/*                                Errors                                 */
/*=======================================================================*/

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("marker index {0} out of bounds")]
    MarkerOob(usize),

    #[error(transparent)]
    Wad(#[from] WadError),
}

/*=======================================================================*/
/*                     Convenience helpers on `Wad`                      */
/*=======================================================================*/

static MAP_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(E[1-4]M[1-9]|MAP[0-3][0-9])$").unwrap());

/// Does `name` look like a map marker lump?
pub fn is_map_marker(name: &str) -> bool {
    MAP_MARKER.is_match(name)
}

impl Wad {
    /// Return directory indices of every map marker (`E#M#`, `MAP##`).
    pub fn level_indices(&self) -> Vec<usize> {
        self.lumps()
            .iter()
            .enumerate()
            .filter(|(_, l)| l.size == 0 && is_map_marker(Self::lump_name_str(&l.name)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Directory index of `name` within `[start, end)`, scanning forward.
    fn lump_in_window(&self, start: usize, end: usize, name: &str) -> Option<usize> {
        self.lumps()[start..end]
            .iter()
            .position(|l| Self::lump_name_str(&l.name) == name)
            .map(|i| start + i)
    }

    /// Decode one record category, degrading a ragged lump to empty.
    fn records_or_empty<T>(&self, idx: Option<usize>) -> Result<Vec<T>, WadError>
    where
        T: Decode<()>,
    {
        let Some(idx) = idx else {
            return Ok(Vec::new());
        };
        match self.lump_to_vec(idx) {
            Ok(v) => Ok(v),
            Err(e @ WadError::TruncatedRecords { .. }) => {
                log::warn!("{e}; category decodes as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Decode every record category of the map starting at `marker_idx`.
    ///
    /// The scan window runs from the lump after the marker up to the next
    /// map marker (or the end of the directory).
    pub fn parse_level(&self, marker_idx: usize) -> Result<RawLevel, LevelError> {
        if marker_idx >= self.lumps().len() {
            return Err(LevelError::MarkerOob(marker_idx));
        }

        let start = marker_idx + 1;
        let end = self.lumps()[start..]
            .iter()
            .position(|l| is_map_marker(Self::lump_name_str(&l.name)))
            .map(|i| start + i)
            .unwrap_or(self.lumps().len());

        let find = |name| self.lump_in_window(start, end, name);

        Ok(RawLevel {
            name: Self::lump_name_str(&self.lumps()[marker_idx].name).into(),
            things: self.records_or_empty(find("THINGS"))?,
            linedefs: self.records_or_empty(find("LINEDEFS"))?,
            sidedefs: self.records_or_empty(find("SIDEDEFS"))?,
            vertices: self.records_or_empty(find("VERTEXES"))?,
            segs: self.records_or_empty(find("SEGS"))?,
            subsectors: self.records_or_empty(find("SSECTORS"))?,
            nodes: self.records_or_empty(find("NODES"))?,
            sectors: self.records_or_empty(find("SECTORS"))?,
        })
    }
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
