//! Hand-crafted in-memory WADs for unit tests.
//!
//! Payloads are laid out immediately after the 12-byte header, in lump
//! order, with the directory appended last — the same shape vanilla tools
//! produce.

use bincode::{Encode, config, encode_to_vec};

pub struct WadBuilder {
    magic: &'static [u8; 4],
    lumps: Vec<(String, Vec<u8>)>,
}

impl WadBuilder {
    pub fn new() -> Self {
        Self {
            magic: b"IWAD",
            lumps: Vec::new(),
        }
    }

    pub fn pwad() -> Self {
        Self {
            magic: b"PWAD",
            lumps: Vec::new(),
        }
    }

    pub fn lump(mut self, name: &str, payload: Vec<u8>) -> Self {
        assert!(name.len() <= 8, "lump name too long: {name}");
        self.lumps.push((name.to_owned(), payload));
        self
    }

    /// Empty lump, as used for map markers.
    pub fn marker(self, name: &str) -> Self {
        self.lump(name, vec![])
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(self.magic);
        bytes.extend(&(self.lumps.len() as u32).to_le_bytes());
        bytes.extend(&0u32.to_le_bytes()); // directory offset patched below

        let mut dir = Vec::new();
        for (name, payload) in &self.lumps {
            let offset = bytes.len() as u32;
            bytes.extend_from_slice(payload);

            dir.extend(&offset.to_le_bytes());
            dir.extend(&(payload.len() as u32).to_le_bytes());
            let mut padded = [0u8; 8];
            padded[..name.len()].copy_from_slice(name.as_bytes());
            dir.extend_from_slice(&padded);
        }

        let dir_offset = bytes.len() as u32;
        bytes.extend_from_slice(&dir);
        bytes[8..12].copy_from_slice(&dir_offset.to_le_bytes());
        bytes
    }
}

/// Serialise records with the same fixed-int little-endian layout the
/// decoder expects.
pub fn encode_records<T: Encode>(records: &[T]) -> Vec<u8> {
    let cfg = config::standard()
        .with_fixed_int_encoding()
        .with_little_endian();
    let mut out = Vec::new();
    for r in records {
        out.extend(encode_to_vec(r, cfg).expect("encode record"));
    }
    out
}

pub fn name8(name: &str) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[..name.len()].copy_from_slice(name.as_bytes());
    out
}

/// A minimal one-sector map: a 256×256 square room, four one-sided walls,
/// no things, floor at 0 and ceiling at 128. The canonical fixture for
/// loader / collision / movement tests.
pub fn square_map_wad() -> Vec<u8> {
    use crate::wad::level::{RawLinedef, RawSector, RawSidedef, RawVertex};

    let vertices = [
        RawVertex { x: 0, y: 0 },
        RawVertex { x: 256, y: 0 },
        RawVertex { x: 256, y: 256 },
        RawVertex { x: 0, y: 256 },
    ];

    let linedef = |v1: i16, v2: i16, side: i16| RawLinedef {
        v1,
        v2,
        flags: 0x0001, // blocking
        special: 0,
        tag: 0,
        sidenum: [side, -1],
    };
    let linedefs = [
        linedef(0, 1, 0),
        linedef(1, 2, 1),
        linedef(2, 3, 2),
        linedef(3, 0, 3),
    ];

    let sidedef = || RawSidedef {
        x_off: 0,
        y_off: 0,
        top_tex: name8("-"),
        bottom_tex: name8("-"),
        mid_tex: name8("STARTAN3"),
        sector: 0,
    };
    let sidedefs = [sidedef(), sidedef(), sidedef(), sidedef()];

    let sectors = [RawSector {
        floor_h: 0,
        ceil_h: 128,
        floor_tex: name8("FLAT5"),
        ceil_tex: name8("CEIL1"),
        light: 192,
        special: 0,
        tag: 0,
    }];

    WadBuilder::new()
        .marker("MAP01")
        .lump("THINGS", vec![])
        .lump("LINEDEFS", encode_records(&linedefs))
        .lump("SIDEDEFS", encode_records(&sidedefs))
        .lump("VERTEXES", encode_records(&vertices))
        .lump("SECTORS", encode_records(&sectors))
        .build()
}
