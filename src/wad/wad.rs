//! Doom-format WAD container.
//!
//! * Parses the 12-byte header and the 16-byte directory entries; lump
//!   payloads are never touched here, only sliced on demand.
//! * Accepts both `IWAD` (game data) and `PWAD` (patch/add-on) containers.
//! * Decodes fixed-width binary lumps into typed vectors with **bincode 2**.

use bincode::{Decode, config, decode_from_slice};
use byteorder::{LittleEndian as LE, ReadBytesExt};
use std::{
    collections::HashMap,
    fs,
    io::{self, Read},
    mem,
    path::Path,
};
use thiserror::Error;

/// Size (in bytes) of one directory entry.
const DIR_ENTRY_SIZE: usize = 16;

/// Which of the two accepted container kinds the header carried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WadKind {
    /// Primary game container (`IWAD`).
    Iwad,
    /// Patch/add-on container (`PWAD`).
    Pwad,
}

/// One entry in the lump directory (16 bytes on disk).
#[derive(Clone, Debug)]
pub struct LumpInfo {
    /// Eight-byte ASCII name, padded with NULs.
    pub name: [u8; 8],
    /// Offset to lump data from the beginning of the container.
    pub offset: u32,
    /// Size of the lump in bytes.
    pub size: u32,
}

/// Entire WAD resident in memory (raw bytes + parsed directory).
#[derive(Debug)]
pub struct Wad {
    kind: WadKind,
    lumps: Vec<LumpInfo>,
    bytes: Vec<u8>,
    by_name: HashMap<String, usize>,
}

/// Loader / decoding errors.
#[derive(Error, Debug)]
pub enum WadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not a IWAD/PWAD container (magic {0:02x?})")]
    BadMagic([u8; 4]),

    #[error("directory extends beyond end of file")]
    DirectoryOutOfBounds,

    #[error("lump index {0} out of range")]
    BadIndex(usize),

    #[error("lump {name} (# {index}) slice {offset}+{size} past EOF ({file_size})")]
    BadOffset {
        index: usize,
        name: String,
        offset: u32,
        size: u32,
        file_size: usize,
    },

    #[error(
        "lump {name} (# {index}) size {size} not multiple of record ({elem_size}B, {whole} whole records)"
    )]
    TruncatedRecords {
        index: usize,
        name: String,
        size: usize,
        elem_size: usize,
        /// How many complete records fit before the ragged tail.
        whole: usize,
    },

    #[error("lump {name} (# {index}) record {elem}: {source}")]
    BadRecord {
        index: usize,
        name: String,
        elem: usize,
        source: bincode::error::DecodeError,
    },
}

impl Wad {
    // ------------------------------------------------------------------ //
    // Loading
    // ------------------------------------------------------------------ //

    /// Parse a WAD already resident in memory.
    ///
    /// Only the header and directory are interpreted; lump payloads stay
    /// raw until something asks for them.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, WadError> {
        let mut cur = &bytes[..];

        let mut magic = [0u8; 4];
        cur.read_exact(&mut magic)?;
        let kind = match &magic {
            b"IWAD" => WadKind::Iwad,
            b"PWAD" => WadKind::Pwad,
            _ => return Err(WadError::BadMagic(magic)),
        };

        let num_lumps = cur.read_u32::<LE>()?;
        let dir_offset = cur.read_u32::<LE>()?;

        // directory bounds check
        let dir_end = dir_offset as usize + num_lumps as usize * DIR_ENTRY_SIZE;
        if dir_end > bytes.len() {
            return Err(WadError::DirectoryOutOfBounds);
        }

        // parse directory entries
        let mut lumps = Vec::with_capacity(num_lumps as usize);
        let mut cur = &bytes[dir_offset as usize..dir_end];

        for _ in 0..num_lumps {
            let offset = cur.read_u32::<LE>()?;
            let size = cur.read_u32::<LE>()?;
            let mut name = [0u8; 8];
            cur.read_exact(&mut name)?;
            lumps.push(LumpInfo { name, offset, size });
        }

        // validate each lump slice
        for (i, l) in lumps.iter().enumerate() {
            let end = l.offset as usize + l.size as usize;
            if end > bytes.len() {
                return Err(WadError::BadOffset {
                    index: i,
                    name: Self::lump_name_str(&l.name).into(),
                    offset: l.offset,
                    size: l.size,
                    file_size: bytes.len(),
                });
            }
        }

        // name → idx map; the *first* occurrence of a duplicated name wins,
        // later duplicates are reachable only by positional scanning
        let mut by_name = HashMap::with_capacity(lumps.len());
        for (i, l) in lumps.iter().enumerate() {
            by_name
                .entry(Self::lump_name_str(&l.name).to_owned())
                .or_insert(i);
        }

        Ok(Self {
            kind,
            lumps,
            bytes,
            by_name,
        })
    }

    /// Load a WAD from disk into memory.
    ///
    /// The entire file is read into a `Vec<u8>` so subsequent lump requests
    /// are just slice operations.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WadError> {
        Self::from_bytes(fs::read(path)?)
    }

    // ------------------------------------------------------------------ //
    // Low-level helpers
    // ------------------------------------------------------------------ //

    /// Which container tag the header carried.
    pub fn kind(&self) -> WadKind {
        self.kind
    }

    /// Expose the directory as a read-only slice.
    pub fn lumps(&self) -> &[LumpInfo] {
        &self.lumps
    }

    /// Return `&str` view of an 8-byte lump name (trimmed at first NUL).
    pub fn lump_name_str(name: &[u8; 8]) -> &str {
        let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
        std::str::from_utf8(&name[..end]).unwrap_or("?")
    }

    /// Raw bytes of lump `idx` (slice into the backing buffer).
    ///
    /// Every (offset, size) pair was validated at load time, so only the
    /// index itself can be wrong here.
    pub fn lump_bytes(&self, idx: usize) -> Result<&[u8], WadError> {
        let l = self.lumps.get(idx).ok_or(WadError::BadIndex(idx))?;
        let start = l.offset as usize;
        Ok(&self.bytes[start..start + l.size as usize])
    }

    /// Find the first lump with `name` (case-sensitive like vanilla Doom).
    pub fn find_lump(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Raw bytes of the first lump called `name`, if present.
    pub fn lump_bytes_by_name(&self, name: &str) -> Option<&[u8]> {
        self.find_lump(name).and_then(|i| self.lump_bytes(i).ok())
    }

    // ------------------------------------------------------------------ //
    // Generic record decode
    // ------------------------------------------------------------------ //

    /// Decode lump `idx` as a flat array of fixed-width little-endian
    /// records.
    ///
    /// A zero-length lump yields an empty vector; a length that is not an
    /// exact multiple of the record size fails with
    /// [`WadError::TruncatedRecords`] before any record is produced.
    pub fn lump_to_vec<T>(&self, idx: usize) -> Result<Vec<T>, WadError>
    where
        T: Decode<()>,
    {
        let bytes = self.lump_bytes(idx)?;
        let elem = mem::size_of::<T>();

        if bytes.len() % elem != 0 {
            return Err(WadError::TruncatedRecords {
                index: idx,
                name: Self::lump_name_str(&self.lumps[idx].name).into(),
                size: bytes.len(),
                elem_size: elem,
                whole: bytes.len() / elem,
            });
        }

        let cfg = config::standard()
            .with_fixed_int_encoding()
            .with_little_endian();
        let mut out = Vec::with_capacity(bytes.len() / elem);
        let mut slice = bytes;

        while !slice.is_empty() {
            let (val, read) =
                decode_from_slice::<T, _>(slice, cfg).map_err(|e| WadError::BadRecord {
                    index: idx,
                    name: Self::lump_name_str(&self.lumps[idx].name).into(),
                    elem: out.len(),
                    source: e,
                })?;
            out.push(val);
            slice = &slice[read..];
        }
        Ok(out)
    }
}

// ==========================================================================
// Tests
// ==========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wad::testwad::WadBuilder;

    #[test]
    fn parses_header_and_directory() {
        let bytes = WadBuilder::new()
            .lump("HELLO", b"abcd".to_vec())
            .lump("WORLD", vec![])
            .build();
        let wad = Wad::from_bytes(bytes).unwrap();

        assert_eq!(wad.kind(), WadKind::Iwad);
        assert_eq!(wad.lumps().len(), 2);
        assert_eq!(wad.lump_bytes_by_name("HELLO").unwrap(), b"abcd");
        assert_eq!(wad.lump_bytes_by_name("WORLD").unwrap(), b"");
    }

    #[test]
    fn pwad_magic_accepted() {
        let bytes = WadBuilder::pwad().lump("DEMO", vec![1, 2]).build();
        assert_eq!(Wad::from_bytes(bytes).unwrap().kind(), WadKind::Pwad);
    }

    #[test]
    fn rejects_garbage_magic() {
        let err = Wad::from_bytes(b"NOTWAD_____".to_vec()).unwrap_err();
        assert!(matches!(err, WadError::BadMagic(_)));
    }

    #[test]
    fn directory_past_eof_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"IWAD");
        bytes.extend(&10u32.to_le_bytes()); // claims 10 lumps
        bytes.extend(&12u32.to_le_bytes()); // directory right after header
        let err = Wad::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, WadError::DirectoryOutOfBounds));
    }

    #[test]
    fn lump_slice_past_eof_rejected() {
        // one directory entry pointing way past the end of the buffer
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"IWAD");
        bytes.extend(&1u32.to_le_bytes());
        bytes.extend(&12u32.to_le_bytes());
        bytes.extend(&1_000u32.to_le_bytes()); // offset past EOF
        bytes.extend(&4u32.to_le_bytes());
        bytes.extend(b"BAD\0\0\0\0\0");
        let err = Wad::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, WadError::BadOffset { .. }));
    }

    #[test]
    fn duplicate_names_resolve_to_first() {
        let bytes = WadBuilder::new()
            .lump("TWIN", b"first".to_vec())
            .lump("TWIN", b"later".to_vec())
            .build();
        let wad = Wad::from_bytes(bytes).unwrap();
        assert_eq!(wad.find_lump("TWIN"), Some(0));
        assert_eq!(wad.lump_bytes_by_name("TWIN").unwrap(), b"first");
    }

    #[test]
    fn every_entry_lies_within_buffer() {
        let bytes = WadBuilder::new()
            .lump("A", vec![0; 17])
            .lump("B", vec![0; 3])
            .lump("C", vec![])
            .build();
        let wad = Wad::from_bytes(bytes.clone()).unwrap();
        assert_eq!(wad.lumps().len(), 3);
        for l in wad.lumps() {
            assert!((l.offset + l.size) as usize <= bytes.len());
        }
    }

    #[test]
    fn from_file_roundtrip() {
        let bytes = WadBuilder::new().lump("PING", b"pong".to_vec()).build();
        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        std::fs::write(tmp.path(), &bytes).unwrap();

        let wad = Wad::from_file(tmp.path()).unwrap();
        assert_eq!(wad.lump_bytes_by_name("PING").unwrap(), b"pong");
    }

    #[test]
    fn lump_to_vec_roundtrip() {
        #[repr(C)]
        #[derive(Clone, Copy, Debug, PartialEq, bincode::Decode)]
        struct Foo {
            a: i16,
            b: i16,
        }

        let payload = [1i16, 2, 3, 4]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<_>>();
        let wad = Wad::from_bytes(WadBuilder::new().lump("FOO", payload).build()).unwrap();

        let v: Vec<Foo> = wad.lump_to_vec(0).unwrap();
        assert_eq!(v, vec![Foo { a: 1, b: 2 }, Foo { a: 3, b: 4 }]);
    }

    #[test]
    fn ragged_lump_reports_whole_record_count() {
        let wad = Wad::from_bytes(WadBuilder::new().lump("RAG", vec![0u8; 10]).build()).unwrap();

        #[repr(C)]
        #[derive(Debug, bincode::Decode)]
        struct Pair {
            a: i16,
            b: i16,
        }

        let err = wad.lump_to_vec::<Pair>(0).unwrap_err();
        match err {
            WadError::TruncatedRecords {
                whole, elem_size, ..
            } => {
                assert_eq!(elem_size, 4);
                assert_eq!(whole, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_lump_decodes_to_empty_vec() {
        let wad = Wad::from_bytes(WadBuilder::new().lump("NIL", vec![]).build()).unwrap();

        #[repr(C)]
        #[derive(Debug, bincode::Decode)]
        struct Pair {
            a: i16,
            b: i16,
        }

        let v: Vec<Pair> = wad.lump_to_vec(0).unwrap();
        assert!(v.is_empty());
    }
}
