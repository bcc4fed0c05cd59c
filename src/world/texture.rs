// Format-agnostic repository of decoded pictures. The renderer and world
// logic interact through `PictureId` only; the WAD loader fills the bank.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

/// Runtime handle for a picture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type PictureId = u16;

/// `PictureId` whose pixels are the checkerboard placeholder.
/// Always = 0 because `PictureBank::with_placeholder()` inserts it first.
pub const NO_PICTURE: PictureId = 0;

/// CPU-side storage: 8-bit **RGBA** in row-major order, 4 bytes per pixel.
///
/// Alpha is 255 for every pixel a decoder actually wrote and 0 for pixels
/// no run ever touched — that is how sprites and masked walls keep their
/// irregular silhouettes.
#[derive(Clone, Debug, PartialEq)]
pub struct Picture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub rgba: Vec<u8>,
}

impl Picture {
    /// Fully transparent canvas, ready for compositing.
    pub fn blank<S: Into<String>>(name: S, w: usize, h: usize) -> Self {
        Picture {
            name: name.into(),
            w,
            h,
            rgba: vec![0u8; w * h * 4],
        }
    }

    #[inline]
    pub fn put(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * self.w + x) * 4;
        self.rgba[i..i + 3].copy_from_slice(&rgb);
        self.rgba[i + 3] = 255;
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.w + x) * 4;
        [
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ]
    }

    #[inline]
    pub fn is_opaque(&self, x: usize, y: usize) -> bool {
        self.rgba[(y * self.w + x) * 4 + 3] != 0
    }
}

/// Convenience checkerboard 8×8 (dark/light grey), fully opaque.
impl Default for Picture {
    fn default() -> Self {
        const LIGHT: [u8; 3] = [0x9c, 0x9c, 0x9c];
        const DARK: [u8; 3] = [0x4c, 0x4c, 0x4c];
        let mut pic = Picture::blank("CHECKER", 8, 8);
        for y in 0..8 {
            for x in 0..8 {
                pic.put(x, y, if (x ^ y) & 1 == 0 { LIGHT } else { DARK });
            }
        }
        pic
    }
}

/// Fixed 256-entry RGB lookup table (one active palette per container).
pub struct Palette(pub [[u8; 3]; 256]);

impl Default for Palette {
    fn default() -> Self {
        Palette([[0u8; 3]; 256])
    }
}

impl Palette {
    /// First 768-byte triple-block of a `PLAYPAL` lump; anything shorter
    /// is unusable.
    pub fn from_lump(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 768 {
            return None;
        }
        let mut pal = Palette::default();
        for i in 0..256 {
            pal[i] = [bytes[i * 3], bytes[i * 3 + 1], bytes[i * 3 + 2]];
        }
        Some(pal)
    }
}

impl Index<usize> for Palette {
    type Output = [u8; 3];
    fn index(&self, idx: usize) -> &[u8; 3] {
        &self.0[idx]
    }
}

impl IndexMut<usize> for Palette {
    fn index_mut(&mut self, idx: usize) -> &mut [u8; 3] {
        &mut self.0[idx]
    }
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PictureBankError {
    /// Attempted to insert a second picture with an existing name.
    #[error("picture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("picture id {0} out of range")]
    BadId(PictureId),
}

/// Scoped cache of every picture the current map references.
///
/// * Does **not** know about WADs — that's the loader's job.
/// * Stores exactly one copy per name; population is idempotent because a
///   decoded picture for a given name never changes.
/// * ID **0** is always the "missing art" checkerboard.
/// * Owned by the map-loading context: rebuilt wholesale on map change,
///   never a process-wide singleton.
pub struct PictureBank {
    by_name: HashMap<String, PictureId>,
    data: Vec<Picture>,
    palette: Palette,
}

impl PictureBank {
    /// Create an empty bank whose id 0 is the supplied placeholder
    /// (registered under the fixed name `"MISSING"`).
    pub fn new(placeholder: Picture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_PICTURE);
        Self {
            by_name,
            data: vec![placeholder],
            palette: Palette::default(),
        }
    }

    pub fn with_placeholder() -> Self {
        Self::new(Picture::default())
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of pictures stored (including the placeholder).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 1 // only the placeholder
    }

    /// Obtain the id for a *decoded* picture by name.
    pub fn id(&self, name: &str) -> Option<PictureId> {
        self.by_name.get(name).copied()
    }

    /// Fallback-safe query: unknown names resolve to the placeholder id.
    pub fn id_or_placeholder(&self, name: &str) -> PictureId {
        self.id(name).unwrap_or(NO_PICTURE)
    }

    /// Borrow a picture by id, with bounds-checking.
    pub fn picture(&self, id: PictureId) -> Result<&Picture, PictureBankError> {
        self.data
            .get(id as usize)
            .ok_or(PictureBankError::BadId(id))
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert a picture under `name`; fails on duplicates.
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        pic: Picture,
    ) -> Result<PictureId, PictureBankError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(PictureBankError::Duplicate(name));
        }
        let id = self.data.len() as PictureId;
        self.data.push(pic);
        self.by_name.insert(name, id);
        Ok(id)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
