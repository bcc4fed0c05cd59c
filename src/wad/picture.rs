//! Picture lump decoding: column-post patches, raw 64×64 flats, and
//! multi-patch wall-texture compositing (`PNAMES` + `TEXTURE1`/`TEXTURE2`).
//!
//! Every decoded pixel maps through the active palette to RGB with alpha
//! 255; pixels no post ever touched stay fully transparent.

use crate::wad::Wad;
use crate::world::texture::{Palette, Picture};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PictureError {
    #[error("patch `{name}` truncated while reading {what}")]
    Truncated { name: String, what: &'static str },
}

/*====================================================================*/
/*                            Patches                                 */
/*====================================================================*/

/// Decode a column-major patch lump.
///
/// Per column: posts of `[row_start][count][pad]{count index bytes}[pad]`,
/// terminated by the sentinel row 255. Rows past the declared height are
/// clipped rather than trusted.
pub fn decode_patch(name: &str, raw: &[u8], pal: &Palette) -> Result<Picture, PictureError> {
    let trunc = |what| PictureError::Truncated {
        name: name.into(),
        what,
    };

    if raw.len() < 8 {
        return Err(trunc("header"));
    }
    let w = u16::from_le_bytes([raw[0], raw[1]]) as usize;
    let h = u16::from_le_bytes([raw[2], raw[3]]) as usize;
    // bytes 4..8 are the left/top sprite origin; irrelevant for decoding

    let col_end = 8 + w * 4;
    if raw.len() < col_end {
        return Err(trunc("column offsets"));
    }

    let mut pic = Picture::blank(name, w, h);
    for x in 0..w {
        let ofs = &raw[8 + x * 4..8 + x * 4 + 4];
        let mut p = u32::from_le_bytes([ofs[0], ofs[1], ofs[2], ofs[3]]) as usize;

        loop {
            let row = *raw.get(p).ok_or_else(|| trunc("post header"))? as usize;
            if row == 0xFF {
                break;
            }
            let len = *raw.get(p + 1).ok_or_else(|| trunc("post header"))? as usize;
            let pixels = raw
                .get(p + 3..p + 3 + len)
                .ok_or_else(|| trunc("post pixels"))?;
            for (i, &idx) in pixels.iter().enumerate() {
                if row + i < h {
                    pic.put(x, row + i, pal[idx as usize]);
                }
            }
            p += len + 4; // row + len + two padding bytes
        }
    }
    Ok(pic)
}

/*====================================================================*/
/*                             Flats                                  */
/*====================================================================*/

/// Decode a raw 64×64 palette-index flat. Exactly 4096 bytes; anything
/// else is not a flat.
pub fn decode_flat(name: &str, raw: &[u8], pal: &Palette) -> Option<Picture> {
    if raw.len() != 64 * 64 {
        return None;
    }
    let mut pic = Picture::blank(name, 64, 64);
    for (i, &idx) in raw.iter().enumerate() {
        pic.put(i % 64, i / 64, pal[idx as usize]);
    }
    Some(pic)
}

/*====================================================================*/
/*                    Wall-texture definitions                        */
/*====================================================================*/

/// One patch placement inside a texture definition.
#[derive(Clone, Copy, Debug)]
pub struct TexPatch {
    pub origin_x: i32,
    pub origin_y: i32,
    /// Index into the `PNAMES` patch-name table.
    pub patch: usize,
}

/// A named multi-patch wall texture, as listed in `TEXTURE1`/`TEXTURE2`.
#[derive(Clone, Debug)]
pub struct TextureDef {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub patches: Vec<TexPatch>,
}

/// The `PNAMES` patch-name table, or empty if the lump is absent.
pub fn load_patch_names(wad: &Wad) -> Vec<String> {
    let Some(bytes) = wad.lump_bytes_by_name("PNAMES") else {
        return Vec::new();
    };
    if bytes.len() < 4 {
        return Vec::new();
    }
    let num = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;

    let mut names = Vec::with_capacity(num);
    for i in 0..num {
        let Some(raw) = bytes.get(4 + i * 8..4 + i * 8 + 8) else {
            log::warn!("PNAMES claims {num} entries but holds only {i}");
            break;
        };
        let name: &[u8; 8] = raw.try_into().unwrap();
        names.push(Wad::lump_name_str(name).to_ascii_uppercase());
    }
    names
}

/// Decode every patch the name table references, palette-mapped.
///
/// A missing or corrupt patch becomes the checkerboard placeholder so
/// later indices stay aligned with `PNAMES`.
pub fn decode_all_patches(wad: &Wad, pal: &Palette) -> Vec<Picture> {
    load_patch_names(wad)
        .iter()
        .map(|name| match wad.lump_bytes_by_name(name) {
            Some(bytes) => decode_patch(name, bytes, pal).unwrap_or_else(|e| {
                log::warn!("{e}; using placeholder");
                Picture::default()
            }),
            None => {
                log::warn!("patch `{name}` named in PNAMES but absent; using placeholder");
                Picture::default()
            }
        })
        .collect()
}

/// Scan `TEXTURE1` then `TEXTURE2` for a definition called `name`
/// (case-insensitive, vanilla rules).
pub fn find_texture_def(wad: &Wad, name: &str) -> Option<TextureDef> {
    for table in ["TEXTURE1", "TEXTURE2"] {
        let Some(bytes) = wad.lump_bytes_by_name(table) else {
            continue;
        };
        if bytes.len() < 4 {
            continue;
        }
        let ntex = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;

        for t in 0..ntex {
            let Some(ofs) = bytes.get(4 + t * 4..4 + t * 4 + 4) else {
                break;
            };
            let off = u32::from_le_bytes([ofs[0], ofs[1], ofs[2], ofs[3]]) as usize;
            let Some(entry) = bytes.get(off..) else {
                continue;
            };
            if entry.len() < 22 {
                continue;
            }

            let e_name: &[u8; 8] = entry[0..8].try_into().unwrap();
            if !Wad::lump_name_str(e_name).eq_ignore_ascii_case(name) {
                continue;
            }

            let w = i16::from_le_bytes([entry[12], entry[13]]) as usize;
            let h = i16::from_le_bytes([entry[14], entry[15]]) as usize;
            let np = u16::from_le_bytes([entry[20], entry[21]]) as usize;

            let mut patches = Vec::with_capacity(np);
            for p in 0..np {
                let Some(pinfo) = entry.get(22 + p * 10..22 + p * 10 + 10) else {
                    break;
                };
                patches.push(TexPatch {
                    origin_x: i16::from_le_bytes([pinfo[0], pinfo[1]]) as i32,
                    origin_y: i16::from_le_bytes([pinfo[2], pinfo[3]]) as i32,
                    patch: u16::from_le_bytes([pinfo[4], pinfo[5]]) as usize,
                });
            }

            return Some(TextureDef {
                name: Wad::lump_name_str(e_name).to_ascii_uppercase(),
                w,
                h,
                patches,
            });
        }
    }
    None
}

/*====================================================================*/
/*                          Compositing                               */
/*====================================================================*/

/// Blit every listed patch onto a canvas of the declared size, in order.
///
/// Later patches draw over earlier ones wherever they are opaque;
/// transparent source pixels never erase what is already there, and
/// placements hanging off the canvas are clipped.
pub fn compose_texture(def: &TextureDef, patches: &[Picture]) -> Picture {
    let mut canvas = Picture::blank(def.name.clone(), def.w, def.h);
    for tp in &def.patches {
        let Some(patch) = patches.get(tp.patch) else {
            log::warn!(
                "texture `{}` references patch #{} outside PNAMES",
                def.name,
                tp.patch
            );
            continue;
        };
        blit(&mut canvas, patch, tp.origin_x, tp.origin_y);
    }
    canvas
}

fn blit(dest: &mut Picture, src: &Picture, ox: i32, oy: i32) {
    for sy in 0..src.h {
        let dy = oy + sy as i32;
        if !(0..dest.h as i32).contains(&dy) {
            continue;
        }
        for sx in 0..src.w {
            let dx = ox + sx as i32;
            if !(0..dest.w as i32).contains(&dx) {
                continue;
            }
            if src.is_opaque(sx, sy) {
                let px = src.pixel(sx, sy);
                dest.put(dx as usize, dy as usize, [px[0], px[1], px[2]]);
            }
        }
    }
}

/// `PLAYPAL` → active palette (first 768-byte block only).
pub fn load_palette(wad: &Wad) -> Option<Palette> {
    Palette::from_lump(wad.lump_bytes_by_name("PLAYPAL")?)
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
