// ──────────────────────────────────────────────────────────────────────────
// wad/loader.rs
//
//  *   RawLevel    (wad::level)          ──╮
//  *   Palette / patches  (from Wad)       │  --->  world::geometry::Level
//  *   PictureBank (mut)                   │         + populated PictureBank
//                                          ╯
// ──────────────────────────────────────────────────────────────────────────

use crate::{
    wad::level as raw_level,
    wad::picture,
    wad::wad::{Wad, WadError},
    world::geometry as geo,
    world::texture::{NO_PICTURE, Palette, PictureBank, PictureBankError, PictureId},
};
use glam::{Vec2, vec2};
use thiserror::Error;

/*──────────────────────────── Error type ───────────────────────────*/

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Wad(#[from] WadError),

    #[error(transparent)]
    Level(#[from] raw_level::LevelError),

    #[error(transparent)]
    Bank(#[from] PictureBankError),
}

/*====================================================================*/
/*                       Public API                                   */
/*====================================================================*/

/// Load the map at `marker` into a `world::Level` and populate `bank`
/// with every picture the map references.
///
/// Missing art never fails the load: unknown texture / flat names resolve
/// to the bank's placeholder id (0) and are logged.
pub fn load_level(
    wad: &Wad,
    marker: usize,
    bank: &mut PictureBank,
) -> Result<geo::Level, LoadError> {
    /*----- 1. Raw records ------------------------------------------------*/
    let raw = wad.parse_level(marker)?;

    /*----- 2. Palette needed for patches + flats -------------------------*/
    let palette = picture::load_palette(wad).unwrap_or_else(|| {
        log::warn!("PLAYPAL missing or short; substituting greyscale palette");
        let mut pal = Palette::default();
        for i in 0..256 {
            pal[i] = [i as u8, i as u8, i as u8];
        }
        pal
    });

    /*----- 3. Patch cache (PNAMES index → Picture) -----------------------*/
    let patch_vec = picture::decode_all_patches(wad, &palette);

    /*----- 4. Helper: resolve name → PictureId ---------------------------*/
    let pic_id = |bank: &mut PictureBank,
                      name_bytes: &[u8; 8]|
     -> Result<PictureId, LoadError> {
        let name = Wad::lump_name_str(name_bytes).to_ascii_uppercase();
        if name.is_empty() || name == "-" {
            // explicitly-absent reference (untextured side)
            return Ok(NO_PICTURE);
        }
        if let Some(id) = bank.id(&name) {
            return Ok(id);
        }
        if let Some(def) = picture::find_texture_def(wad, &name) {
            let tex = picture::compose_texture(&def, &patch_vec);
            return Ok(bank.insert(name, tex)?);
        }
        if let Some(flat) = wad
            .lump_bytes_by_name(&name)
            .and_then(|bytes| picture::decode_flat(&name, bytes, &palette))
        {
            return Ok(bank.insert(name, flat)?);
        }
        log::warn!("picture `{name}` not found in container; using placeholder");
        Ok(NO_PICTURE)
    };

    /*----- 5. Convert raw → geo lists ------------------------------------*/
    use geo::*;

    let things: Vec<Thing> = raw.things.into_iter().map(raw_to_geo::thing_from).collect();

    let linedefs: Vec<Linedef> = raw
        .linedefs
        .into_iter()
        .map(raw_to_geo::linedef_from)
        .collect();

    let vertices: Vec<Vertex> = raw
        .vertices
        .into_iter()
        .map(raw_to_geo::vertex_from)
        .collect();

    let segs: Vec<Seg> = raw.segs.into_iter().map(raw_to_geo::seg_from).collect();

    let subsectors: Vec<Subsector> = raw
        .subsectors
        .into_iter()
        .map(raw_to_geo::subsector_from)
        .collect();

    let nodes: Vec<Node> = raw.nodes.into_iter().map(raw_to_geo::node_from).collect();

    /*----- lists that need picture look-ups ------------------------------*/
    let sidedefs: Vec<Sidedef> = raw
        .sidedefs
        .into_iter()
        .map(|s| {
            Ok(Sidedef {
                x_off: s.x_off as f32,
                y_off: s.y_off as f32,
                upper: pic_id(bank, &s.top_tex)?,
                lower: pic_id(bank, &s.bottom_tex)?,
                middle: pic_id(bank, &s.mid_tex)?,
                sector: s.sector as u16,
            })
        })
        .collect::<Result<_, LoadError>>()?;

    let sectors: Vec<Sector> = raw
        .sectors
        .into_iter()
        .map(|s| {
            Ok(Sector {
                floor_h: s.floor_h as f32,
                ceil_h: s.ceil_h as f32,
                floor_pic: pic_id(bank, &s.floor_tex)?,
                ceil_pic: pic_id(bank, &s.ceil_tex)?,
                light: s.light.clamp(0, 255) as u8,
                special: s.special,
                tag: s.tag,
            })
        })
        .collect::<Result<_, LoadError>>()?;

    bank.set_palette(palette);

    /*----- 6. Assemble world::Level --------------------------------------*/
    let mut level = Level {
        name: raw.name,
        things,
        linedefs,
        sidedefs,
        vertices,
        segs,
        subsectors,
        nodes,
        sectors,
        sector_of_subsector: Vec::new(),
    };
    check_references(&level);
    level.finalise_bsp();
    Ok(level)
}

/// Index-invariant sweep: every sidedef must name a real sector and every
/// linedef real vertices. Violations are decoding faults in the data, not
/// load failures — downstream geometry skips the offenders.
fn check_references(level: &geo::Level) {
    for (i, sd) in level.sidedefs.iter().enumerate() {
        if sd.sector as usize >= level.sectors.len() {
            log::warn!(
                "{}: sidedef #{i} references sector {} of {}",
                level.name,
                sd.sector,
                level.sectors.len()
            );
        }
    }
    for (i, ld) in level.linedefs.iter().enumerate() {
        if ld.v1 as usize >= level.vertices.len() || ld.v2 as usize >= level.vertices.len() {
            log::warn!(
                "{}: linedef #{i} references vertices ({}, {}) of {}",
                level.name,
                ld.v1,
                ld.v2,
                level.vertices.len()
            );
        }
    }
}

/*====================================================================*/
/*                  Raw → Geo helpers (local)                         */
/*====================================================================*/
mod raw_to_geo {
    use super::*;

    pub fn thing_from(r: raw_level::RawThing) -> geo::Thing {
        let min_skill = match r.options & 0x0007 {
            0x0001 => 1,
            0x0002 => 2,
            0x0004 => 3,
            _ => 1,
        };
        geo::Thing {
            pos: vec2(r.x as f32, r.y as f32),
            angle: (r.angle as f32).to_radians(),
            type_id: r.type_ as u16,
            min_skill,
            is_deaf: r.options & 0x0020 != 0,
            multiplayer: r.options & 0x0100 != 0,
        }
    }

    pub fn linedef_from(r: raw_level::RawLinedef) -> geo::Linedef {
        geo::Linedef {
            v1: r.v1 as u16,
            v2: r.v2 as u16,
            flags: geo::LinedefFlags::from_bits_truncate(r.flags as u16),
            special: r.special as u16,
            tag: r.tag as u16,
            right_sidedef: (r.sidenum[0] >= 0).then_some(r.sidenum[0] as u16),
            left_sidedef: (r.sidenum[1] >= 0).then_some(r.sidenum[1] as u16),
        }
    }

    pub fn vertex_from(r: raw_level::RawVertex) -> geo::Vertex {
        geo::Vertex {
            pos: vec2(r.x as f32, r.y as f32),
        }
    }

    pub fn seg_from(r: raw_level::RawSeg) -> geo::Seg {
        geo::Seg {
            v1: r.v1 as u16,
            v2: r.v2 as u16,
            linedef: r.linedef as u16,
            dir: r.side as u16,
            offset: r.offset as f32,
        }
    }

    pub fn subsector_from(r: raw_level::RawSubsector) -> geo::Subsector {
        geo::Subsector {
            seg_count: r.seg_count as u16,
            first_seg: r.first_seg as u16,
        }
    }

    const BOXTOP: usize = 0;
    const BOXBOTTOM: usize = 1;
    const BOXLEFT: usize = 2;
    const BOXRIGHT: usize = 3;

    #[inline]
    fn raw_bbox_to_aabb(raw: &[i16; 4]) -> geo::Aabb {
        geo::Aabb {
            min: Vec2::new(raw[BOXLEFT] as f32, raw[BOXBOTTOM] as f32),
            max: Vec2::new(raw[BOXRIGHT] as f32, raw[BOXTOP] as f32),
        }
    }

    pub fn node_from(r: raw_level::RawNode) -> geo::Node {
        geo::Node {
            x: r.x as f32,
            y: r.y as f32,
            dx: r.dx as f32,
            dy: r.dy as f32,
            bbox: [raw_bbox_to_aabb(&r.bbox[0]), raw_bbox_to_aabb(&r.bbox[1])],
            child: r.child,
        }
    }
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
