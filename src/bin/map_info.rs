//! Dump the contents of a WAD from the container's point of view.
//!
//! ```bash
//! cargo run --bin map_info -- doom.wad
//! cargo run --bin map_info -- doom.wad --map 0 --lumps
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use wadworld::sim::CollisionModel;
use wadworld::wad::{Wad, load_level};
use wadworld::world::PictureBank;

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Path to the WAD file
    wad: PathBuf,

    /// Inspect a single map by index instead of all of them
    #[arg(long, value_name = "IDX")]
    map: Option<usize>,

    /// Also print the full lump directory
    #[arg(long)]
    lumps: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let wad = Wad::from_file(&opts.wad)?;
    println!(
        "{}: {:?}, {} lumps",
        opts.wad.display(),
        wad.kind(),
        wad.lumps().len()
    );

    if opts.lumps {
        for (i, lump) in wad.lumps().iter().enumerate() {
            println!(
                "{i:5}  {:<8}  offset {:8}  size {:8}",
                Wad::lump_name_str(&lump.name),
                lump.offset,
                lump.size
            );
        }
    }

    let markers = wad.level_indices();
    if markers.is_empty() {
        println!("no maps");
        return Ok(());
    }

    let picked: Vec<usize> = match opts.map {
        Some(idx) => {
            let Some(&marker) = markers.get(idx) else {
                anyhow::bail!("map index {idx} out of range ({} maps)", markers.len());
            };
            vec![marker]
        }
        None => markers,
    };

    for marker in picked {
        let mut bank = PictureBank::with_placeholder();
        let level = load_level(&wad, marker, &mut bank)?;
        let model = CollisionModel::build(&level);

        println!("\n{}", level.name);
        println!(
            "  {:4} vertices, {:4} linedefs, {:4} sidedefs, {:4} sectors, {:4} things",
            level.vertices.len(),
            level.linedefs.len(),
            level.sidedefs.len(),
            level.sectors.len(),
            level.things.len()
        );
        println!(
            "  {:4} collision lines ({} doors), {:4} floor regions, {:4} pictures",
            model.lines().len(),
            model.door_count(),
            model.regions().len(),
            bank.len()
        );
    }

    Ok(())
}
