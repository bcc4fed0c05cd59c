//! Doom-format asset decoding and first-person movement simulation.
//!
//! The crate is split along the same lines as the data it consumes:
//!
//! * [`wad`]   — container parsing: directory, map lumps, pictures.
//! * [`world`] — decoded level geometry, floor polygons, the picture bank.
//! * [`sim`]   — the collision model and the movement resolver built on it.
//!
//! A typical pipeline: open a [`wad::Wad`], pick a map marker from
//! [`wad::Wad::level_indices`], run [`wad::load_level`] to get a
//! [`world::Level`] plus a populated [`world::PictureBank`], then build a
//! [`sim::CollisionModel`] and step a [`sim::MovementResolver`] against it.

pub mod sim;
pub mod wad;
pub mod world;

#[cfg(test)]
mod tests {
    use glam::vec2;

    use crate::sim::{CollisionModel, MoveInput, MovementResolver, VerticalState};
    use crate::wad::testwad::square_map_wad;
    use crate::wad::{Wad, load_level};
    use crate::world::PictureBank;

    /// The whole pipeline on the canonical square room: bytes in, a standing
    /// player out.
    #[test]
    fn square_room_end_to_end() {
        let wad = Wad::from_bytes(square_map_wad()).unwrap();
        let maps = wad.level_indices();
        assert_eq!(maps.len(), 1);

        let mut bank = PictureBank::with_placeholder();
        let level = load_level(&wad, maps[0], &mut bank).unwrap();
        assert_eq!(level.name, "MAP01");
        assert_eq!(level.vertices.len(), 4);
        assert_eq!(level.linedefs.len(), 4);
        assert_eq!(level.sectors.len(), 1);
        assert!(level.things.is_empty());

        let mut model = CollisionModel::build(&level);
        assert_eq!(model.lines().len(), 4);
        assert_eq!(model.regions().len(), 1);
        assert_eq!(model.door_count(), 0);

        let spawn = vec2(128.0, 128.0);
        let mut player = MovementResolver::new(spawn, &model);
        assert_eq!(player.height(), model.regions()[0].floor_h);

        // Two seconds of idling must not move the player at all.
        for _ in 0..70 {
            player.update(&mut model, 1.0 / 35.0, MoveInput::default());
        }
        assert_eq!(player.pos, spawn);
        assert_eq!(player.height(), model.regions()[0].floor_h);
        assert_eq!(player.state(), VerticalState::Grounded);
    }
}
