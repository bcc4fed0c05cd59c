pub mod collision;
pub mod movement;

pub use collision::{CollisionLine, CollisionModel, DOOR_SPECIALS, FloorRegion, USE_RANGE};
pub use movement::{
    GRAVITY, MAX_STEP_HEIGHT, MoveInput, MoveOutcome, MovementResolver, PLAYER_HEIGHT,
    PLAYER_RADIUS, VerticalState,
};
