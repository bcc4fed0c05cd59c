//! Player movement resolution on top of the collision model.
//!
//! Horizontal motion slides along walls by retrying the two axis
//! components of a blocked displacement independently — no contact
//! normals needed. Vertical motion is a two-state machine (Grounded /
//! Airborne) with the classic 24-unit stair-step rule, gravity, ceiling
//! clamping and a minimum-headroom gate. Every query has a fallback
//! answer, so a malformed map degrades fidelity, never availability.

use glam::{Vec2, vec2};

use crate::sim::collision::CollisionModel;
use crate::world::geometry::SectorId;

/* ----------------------------------------------------------------- */
/*  Physics constants (f32 map-units)                                */
/* ----------------------------------------------------------------- */

/// Maximum floor rise absorbed instantly without going airborne.
pub const MAX_STEP_HEIGHT: f32 = 24.0;
/// One map unit per tic² at the vanilla 35 Hz tic rate.
pub const GRAVITY: f32 = 1225.0;
/// Player collision cylinder.
pub const PLAYER_RADIUS: f32 = 16.0;
pub const PLAYER_HEIGHT: f32 = 56.0;
/// Gap kept between the head and the ceiling when clamped.
const CEILING_CLEARANCE: f32 = 2.0;
/// Per-tick time cap: a stalled driver must not cause huge integrations.
const MAX_DT: f32 = 0.1;
/// Below the lowest representable floor; guards point-location misses.
const MIN_HEIGHT: f32 = -32768.0;

/// Vertical contact state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalState {
    Grounded,
    Airborne,
}

/// Per-tick driver input.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveInput {
    /// Desired horizontal displacement for this tick (already scaled).
    pub delta: Vec2,
    /// Facing angle in radians (used for door interaction).
    pub facing: f32,
    /// "use / interact" trigger pressed this tick.
    pub use_door: bool,
}

/// What the driver gets back.
#[derive(Clone, Copy, Debug)]
pub struct MoveOutcome {
    pub pos: Vec2,
    /// Feet height.
    pub height: f32,
    /// Region the player stands in (for HUD / diagnostics).
    pub sector: Option<SectorId>,
    pub door_opened: bool,
}

/// The player body being resolved against a [`CollisionModel`].
pub struct MovementResolver {
    pub pos: Vec2,
    height: f32,
    vel_z: f32,
    state: VerticalState,
    radius: f32,
    stand_height: f32,
}

impl MovementResolver {
    /// Place a player-sized body at `spawn`, feet snapped to the local
    /// floor (or 0 when the map has no usable region).
    pub fn new(spawn: Vec2, model: &CollisionModel) -> Self {
        let height = model.region_at(spawn).map(|r| r.floor_h).unwrap_or(0.0);
        Self {
            pos: spawn,
            height,
            vel_z: 0.0,
            state: VerticalState::Grounded,
            radius: PLAYER_RADIUS,
            stand_height: PLAYER_HEIGHT,
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn state(&self) -> VerticalState {
        self.state
    }

    /// Can the body stand at `p`? Checks wall overlap, the standing
    /// headroom of the target region, and the step-up limit.
    fn can_occupy(&self, model: &CollisionModel, p: Vec2) -> bool {
        if model.blocked(p, self.radius) {
            return false;
        }
        match model.region_at(p) {
            Some(r) => {
                r.ceil_h - r.floor_h >= self.stand_height
                    && r.floor_h - self.height <= MAX_STEP_HEIGHT
            }
            // no regions at all: nothing to reject against
            None => true,
        }
    }

    /// Advance one tick. `dt` is wall-clock seconds from the driver,
    /// capped before integration.
    pub fn update(&mut self, model: &mut CollisionModel, dt: f32, input: MoveInput) -> MoveOutcome {
        let dt = dt.clamp(0.0, MAX_DT);

        /* ----- doors -------------------------------------------------- */
        let facing = vec2(input.facing.cos(), input.facing.sin());
        let door_opened = input.use_door && model.open_door(self.pos, facing);

        /* ----- horizontal: slide by axis decomposition ---------------- */
        if input.delta != Vec2::ZERO {
            let target = self.pos + input.delta;
            if self.can_occupy(model, target) {
                self.pos = target;
            } else {
                let x_only = self.pos + vec2(input.delta.x, 0.0);
                if self.can_occupy(model, x_only) {
                    self.pos = x_only;
                }
                let y_only = self.pos + vec2(0.0, input.delta.y);
                if self.can_occupy(model, y_only) {
                    self.pos = y_only;
                }
            }
        }

        /* ----- vertical ----------------------------------------------- */
        let region = model.region_at(self.pos);
        if let Some(r) = region {
            let (floor, ceil) = (r.floor_h, r.ceil_h);

            match self.state {
                VerticalState::Grounded => {
                    let diff = floor - self.height;
                    if diff.abs() <= MAX_STEP_HEIGHT {
                        // stair-step rule: absorb immediately
                        self.height = floor;
                        self.vel_z = 0.0;
                    } else if diff < 0.0 {
                        // walked off a ledge: let gravity take over
                        self.state = VerticalState::Airborne;
                    }
                    // a rise beyond the step limit is a wall as far as
                    // horizontal resolution is concerned; nothing to do
                }
                VerticalState::Airborne => {}
            }

            if self.state == VerticalState::Airborne {
                self.vel_z -= GRAVITY * dt;
                self.height += self.vel_z * dt;
                if self.height <= floor {
                    self.height = floor;
                    self.vel_z = 0.0;
                    self.state = VerticalState::Grounded;
                }
            }

            // ceiling contact: clamp with clearance, kill upward speed
            let head_limit = ceil - CEILING_CLEARANCE - self.stand_height;
            if self.height > head_limit {
                self.height = head_limit;
                if self.vel_z > 0.0 {
                    self.vel_z = 0.0;
                }
            }
        }

        // absolute safety net against point-location misses
        if self.height < MIN_HEIGHT {
            self.height = MIN_HEIGHT;
            self.vel_z = 0.0;
            self.state = VerticalState::Grounded;
        }

        MoveOutcome {
            pos: self.pos,
            height: self.height,
            sector: region.map(|r| r.sector),
            door_opened,
        }
    }
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
