//! Catch Arcade - simulation core for catch-and-grab arcade mini-games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, falling, collisions, scoring, claw cycle)
//! - `settings`: Data-driven variant configuration
//! - `audio`: Optional feedback hook for sound/haptics layers
//!
//! Rendering, audio synthesis and input plumbing live outside this crate. They read
//! [`sim::Snapshot`] and listen to [`sim::GameEvent`]s.

pub mod audio;
pub mod settings;
pub mod sim;

pub use audio::{Cue, FeedbackHook};
pub use settings::{ConfigError, GameConfig, Variant};
pub use sim::{Game, GameEvent, Snapshot};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed render tick used by the demo driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Period of the wall-clock countdown (seconds)
    pub const COUNTDOWN_PERIOD: f32 = 1.0;

    /// Logical playfield size
    pub const PLAYFIELD_WIDTH: f32 = 200.0;
    pub const PLAYFIELD_HEIGHT: f32 = 200.0;

    /// Falling entities enter just above the visible top edge
    pub const SPAWN_Y: f32 = -20.0;
    /// Entities below this line are discarded
    pub const DESPAWN_Y: f32 = 220.0;

    /// Lane layout: LEFT [0, 66), CENTER [66, 133), RIGHT [133, 200]
    pub const LANE_CENTERS: [f32; 3] = [33.0, 100.0, 166.0];
    pub const LANE_BOUNDS: [f32; 2] = [66.0, 133.0];
    /// Basket line and half-height of the catch band
    pub const CATCH_Y: f32 = 160.0;
    pub const CATCH_BAND: f32 = 15.0;

    /// Spawn pacing (seconds)
    pub const BASE_SPAWN_INTERVAL: f32 = 1.5;
    pub const MIN_SPAWN_INTERVAL: f32 = 0.5;
    pub const SPAWN_INTERVAL_STEP: f32 = 0.2;

    /// Points needed per level
    pub const LEVEL_SCORE_STEP: u64 = 500;
    /// Session length for timed variants (seconds)
    pub const TIME_LIMIT: u32 = 60;
    /// Seconds added by a clock pickup
    pub const CLOCK_BONUS: u32 = 5;

    /// Claw defaults - the claw rests near the top and dives to the pile
    pub const CLAW_REST_Y: f32 = 30.0;
    pub const CLAW_FLOOR_Y: f32 = 150.0;
    pub const CLAW_VERTICAL_SPEED: f32 = 90.0; // units/s
    pub const CLAW_HORIZONTAL_SPEED: f32 = 80.0; // units/s
    pub const CLAW_EXIT_X: f32 = 25.0;
    pub const CLAW_GRAB_WAIT: f32 = 0.5;
    pub const CLAW_RESET_WAIT: f32 = 0.5;
    pub const CLAW_GRAB_RANGE: f32 = 25.0;
    /// Held doll hangs this far below the claw
    pub const HELD_OFFSET: f32 = 15.0;
    pub const PILE_SIZE: usize = 6;
}

/// Clamp a point into the playfield, keeping `margin` units from every edge
#[inline]
pub fn clamp_to_playfield(pos: Vec2, width: f32, height: f32, margin: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(margin, (width - margin).max(margin)),
        pos.y.clamp(margin, (height - margin).max(margin)),
    )
}
