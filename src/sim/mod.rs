//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - Time only from the caller (`dt` for ticks, wall-clock for the countdown)
//! - No rendering or platform dependencies

pub mod claw;
pub mod collision;
pub mod control;
pub mod countdown;
pub mod events;
pub mod game;
pub mod level;
pub mod spawn;
pub mod state;
pub mod tick;

pub use claw::{ClawCycle, ClawStage};
pub use collision::{HitGeometry, Rect};
pub use control::{Action, PositionInput};
pub use countdown::Countdown;
pub use events::{EventBus, GameEvent, SubscriptionId};
pub use game::Game;
pub use level::level_for_score;
pub use spawn::{SpawnRow, SpawnTable};
pub use state::{Actor, Entity, EntityKind, GamePhase, GameState, Grip, KindRole, Snapshot};
pub use tick::{TickInput, autopilot, update};
