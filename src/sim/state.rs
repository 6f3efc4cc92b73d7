//! Game state and core simulation types
//!
//! Everything a session mutates lives in [`GameState`]; the renderer only ever sees a
//! [`Snapshot`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::claw::{ClawCycle, ClawStage};
use super::countdown::Countdown;
use super::level::spawn_interval_for_level;
use crate::consts::*;
use crate::settings::GameConfig;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Not running: fresh, stopped, or ended
    #[default]
    Stopped,
    /// Active gameplay
    Playing,
}

/// Entity kinds across all variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Apple,
    Banana,
    Rice,
    Bomb,
    Clock,
    Doll,
}

/// What catching or delivering an entity does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindRole {
    /// Scores on catch
    Fruit { points: u64 },
    /// Ends the session on catch
    Hazard,
    /// Adds time on catch
    Bonus { seconds: u32 },
    /// Scores only once dropped in the destination zone
    Collectible { points: u64 },
}

impl EntityKind {
    pub fn role(&self) -> KindRole {
        match self {
            EntityKind::Apple => KindRole::Fruit { points: 100 },
            EntityKind::Banana => KindRole::Fruit { points: 200 },
            EntityKind::Rice => KindRole::Fruit { points: 100 },
            EntityKind::Bomb => KindRole::Hazard,
            EntityKind::Clock => KindRole::Bonus {
                seconds: CLOCK_BONUS,
            },
            EntityKind::Doll => KindRole::Collectible { points: 100 },
        }
    }

    pub fn is_hazard(&self) -> bool {
        matches!(self.role(), KindRole::Hazard)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Apple => "apple",
            EntityKind::Banana => "banana",
            EntityKind::Rice => "rice",
            EntityKind::Bomb => "bomb",
            EntityKind::Clock => "clock",
            EntityKind::Doll => "doll",
        }
    }
}

/// A spawned game object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    /// Fall speed (units per tick or per second, see `FallModel`). Zero for pile entities.
    pub speed: f32,
    /// Attached to the actor. Mirrors `Actor::held`.
    pub held: bool,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, speed: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            speed,
            held: false,
        }
    }
}

/// Claw grip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Grip {
    #[default]
    Open,
    Closed,
}

/// The basket, bowl or claw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub pos: Vec2,
    /// Current lane for lane-controlled variants
    pub lane: Option<usize>,
    pub grip: Grip,
    /// Id of the entity currently attached, if any
    pub held: Option<u32>,
}

impl Actor {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            lane: None,
            grip: Grip::Open,
            held: None,
        }
    }

    /// Starting actor for a config
    pub fn for_config(config: &GameConfig) -> Self {
        let mut actor = Self::new(config.start_position());
        actor.lane = config.start_lane();
        actor
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    pub level: u32,
    /// Seconds left on timed variants
    pub time_remaining: Option<u32>,
    /// Seconds accumulated toward the next spawn
    pub spawn_timer: f32,
    /// Current spawn interval (seconds)
    pub spawn_interval: f32,
    pub actor: Actor,
    /// Active entities in spawn order
    pub entities: Vec<Entity>,
    /// Automation cycle (stays Idle outside the claw machine)
    pub claw: ClawCycle,
    /// Wall-clock countdown task
    pub countdown: Countdown,
    /// Update calls processed this session
    pub time_ticks: u64,
    next_id: u32,
}

impl GameState {
    /// Create a stopped state with the given seed
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Stopped,
            score: 0,
            level: 1,
            time_remaining: config.time_limit,
            spawn_timer: 0.0,
            spawn_interval: spawn_interval_for_level(1, &config.spawn),
            actor: Actor::for_config(config),
            entities: Vec::new(),
            claw: ClawCycle::default(),
            countdown: Countdown::new(COUNTDOWN_PERIOD),
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Reinitialise everything a session owns. The RNG keeps running.
    pub fn reset(&mut self, config: &GameConfig) {
        self.phase = GamePhase::Stopped;
        self.score = 0;
        self.level = 1;
        self.time_remaining = config.time_limit;
        self.spawn_timer = 0.0;
        self.spawn_interval = spawn_interval_for_level(1, &config.spawn);
        self.actor = Actor::for_config(config);
        self.entities.clear();
        self.claw = ClawCycle::default();
        self.countdown.cancel();
        self.time_ticks = 0;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn held_entity(&self) -> Option<&Entity> {
        let id = self.actor.held?;
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn held_count(&self) -> usize {
        self.entities.iter().filter(|e| e.held).count()
    }
}

/// Read-only view handed to renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub level: u32,
    pub time_remaining: Option<u32>,
    pub actor: Actor,
    pub entities: Vec<Entity>,
    /// Present only for the automated claw
    pub claw_stage: Option<ClawStage>,
}

impl Snapshot {
    pub fn capture(state: &GameState, automated: bool) -> Self {
        Self {
            phase: state.phase,
            score: state.score,
            level: state.level,
            time_remaining: state.time_remaining,
            actor: state.actor.clone(),
            entities: state.entities.clone(),
            claw_stage: automated.then_some(state.claw.stage),
        }
    }
}
