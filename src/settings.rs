//! Variant configuration
//!
//! Every mini-game runs on the same engine; what differs between them lives here as
//! data: spawn placement and table, hit geometry, fall model and control mode.
//! Configs can be loaded from JSON and are validated before use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::collision::{HitGeometry, Rect};
use crate::sim::spawn::{SpawnRow, SpawnTable};
use crate::sim::state::EntityKind;

/// Shipped game variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Three-lane basket, apples/bananas/bombs
    #[default]
    FruitCatcher,
    /// Free-moving bowl, rice/clocks/bombs
    RiceBowl,
    /// Coin-op claw running an automated grab cycle
    ClawMachine,
    /// Claw steered freely with a grab/drop button
    ManualClaw,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::FruitCatcher,
        Variant::RiceBowl,
        Variant::ClawMachine,
        Variant::ManualClaw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::FruitCatcher => "fruit-catcher",
            Variant::RiceBowl => "rice-bowl",
            Variant::ClawMachine => "claw-machine",
            Variant::ManualClaw => "manual-claw",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "fruit-catcher" | "fruit" | "basket" => Some(Variant::FruitCatcher),
            "rice-bowl" | "rice" | "bowl" => Some(Variant::RiceBowl),
            "claw-machine" | "claw" => Some(Variant::ClawMachine),
            "manual-claw" | "manual" => Some(Variant::ManualClaw),
            _ => None,
        }
    }
}

/// How input drives the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// Discrete lanes picked by label or left/right steps
    Lanes,
    /// Absolute or relative x on the actor line
    Continuous,
    /// Free 2D claw with a grab/drop toggle
    Grabber,
    /// Claw machine: trigger starts the automation cycle
    Automated,
}

impl ControlMode {
    pub fn uses_claw(&self) -> bool {
        matches!(self, ControlMode::Grabber | ControlMode::Automated)
    }
}

/// Where new entities appear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Placement {
    /// Random lane centre, just above the top edge
    Lanes { centers: Vec<f32> },
    /// Uniform x in `[margin, width - margin]`, just above the top edge
    Uniform { margin: f32 },
    /// Resting pile seeded on start and on batch clear
    Pile { area: Rect },
}

impl Placement {
    pub fn is_pile(&self) -> bool {
        matches!(self, Placement::Pile { .. })
    }
}

/// How fall speed is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallModel {
    /// `speed` units per update call
    PerTick,
    /// `speed * dt` units per update call
    PerSecond,
}

/// Spawn pacing and speed progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnTuning {
    pub base_interval: f32,
    pub min_interval: f32,
    pub interval_step: f32,
    pub base_speed: f32,
    pub speed_per_level: f32,
    pub fall: FallModel,
    pub spawn_y: f32,
    pub despawn_y: f32,
    pub table: SpawnTable,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            base_interval: BASE_SPAWN_INTERVAL,
            min_interval: MIN_SPAWN_INTERVAL,
            interval_step: SPAWN_INTERVAL_STEP,
            base_speed: 1.5,
            speed_per_level: 0.2,
            fall: FallModel::PerTick,
            spawn_y: SPAWN_Y,
            despawn_y: DESPAWN_Y,
            table: SpawnTable::fruit(),
        }
    }
}

/// Claw geometry and timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClawTuning {
    pub rest_y: f32,
    pub floor_y: f32,
    pub vertical_speed: f32,
    pub horizontal_speed: f32,
    pub exit_x: f32,
    pub grab_wait: f32,
    pub reset_wait: f32,
    pub grab_range: f32,
    pub held_offset: f32,
    pub pile_size: usize,
    pub pile_kind: EntityKind,
    /// Drop zone that scores a released doll
    pub destination: Rect,
}

impl Default for ClawTuning {
    fn default() -> Self {
        Self {
            rest_y: CLAW_REST_Y,
            floor_y: CLAW_FLOOR_Y,
            vertical_speed: CLAW_VERTICAL_SPEED,
            horizontal_speed: CLAW_HORIZONTAL_SPEED,
            exit_x: CLAW_EXIT_X,
            grab_wait: CLAW_GRAB_WAIT,
            reset_wait: CLAW_RESET_WAIT,
            grab_range: CLAW_GRAB_RANGE,
            held_offset: HELD_OFFSET,
            pile_size: PILE_SIZE,
            pile_kind: EntityKind::Doll,
            destination: Rect::new(0.0, 0.0, 50.0, PLAYFIELD_HEIGHT),
        }
    }
}

/// Config validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("playfield must be positive, got {width}x{height}")]
    InvalidPlayfield { width: f32, height: f32 },
    #[error("lane layout needs at least one lane and {expected} split points, got {actual}")]
    LaneLayout { expected: usize, actual: usize },
    #[error("lane control requires lane placement")]
    LaneControlWithoutLanes,
    #[error("spawn weights for level {min_level} sum to {total}, above 1.0")]
    WeightsExceedOne { min_level: u32, total: f32 },
    #[error("spawn table is empty")]
    EmptySpawnTable,
    #[error("spawn intervals must be positive with min <= base")]
    InvalidInterval,
    #[error("{control:?} control requires claw tuning")]
    MissingClawTuning { control: ControlMode },
    #[error("claw control requires pile placement")]
    ClawWithoutPile,
    #[error("{name} rectangle lies outside the playfield")]
    RectOutsidePlayfield { name: &'static str },
    #[error("level score step must be positive")]
    ZeroLevelStep,
}

/// Complete variant configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub variant: Variant,
    pub width: f32,
    pub height: f32,
    pub control: ControlMode,
    /// Actor keeps this distance from the playfield edges
    pub actor_margin: f32,
    /// Resting y of the basket/bowl (claws use `ClawTuning::rest_y`)
    pub actor_y: f32,
    pub placement: Placement,
    /// `None` for grab-only variants
    pub hit: Option<HitGeometry>,
    pub spawn: SpawnTuning,
    pub level_step: u64,
    /// Session length in seconds, `None` for untimed variants
    pub time_limit: Option<u32>,
    pub claw: Option<ClawTuning>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::preset(Variant::default())
    }
}

impl GameConfig {
    /// Built-in configuration for a variant
    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::FruitCatcher => Self {
                variant,
                width: PLAYFIELD_WIDTH,
                height: PLAYFIELD_HEIGHT,
                control: ControlMode::Lanes,
                actor_margin: 0.0,
                actor_y: CATCH_Y,
                placement: Placement::Lanes {
                    centers: LANE_CENTERS.to_vec(),
                },
                hit: Some(HitGeometry::Lane {
                    bounds: LANE_BOUNDS.to_vec(),
                    catch_y: CATCH_Y,
                    band: CATCH_BAND,
                }),
                spawn: SpawnTuning::default(),
                level_step: LEVEL_SCORE_STEP,
                time_limit: Some(TIME_LIMIT),
                claw: None,
            },
            Variant::RiceBowl => Self {
                variant,
                width: PLAYFIELD_WIDTH,
                height: PLAYFIELD_HEIGHT,
                control: ControlMode::Continuous,
                actor_margin: 15.0,
                actor_y: 170.0,
                placement: Placement::Uniform { margin: 15.0 },
                hit: Some(HitGeometry::Radius { radius: 20.0 }),
                spawn: SpawnTuning {
                    base_speed: 50.0,
                    speed_per_level: 10.0,
                    fall: FallModel::PerSecond,
                    table: SpawnTable::rice(),
                    ..SpawnTuning::default()
                },
                level_step: LEVEL_SCORE_STEP,
                time_limit: Some(TIME_LIMIT),
                claw: None,
            },
            Variant::ClawMachine | Variant::ManualClaw => Self {
                variant,
                width: PLAYFIELD_WIDTH,
                height: PLAYFIELD_HEIGHT,
                control: if variant == Variant::ClawMachine {
                    ControlMode::Automated
                } else {
                    ControlMode::Grabber
                },
                actor_margin: 10.0,
                actor_y: CLAW_REST_Y,
                placement: Placement::Pile {
                    area: Rect::new(70.0, 150.0, 185.0, 185.0),
                },
                hit: None,
                spawn: SpawnTuning {
                    base_speed: 0.0,
                    speed_per_level: 0.0,
                    table: SpawnTable::new(vec![SpawnRow::only(1, EntityKind::Doll)]),
                    ..SpawnTuning::default()
                },
                level_step: LEVEL_SCORE_STEP,
                time_limit: None,
                claw: Some(ClawTuning::default()),
            },
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(ConfigError::InvalidPlayfield {
                width: self.width,
                height: self.height,
            });
        }
        if self.level_step == 0 {
            return Err(ConfigError::ZeroLevelStep);
        }

        let spawn = &self.spawn;
        if spawn.min_interval <= 0.0 || spawn.base_interval < spawn.min_interval {
            return Err(ConfigError::InvalidInterval);
        }
        if spawn.table.rows.is_empty() {
            return Err(ConfigError::EmptySpawnTable);
        }
        for row in &spawn.table.rows {
            let total = row.total_weight();
            if total > 1.0 + f32::EPSILON {
                return Err(ConfigError::WeightsExceedOne {
                    min_level: row.min_level,
                    total,
                });
            }
        }

        match &self.placement {
            Placement::Lanes { centers } => {
                if centers.is_empty() {
                    return Err(ConfigError::LaneLayout {
                        expected: 0,
                        actual: 0,
                    });
                }
                if let Some(HitGeometry::Lane { bounds, .. }) = &self.hit {
                    if bounds.len() + 1 != centers.len() {
                        return Err(ConfigError::LaneLayout {
                            expected: centers.len().saturating_sub(1),
                            actual: bounds.len(),
                        });
                    }
                }
            }
            Placement::Pile { area } => {
                if !area.fits_within(self.width, self.height) {
                    return Err(ConfigError::RectOutsidePlayfield { name: "pile" });
                }
            }
            Placement::Uniform { .. } => {}
        }

        if self.control == ControlMode::Lanes && !matches!(self.placement, Placement::Lanes { .. })
        {
            return Err(ConfigError::LaneControlWithoutLanes);
        }

        if self.control.uses_claw() {
            let Some(claw) = &self.claw else {
                return Err(ConfigError::MissingClawTuning {
                    control: self.control,
                });
            };
            if !self.placement.is_pile() {
                return Err(ConfigError::ClawWithoutPile);
            }
            if !claw.destination.fits_within(self.width, self.height) {
                return Err(ConfigError::RectOutsidePlayfield {
                    name: "destination",
                });
            }
        }

        Ok(())
    }

    /// Lane centres for lane variants (empty otherwise)
    pub fn lane_centers(&self) -> &[f32] {
        match &self.placement {
            Placement::Lanes { centers } => centers,
            _ => &[],
        }
    }

    /// Middle lane for lane-controlled variants
    pub fn start_lane(&self) -> Option<usize> {
        (self.control == ControlMode::Lanes && !self.lane_centers().is_empty())
            .then(|| self.lane_centers().len() / 2)
    }

    /// Where the actor sits when a session starts
    pub fn start_position(&self) -> glam::Vec2 {
        let x = match self.start_lane() {
            Some(lane) => self.lane_centers()[lane],
            None => self.width / 2.0,
        };
        let y = match &self.claw {
            Some(claw) if self.control.uses_claw() => claw.rest_y,
            _ => self.actor_y,
        };
        glam::Vec2::new(x, y)
    }

    /// Load a config file, falling back to the preset when it is missing or invalid
    pub fn load_or_preset(path: Option<&std::path::Path>, variant: Variant) -> Self {
        let Some(path) = path else {
            return Self::preset(variant);
        };
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded {} config from {}", config.variant.as_str(), path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config {}: {}, using preset", path.display(), e);
                    Self::preset(variant)
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}, using preset", path.display(), e);
                Self::preset(variant)
            }
        }
    }
}
