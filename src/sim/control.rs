//! Direct actor control
//!
//! Maps movement deltas, positions and button presses onto the actor according to the
//! variant's control mode. Input that doesn't apply (stopped session, locked claw
//! stage, unknown label) is dropped silently.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::GameEvent;
use super::collision::{HitGeometry, lane_for_x, nearest_within};
use super::state::{GameState, Grip};
use super::tick::{drop_held, sync_held};
use crate::clamp_to_playfield;
use crate::settings::{ClawTuning, ControlMode, GameConfig};

/// Absolute position input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PositionInput {
    /// Named zone from a classifier or button (`LEFT`, `CENTER`, `RIGHT`, ...)
    Label(String),
    /// x in playfield units, already mirrored if the source needs it
    Coordinate(f32),
}

/// Button actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Grab/drop for the manual claw, trigger for the claw machine
    Grab,
    Start,
    Stop,
}

impl Action {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "grab" | "drop" | "space" | " " | "action" => Some(Action::Grab),
            "start" => Some(Action::Start),
            "stop" => Some(Action::Stop),
            _ => None,
        }
    }
}

/// Zone index for a label in an `n`-lane layout
pub fn lane_for_label(label: &str, lanes: usize) -> Option<usize> {
    if lanes == 0 {
        return None;
    }
    match label.trim() {
        "왼쪽" => Some(0),
        "정면" => Some(lanes / 2),
        "오른쪽" => Some(lanes - 1),
        other => match other.to_uppercase().as_str() {
            "LEFT" => Some(0),
            "CENTER" | "CENTRE" => Some(lanes / 2),
            "RIGHT" => Some(lanes - 1),
            _ => None,
        },
    }
}

/// Fixed x for a label on continuous playfields (thirds of the width)
fn coordinate_for_label(label: &str, width: f32) -> Option<f32> {
    lane_for_label(label, 3).map(|zone| width * (2 * zone + 1) as f32 / 6.0)
}

fn clamp_x(config: &GameConfig, x: f32) -> f32 {
    let margin = config.actor_margin;
    x.clamp(margin, (config.width - margin).max(margin))
}

fn set_lane(state: &mut GameState, config: &GameConfig, lane: usize) {
    let centers = config.lane_centers();
    if let Some(&x) = centers.get(lane) {
        state.actor.lane = Some(lane);
        state.actor.pos.x = x;
    }
}

/// Lane under an x coordinate, using the hit geometry's split points when available
fn lane_at(config: &GameConfig, x: f32) -> usize {
    match &config.hit {
        Some(HitGeometry::Lane { bounds, .. }) => lane_for_x(x, bounds),
        _ => config
            .lane_centers()
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - x)
                    .abs()
                    .partial_cmp(&(*b - x).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map_or(0, |(i, _)| i),
    }
}

/// Relative movement. Returns true if the actor moved.
pub fn move_actor(state: &mut GameState, config: &GameConfig, delta: Vec2) -> bool {
    if !state.is_playing() {
        return false;
    }
    let before = state.actor.pos;

    match config.control {
        ControlMode::Lanes => {
            if delta.x == 0.0 {
                return false;
            }
            let current = state.actor.lane.unwrap_or(0);
            let last = config.lane_centers().len().saturating_sub(1);
            let lane = if delta.x < 0.0 {
                current.saturating_sub(1)
            } else {
                (current + 1).min(last)
            };
            set_lane(state, config, lane);
        }
        ControlMode::Continuous => {
            state.actor.pos.x = clamp_x(config, state.actor.pos.x + delta.x);
        }
        ControlMode::Grabber => {
            state.actor.pos = clamp_to_playfield(
                state.actor.pos + delta,
                config.width,
                config.height,
                config.actor_margin,
            );
        }
        ControlMode::Automated => {
            if !state.claw.stage.accepts_input() {
                log::debug!("Claw busy ({:?}), movement ignored", state.claw.stage);
                return false;
            }
            state.actor.pos.x = clamp_x(config, state.actor.pos.x + delta.x);
        }
    }

    sync_held(state, config);
    state.actor.pos != before
}

/// Absolute positioning. Returns true if the input was accepted.
pub fn set_position(state: &mut GameState, config: &GameConfig, input: &PositionInput) -> bool {
    if !state.is_playing() {
        return false;
    }
    if config.control == ControlMode::Automated && !state.claw.stage.accepts_input() {
        log::debug!("Claw busy ({:?}), position ignored", state.claw.stage);
        return false;
    }

    match config.control {
        ControlMode::Lanes => {
            let lane = match input {
                PositionInput::Label(label) => lane_for_label(label, config.lane_centers().len()),
                PositionInput::Coordinate(x) => Some(lane_at(config, *x)),
            };
            let Some(lane) = lane else {
                log::debug!("Unknown position {:?}", input);
                return false;
            };
            set_lane(state, config, lane);
        }
        ControlMode::Continuous | ControlMode::Grabber | ControlMode::Automated => {
            let x = match input {
                PositionInput::Label(label) => coordinate_for_label(label, config.width),
                PositionInput::Coordinate(x) => Some(*x),
            };
            let Some(x) = x else {
                log::debug!("Unknown position {:?}", input);
                return false;
            };
            state.actor.pos.x = clamp_x(config, x);
        }
    }

    sync_held(state, config);
    true
}

/// Grab point: where a held entity hangs
pub fn grab_point(state: &GameState, tuning: &ClawTuning) -> Vec2 {
    state.actor.pos + Vec2::new(0.0, tuning.held_offset)
}

/// Pick up the nearest free entity within range. No-op if something is already held
/// or nothing is in range.
pub fn try_grab(state: &mut GameState, tuning: &ClawTuning, events: &mut Vec<GameEvent>) -> bool {
    if state.actor.held.is_some() {
        return false;
    }
    let point = grab_point(state, tuning);
    let Some(index) = nearest_within(&state.entities, point, tuning.grab_range) else {
        return false;
    };

    let entity = &mut state.entities[index];
    entity.held = true;
    entity.pos = point;
    state.actor.held = Some(entity.id);
    state.actor.grip = Grip::Closed;
    events.push(GameEvent::Grabbed { kind: entity.kind });
    true
}

/// Grab button. Returns true if it changed anything.
pub fn grab_action(state: &mut GameState, config: &GameConfig, events: &mut Vec<GameEvent>) -> bool {
    if !state.is_playing() {
        return false;
    }
    match (config.control, &config.claw) {
        (ControlMode::Grabber, Some(tuning)) => {
            if state.actor.held.is_some() {
                drop_held(state, config, events);
                true
            } else {
                try_grab(state, tuning, events)
            }
        }
        (ControlMode::Automated, Some(_)) => state.claw.trigger(),
        _ => false,
    }
}
