//! Per-tick simulation update
//!
//! Spawn, fall, catch, discard, then pin the held entity to the actor. Everything that
//! changes score or ends the session goes through [`add_score`] and [`terminate`] so the
//! event stream stays one-event-per-mutation.

use glam::Vec2;

use super::claw;
use super::control::{Action, PositionInput};
use super::level::{level_for_score, spawn_interval_for_level};
use super::spawn::{refill_pile, resting_spot, spawn_falling};
use super::state::{Entity, GamePhase, GameState, Grip, KindRole};
use super::{GameEvent, collision};
use crate::settings::{ControlMode, FallModel, GameConfig, Placement};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Relative movement (lanes use only the sign of x)
    pub move_delta: Option<Vec2>,
    /// Absolute position or lane label
    pub position: Option<PositionInput>,
    /// Button press
    pub action: Option<Action>,
    /// Idle/demo mode - the autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the session by one tick of `dt` seconds. No-op unless playing.
pub fn update(state: &mut GameState, config: &GameConfig, dt: f32, events: &mut Vec<GameEvent>) {
    if !state.is_playing() {
        return;
    }
    state.time_ticks += 1;

    if config.control == ControlMode::Automated {
        if let Some(tuning) = &config.claw {
            claw::step(state, config, tuning, dt, events);
        }
    }

    // Overshoot past the interval is dropped, not carried
    if !config.placement.is_pile() {
        state.spawn_timer += dt;
        if state.spawn_timer > state.spawn_interval {
            spawn_falling(state, config);
            state.spawn_timer = 0.0;
        }
    }

    advance_entities(state, config, dt, events);
    sync_held(state, config);
}

/// Move, catch and discard entities
///
/// Walks indices from the back so `remove` never shifts an unvisited entity.
fn advance_entities(
    state: &mut GameState,
    config: &GameConfig,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    let scale = match config.spawn.fall {
        FallModel::PerTick => 1.0,
        FallModel::PerSecond => dt,
    };

    let mut i = state.entities.len();
    while i > 0 {
        i -= 1;
        // A hazard ended the session: leave the rest where they are
        if !state.is_playing() {
            break;
        }

        let entity = &mut state.entities[i];
        if entity.held {
            continue;
        }
        entity.pos.y += entity.speed * scale;

        if let Some(hit) = &config.hit {
            if hit.hits(&state.entities[i], &state.actor) {
                let caught = state.entities.remove(i);
                collect(state, config, caught, events);
                continue;
            }
        }

        if state.entities[i].pos.y > config.spawn.despawn_y {
            state.entities.remove(i);
        }
    }
}

/// Resolve a caught entity
pub fn collect(
    state: &mut GameState,
    config: &GameConfig,
    entity: Entity,
    events: &mut Vec<GameEvent>,
) {
    events.push(GameEvent::Collected { kind: entity.kind });

    match entity.kind.role() {
        KindRole::Fruit { points } => add_score(state, config, points, events),
        KindRole::Hazard => {
            terminate(state, events);
        }
        KindRole::Bonus { seconds } => {
            if let Some(remaining) = state.time_remaining.as_mut() {
                *remaining += seconds;
                events.push(GameEvent::TimeExtended {
                    remaining: *remaining,
                });
            }
        }
        // Scored on delivery
        KindRole::Collectible { .. } => {}
    }
}

/// Add points, re-derive level and shrink spawn pacing on level-up
pub fn add_score(state: &mut GameState, config: &GameConfig, points: u64, events: &mut Vec<GameEvent>) {
    state.score += points;

    let level = level_for_score(state.score, config.level_step);
    if level > state.level {
        state.level = level;
        state.spawn_interval = spawn_interval_for_level(level, &config.spawn);
        log::info!(
            "Level {} reached (spawn interval {:.2}s)",
            level,
            state.spawn_interval
        );
        events.push(GameEvent::LevelUp { level });
    }

    events.push(GameEvent::ScoreChanged {
        score: state.score,
        level: state.level,
    });
}

/// End the session. Only the first call while playing has any effect.
pub fn terminate(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    if !state.is_playing() {
        return false;
    }
    state.phase = GamePhase::Stopped;
    state.countdown.cancel();
    log::info!("Game over: score {}, level {}", state.score, state.level);
    events.push(GameEvent::GameEnded {
        score: state.score,
        level: state.level,
    });
    true
}

/// Release the held entity: score it inside the destination zone, otherwise put it
/// back on the pile. No-op with nothing held.
pub fn drop_held(state: &mut GameState, config: &GameConfig, events: &mut Vec<GameEvent>) {
    state.actor.grip = Grip::Open;
    let Some(id) = state.actor.held.take() else {
        return;
    };
    let Some(index) = state.entities.iter().position(|e| e.id == id) else {
        return;
    };
    state.entities[index].held = false;

    let (Some(tuning), Placement::Pile { area }) = (&config.claw, &config.placement) else {
        return;
    };

    if tuning.destination.contains(state.actor.pos) {
        let delivered = state.entities.remove(index);
        events.push(GameEvent::Delivered {
            kind: delivered.kind,
        });
        if let KindRole::Collectible { points } | KindRole::Fruit { points } = delivered.kind.role()
        {
            add_score(state, config, points, events);
        }
        if state.entities.is_empty() {
            events.push(GameEvent::BatchCleared);
            refill_pile(state, config);
        }
    } else {
        let area = *area;
        let pos = resting_spot(state, &area);
        let entity = &mut state.entities[index];
        entity.pos = pos;
        log::debug!("{} #{} returned to the pile", entity.kind.as_str(), entity.id);
        events.push(GameEvent::Returned { kind: entity.kind });
    }
}

/// Pin the held entity below the actor
pub fn sync_held(state: &mut GameState, config: &GameConfig) {
    let Some(id) = state.actor.held else {
        return;
    };
    let offset = config.claw.as_ref().map_or(0.0, |c| c.held_offset);
    let anchor = state.actor.pos + Vec2::new(0.0, offset);
    if let Some(entity) = state.entities.iter_mut().find(|e| e.id == id) {
        entity.pos = anchor;
    }
}

/// Demo-mode input: chase the lowest benign entity, or run the claw
pub fn autopilot(state: &GameState, config: &GameConfig) -> TickInput {
    let mut input = TickInput::default();

    match config.control {
        ControlMode::Lanes | ControlMode::Continuous => {
            let line = state.actor.pos.y;
            let target = state
                .entities
                .iter()
                .filter(|e| !e.kind.is_hazard() && e.pos.y < line)
                .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal));

            if let Some(target) = target {
                input.position = Some(PositionInput::Coordinate(target.pos.x));
            }
        }
        ControlMode::Automated => {
            if !state.claw.stage.accepts_input() {
                return input;
            }
            let x = state.actor.pos.x;
            let target = state.entities.iter().min_by(|a, b| {
                (a.pos.x - x)
                    .abs()
                    .partial_cmp(&(b.pos.x - x).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            if let Some(target) = target {
                let dx = target.pos.x - x;
                if dx.abs() < 3.0 {
                    input.action = Some(Action::Grab);
                } else {
                    input.move_delta = Some(Vec2::new(dx.clamp(-2.0, 2.0), 0.0));
                }
            }
        }
        ControlMode::Grabber => {
            let Some(tuning) = &config.claw else {
                return input;
            };
            let grab_point = state.actor.pos + Vec2::new(0.0, tuning.held_offset);
            let goal = if state.held_entity().is_some() {
                let dest = tuning.destination;
                Some(((dest.min + dest.max) / 2.0, dest.contains(state.actor.pos)))
            } else {
                collision::nearest_within(&state.entities, grab_point, f32::INFINITY).map(|i| {
                    let target = state.entities[i].pos;
                    let ready = target.distance(grab_point) < tuning.grab_range * 0.5;
                    (target - Vec2::new(0.0, tuning.held_offset), ready)
                })
            };
            if let Some((goal, ready)) = goal {
                if ready {
                    input.action = Some(Action::Grab);
                } else {
                    let delta = (goal - state.actor.pos).clamp_length_max(2.0);
                    input.move_delta = Some(delta);
                }
            }
        }
    }

    input
}
