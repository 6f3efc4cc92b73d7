//! Claw machine automation cycle
//!
//! `Idle -> Descend -> Grab -> GrabWait -> Ascend -> MoveExit -> Drop -> Reset -> Idle`.
//! One trigger runs the whole cycle; manual input is only honoured in `Idle`. Each tick
//! does the work of the current stage only, so every stage is observed for at least
//! one tick.

use serde::{Deserialize, Serialize};

use super::GameEvent;
use super::control::try_grab;
use super::state::{GameState, Grip};
use super::tick::drop_held;
use crate::settings::{ClawTuning, GameConfig};

/// Stage of the automation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClawStage {
    /// Waiting for the trigger; horizontal position is player-controlled
    #[default]
    Idle,
    Descend,
    Grab,
    GrabWait,
    Ascend,
    MoveExit,
    Drop,
    Reset,
}

impl ClawStage {
    /// Only `Idle` takes movement and trigger input
    pub fn accepts_input(&self) -> bool {
        *self == ClawStage::Idle
    }
}

/// Session-global automation state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClawCycle {
    pub stage: ClawStage,
    /// Countdown for the timed stages (seconds)
    pub timer: f32,
}

impl ClawCycle {
    /// Start the cycle. Ignored outside `Idle`.
    pub fn trigger(&mut self) -> bool {
        if !self.stage.accepts_input() {
            return false;
        }
        self.enter(ClawStage::Descend);
        true
    }

    fn enter(&mut self, stage: ClawStage) {
        log::debug!("Claw {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }
}

/// Advance the cycle by one tick
pub fn step(
    state: &mut GameState,
    config: &GameConfig,
    tuning: &ClawTuning,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    let floor = tuning.floor_y.min(config.height);

    match state.claw.stage {
        ClawStage::Idle => {
            state.actor.pos.y = tuning.rest_y;
        }
        ClawStage::Descend => {
            let y = (state.actor.pos.y + tuning.vertical_speed * dt).min(floor);
            state.actor.pos.y = y;
            if y >= floor {
                state.claw.enter(ClawStage::Grab);
            }
        }
        ClawStage::Grab => {
            try_grab(state, tuning, events);
            state.actor.grip = Grip::Closed;
            state.claw.timer = tuning.grab_wait;
            state.claw.enter(ClawStage::GrabWait);
        }
        ClawStage::GrabWait => {
            state.claw.timer -= dt;
            if state.claw.timer <= 0.0 {
                state.claw.enter(ClawStage::Ascend);
            }
        }
        ClawStage::Ascend => {
            let y = (state.actor.pos.y - tuning.vertical_speed * dt).max(tuning.rest_y);
            state.actor.pos.y = y;
            if y <= tuning.rest_y {
                state.claw.enter(ClawStage::MoveExit);
            }
        }
        ClawStage::MoveExit => {
            let x = state.actor.pos.x;
            let delta = tuning.exit_x - x;
            let reach = tuning.horizontal_speed * dt;
            if delta.abs() <= reach {
                state.actor.pos.x = tuning.exit_x;
                state.claw.enter(ClawStage::Drop);
            } else {
                state.actor.pos.x = x + reach * delta.signum();
            }
        }
        ClawStage::Drop => {
            drop_held(state, config, events);
            state.claw.timer = tuning.reset_wait;
            state.claw.enter(ClawStage::Reset);
        }
        ClawStage::Reset => {
            state.claw.timer -= dt;
            if state.claw.timer <= 0.0 {
                state.claw.enter(ClawStage::Idle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Variant;
    use crate::sim::spawn::refill_pile;
    use crate::sim::state::{Entity, EntityKind, GamePhase};
    use crate::sim::tick::update;
    use glam::Vec2;

    fn claw_game() -> (GameState, GameConfig) {
        let config = GameConfig::preset(Variant::ClawMachine);
        let mut state = GameState::new(&config, 4242);
        state.phase = GamePhase::Playing;
        (state, config)
    }

    /// Run until back in Idle, returning the deduplicated stage trail
    fn run_cycle(state: &mut GameState, config: &GameConfig, events: &mut Vec<GameEvent>) -> Vec<ClawStage> {
        let mut trail = vec![state.claw.stage];
        for _ in 0..10_000 {
            update(state, config, SIM_DT, events);
            let stage = state.claw.stage;
            if trail.last() != Some(&stage) {
                trail.push(stage);
            }
            if stage == ClawStage::Idle {
                break;
            }
        }
        trail
    }

    #[test]
    fn test_full_cycle_visits_each_stage_once() {
        let (mut state, config) = claw_game();
        let mut events = Vec::new();
        assert!(state.claw.trigger());
        let trail = run_cycle(&mut state, &config, &mut events);
        assert_eq!(
            trail,
            vec![
                ClawStage::Descend,
                ClawStage::Grab,
                ClawStage::GrabWait,
                ClawStage::Ascend,
                ClawStage::MoveExit,
                ClawStage::Drop,
                ClawStage::Reset,
                ClawStage::Idle,
            ]
        );
        assert_eq!(state.actor.pos, Vec2::new(CLAW_EXIT_X, CLAW_REST_Y));
        assert_eq!(state.actor.grip, Grip::Open);
    }

    #[test]
    fn test_trigger_ignored_mid_cycle() {
        let (mut state, config) = claw_game();
        let mut events = Vec::new();
        state.claw.trigger();
        update(&mut state, &config, SIM_DT, &mut events);
        assert!(!state.claw.trigger());
        assert_eq!(state.claw.stage, ClawStage::Descend);
    }

    #[test]
    fn test_grab_and_deliver() {
        let (mut state, config) = claw_game();
        let id = state.next_entity_id();
        state.entities.push(Entity::new(
            id,
            EntityKind::Doll,
            Vec2::new(100.0, CLAW_FLOOR_Y + HELD_OFFSET),
            0.0,
        ));
        let spare = state.next_entity_id();
        state
            .entities
            .push(Entity::new(spare, EntityKind::Doll, Vec2::new(180.0, 180.0), 0.0));

        let mut events = Vec::new();
        state.claw.trigger();
        // Descend until the grab has happened
        while state.claw.stage != ClawStage::GrabWait {
            update(&mut state, &config, SIM_DT, &mut events);
        }
        assert_eq!(state.actor.held, Some(id));
        assert_eq!(state.held_count(), 1);

        // Held doll rides along on the way up
        update(&mut state, &config, 1.0, &mut events);
        update(&mut state, &config, SIM_DT, &mut events);
        let held = state.held_entity().unwrap();
        assert_eq!(held.pos, state.actor.pos + Vec2::new(0.0, HELD_OFFSET));

        run_cycle(&mut state, &config, &mut events);
        assert_eq!(state.actor.held, None);
        assert_eq!(state.score, 100);
        assert!(state.entities.iter().all(|e| e.id != id));
        assert!(events.contains(&GameEvent::Delivered {
            kind: EntityKind::Doll
        }));
    }

    #[test]
    fn test_drop_outside_destination_returns_to_pile() {
        let (mut state, mut config) = claw_game();
        if let Some(claw) = config.claw.as_mut() {
            claw.destination = crate::sim::collision::Rect::new(150.0, 0.0, 200.0, 200.0);
        }
        refill_pile(&mut state, &config);
        let target = state.entities[0].pos;
        state.actor.pos.x = target.x;
        state.entities[0].pos.y = CLAW_FLOOR_Y + HELD_OFFSET;
        let id = state.entities[0].id;

        let mut events = Vec::new();
        state.claw.trigger();
        run_cycle(&mut state, &config, &mut events);

        let doll = state.entities.iter().find(|e| e.id == id).unwrap();
        assert!(!doll.held);
        assert_eq!(state.actor.held, None);
        assert_eq!(state.score, 0);
        assert_eq!(state.entities.len(), PILE_SIZE);
        let crate::settings::Placement::Pile { area } = config.placement else {
            unreachable!()
        };
        assert!(area.contains(doll.pos));
        assert!(events.contains(&GameEvent::Returned {
            kind: EntityKind::Doll
        }));
    }

    #[test]
    fn test_empty_grab_completes_cycle() {
        let (mut state, config) = claw_game();
        let mut events = Vec::new();
        state.claw.trigger();
        let trail = run_cycle(&mut state, &config, &mut events);
        assert_eq!(trail.last(), Some(&ClawStage::Idle));
        assert!(events.is_empty());
    }

    #[test]
    fn test_last_delivery_refills_pile() {
        let (mut state, config) = claw_game();
        let id = state.next_entity_id();
        state.entities.push(Entity::new(
            id,
            EntityKind::Doll,
            Vec2::new(100.0, CLAW_FLOOR_Y + HELD_OFFSET),
            0.0,
        ));

        let mut events = Vec::new();
        state.claw.trigger();
        run_cycle(&mut state, &config, &mut events);

        assert!(events.contains(&GameEvent::BatchCleared));
        assert_eq!(state.entities.len(), PILE_SIZE);
        assert!(state.entities.iter().all(|e| e.id != id && !e.held));
    }
}
