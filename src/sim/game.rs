//! Game facade
//!
//! The single object a driver talks to: lifecycle, the two time sources (render tick
//! and wall-clock countdown), input, subscriptions and snapshots. Events raised during
//! a call are buffered and delivered once the call has finished mutating state.

use glam::Vec2;

use super::control::{self, Action, PositionInput};
use super::events::{EventBus, GameEvent, SubscriptionId};
use super::spawn::refill_pile;
use super::state::{GamePhase, GameState, Snapshot};
use super::tick::{self, TickInput};
use crate::audio::{Cue, FeedbackHook};
use crate::settings::{ControlMode, GameConfig, Variant};

/// One playable game instance
pub struct Game {
    config: GameConfig,
    state: GameState,
    bus: EventBus,
    feedback: Option<Box<dyn FeedbackHook>>,
    pending: Vec<GameEvent>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("variant", &self.config.variant)
            .field("phase", &self.state.phase)
            .field("score", &self.state.score)
            .field("level", &self.state.level)
            .field("subscribers", &self.bus.len())
            .field("feedback", &self.feedback.is_some())
            .finish()
    }
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let state = GameState::new(&config, seed);
        Self {
            config,
            state,
            bus: EventBus::new(),
            feedback: None,
            pending: Vec::new(),
        }
    }

    pub fn with_variant(variant: Variant, seed: u64) -> Self {
        Self::new(GameConfig::preset(variant), seed)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    /// Begin a fresh session. Restarting mid-game is an implicit stop + start.
    pub fn start(&mut self) {
        if self.state.is_playing() {
            self.stop();
        }
        self.state.reset(&self.config);
        if self.config.placement.is_pile() {
            refill_pile(&mut self.state, &self.config);
        }
        if self.state.time_remaining.is_some() {
            self.state.countdown.arm();
        }
        self.state.phase = GamePhase::Playing;
        log::info!(
            "{} started (seed {}, time limit {:?})",
            self.config.variant.as_str(),
            self.state.seed,
            self.config.time_limit
        );
        self.pending.push(GameEvent::Started);
        self.flush();
    }

    /// Halt ticks and the countdown. Does not emit `GameEnded`.
    pub fn stop(&mut self) {
        if self.state.is_playing() {
            log::info!("Stopped at score {}", self.state.score);
        }
        self.state.phase = GamePhase::Stopped;
        self.state.countdown.cancel();
    }

    /// Render-tick entry point
    pub fn update(&mut self, dt: f32) {
        tick::update(&mut self.state, &self.config, dt, &mut self.pending);
        self.flush();
    }

    /// Wall-clock entry point for the time limit
    pub fn advance_clock(&mut self, wall_dt: f32) {
        if !self.state.is_playing() {
            return;
        }
        let fired = self.state.countdown.advance(wall_dt);
        for _ in 0..fired {
            let Some(remaining) = self.state.time_remaining.as_mut() else {
                break;
            };
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                log::info!("Time up");
                tick::terminate(&mut self.state, &mut self.pending);
                break;
            }
        }
        self.flush();
    }

    pub fn move_actor(&mut self, dx: f32, dy: f32) -> bool {
        control::move_actor(&mut self.state, &self.config, Vec2::new(dx, dy))
    }

    pub fn set_position(&mut self, input: PositionInput) -> bool {
        control::set_position(&mut self.state, &self.config, &input)
    }

    pub fn handle_action(&mut self, action: Action) -> bool {
        let handled = match action {
            Action::Start => {
                self.start();
                true
            }
            Action::Stop => {
                let was_playing = self.state.is_playing();
                self.stop();
                was_playing
            }
            Action::Grab => control::grab_action(&mut self.state, &self.config, &mut self.pending),
        };
        self.flush();
        handled
    }

    /// Action by name (`grab`, `space`, `start`, `stop`, ...)
    pub fn handle_action_name(&mut self, name: &str) -> bool {
        match Action::from_name(name) {
            Some(action) => self.handle_action(action),
            None => {
                log::debug!("Unknown action {:?}", name);
                false
            }
        }
    }

    /// Apply one tick's worth of input, then advance the simulation
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        let autopilot;
        let input = if input.idle_mode {
            autopilot = tick::autopilot(&self.state, &self.config);
            &autopilot
        } else {
            input
        };

        if let Some(delta) = input.move_delta {
            self.move_actor(delta.x, delta.y);
        }
        if let Some(position) = &input.position {
            self.set_position(position.clone());
        }
        if let Some(action) = input.action {
            self.handle_action(action);
        }
        self.update(dt);
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Install or remove the feedback hook
    pub fn set_feedback(&mut self, hook: Option<Box<dyn FeedbackHook>>) {
        self.feedback = hook;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.config.control == ControlMode::Automated)
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut events = std::mem::take(&mut self.pending);
        for event in &events {
            self.bus.publish(event);
            if let (Some(hook), Some(cue)) = (self.feedback.as_mut(), Cue::for_event(event)) {
                hook.play(cue);
            }
        }
        events.clear();
        self.pending = events;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::claw::ClawStage;
    use crate::sim::state::{Entity, EntityKind, Grip};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded(game: &mut Game) -> Rc<RefCell<Vec<GameEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        game.subscribe(move |e| sink.borrow_mut().push(*e));
        log
    }

    fn place(game: &mut Game, kind: EntityKind, pos: Vec2, speed: f32) -> u32 {
        let id = game.state.next_entity_id();
        game.state.entities.push(Entity::new(id, kind, pos, speed));
        id
    }

    #[test]
    fn test_stopped_game_ignores_everything() {
        let mut game = Game::with_variant(Variant::FruitCatcher, 1);
        let before = game.snapshot();
        for _ in 0..120 {
            game.update(SIM_DT);
            game.advance_clock(1.0);
            game.move_actor(-1.0, 0.0);
            game.handle_action(Action::Grab);
        }
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_start_emits_started_and_resets() {
        let mut game = Game::with_variant(Variant::FruitCatcher, 2);
        let events = recorded(&mut game);
        game.start();
        for _ in 0..600 {
            game.update(SIM_DT);
        }
        assert!(!game.state().entities.is_empty());

        game.start();
        assert_eq!(game.score(), 0);
        assert_eq!(game.level(), 1);
        assert!(game.state().entities.is_empty());
        assert_eq!(game.state().time_remaining, Some(TIME_LIMIT));
        assert_eq!(game.state().actor.lane, Some(1));
        let starts = events
            .borrow()
            .iter()
            .filter(|e| **e == GameEvent::Started)
            .count();
        assert_eq!(starts, 2);
    }

    #[test]
    fn test_catch_scenario_through_facade() {
        let mut game = Game::with_variant(Variant::FruitCatcher, 3);
        let events = recorded(&mut game);
        game.start();
        assert!(game.set_position(PositionInput::Label("LEFT".into())));
        game.state.actor.pos.x = 40.0;
        place(&mut game, EntityKind::Banana, Vec2::new(33.0, 140.0), 2.0);

        for _ in 0..30 {
            game.update(SIM_DT);
        }

        assert_eq!(game.score(), 200);
        let changes: Vec<_> = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, GameEvent::ScoreChanged { .. }))
            .copied()
            .collect();
        assert_eq!(changes, vec![GameEvent::ScoreChanged { score: 200, level: 1 }]);
    }

    #[test]
    fn test_hazard_scenario_through_facade() {
        let mut game = Game::with_variant(Variant::FruitCatcher, 4);
        let events = recorded(&mut game);
        game.start();
        game.state.score = 700;
        game.state.level = 2;
        place(&mut game, EntityKind::Bomb, Vec2::new(100.0, 158.0), 1.0);

        game.update(SIM_DT);
        let frozen = game.snapshot();
        for _ in 0..60 {
            game.update(SIM_DT);
            game.advance_clock(1.0);
        }

        assert_eq!(game.phase(), GamePhase::Stopped);
        assert_eq!(game.snapshot(), frozen);
        let ended: Vec<_> = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, GameEvent::GameEnded { .. }))
            .copied()
            .collect();
        assert_eq!(ended, vec![GameEvent::GameEnded { score: 700, level: 2 }]);
    }

    #[test]
    fn test_countdown_ends_game_independent_of_ticks() {
        let mut game = Game::with_variant(Variant::RiceBowl, 5);
        let events = recorded(&mut game);
        game.start();
        for _ in 0..(TIME_LIMIT - 1) {
            game.advance_clock(1.0);
        }
        assert!(game.is_playing());
        assert_eq!(game.state().time_remaining, Some(1));

        game.advance_clock(0.5);
        assert!(game.is_playing());
        game.advance_clock(0.5);
        assert!(!game.is_playing());
        assert_eq!(game.state().time_remaining, Some(0));

        // A huge wall-clock jump still ends exactly once
        game.advance_clock(100.0);
        let ended = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, GameEvent::GameEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_stop_cancels_countdown() {
        let mut game = Game::with_variant(Variant::FruitCatcher, 6);
        game.start();
        game.advance_clock(0.9);
        game.stop();
        assert!(!game.state().countdown.is_armed());
        game.advance_clock(10.0);
        assert_eq!(game.state().time_remaining, Some(TIME_LIMIT));
    }

    #[test]
    fn test_huge_clock_jump_ends_game_once() {
        let mut game = Game::with_variant(Variant::FruitCatcher, 61);
        let events = recorded(&mut game);
        game.start();
        game.advance_clock(f32::INFINITY);
        game.advance_clock(f32::NAN);
        assert!(game.is_playing());
        assert_eq!(game.state().time_remaining, Some(TIME_LIMIT));

        game.advance_clock(1.0e8);
        assert!(!game.is_playing());
        assert_eq!(game.state().time_remaining, Some(0));
        let ended = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, GameEvent::GameEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }

    /// Assert a claw session looks freshly started
    fn assert_fresh_pile(game: &Game, old_ids: &[u32]) {
        let state = game.state();
        assert!(state.is_playing());
        assert_eq!(state.score, 0);
        assert_eq!(state.actor.held, None);
        assert_eq!(state.held_count(), 0);
        assert_eq!(state.claw.stage, ClawStage::Idle);
        assert_eq!(state.actor.grip, Grip::Open);
        assert_eq!(state.actor.pos, game.config().start_position());
        assert_eq!(state.entities.len(), PILE_SIZE);
        assert!(state.entities.iter().all(|e| !old_ids.contains(&e.id)));
    }

    #[test]
    fn test_restart_while_holding_drops_nothing_into_new_session() {
        let mut game = Game::with_variant(Variant::ManualClaw, 62);
        game.start();
        let doll = game.state.entities[0].pos;
        game.state.actor.pos = doll - Vec2::new(0.0, HELD_OFFSET);
        assert!(game.handle_action(Action::Grab));
        assert!(game.state().actor.held.is_some());
        assert_eq!(game.state().actor.grip, Grip::Closed);
        let old_ids: Vec<u32> = game.state().entities.iter().map(|e| e.id).collect();

        game.start();
        assert_fresh_pile(&game, &old_ids);
    }

    #[test]
    fn test_restart_mid_claw_cycle_resets_automation() {
        let mut game = Game::with_variant(Variant::ClawMachine, 63);
        game.start();
        let doll = game.state.entities[0].pos;
        game.set_position(PositionInput::Coordinate(doll.x));
        game.state.entities[0].pos.y = CLAW_FLOOR_Y + HELD_OFFSET;
        assert!(game.handle_action(Action::Grab));
        for _ in 0..10_000 {
            if game.state().claw.stage == ClawStage::Ascend {
                break;
            }
            game.update(SIM_DT);
        }
        assert_eq!(game.state().claw.stage, ClawStage::Ascend);
        assert!(game.state().actor.held.is_some());
        let old_ids: Vec<u32> = game.state().entities.iter().map(|e| e.id).collect();

        game.stop();
        game.start();
        assert_fresh_pile(&game, &old_ids);

        // The new session's claw runs a normal cycle from the top
        assert!(game.handle_action(Action::Grab));
        game.update(SIM_DT);
        assert_eq!(game.state().claw.stage, ClawStage::Descend);
    }

    #[test]
    fn test_debug_reports_subscribers() {
        let mut game = Game::with_variant(Variant::RiceBowl, 64);
        let id = game.subscribe(|_| {});
        assert!(format!("{:?}", game).contains("subscribers: 1"));
        game.unsubscribe(id);
        assert!(format!("{:?}", game).contains("subscribers: 0"));
    }

    #[test]
    fn test_untimed_variant_has_no_countdown() {
        let mut game = Game::with_variant(Variant::ClawMachine, 7);
        game.start();
        assert_eq!(game.state().time_remaining, None);
        assert!(!game.state().countdown.is_armed());
        game.advance_clock(1000.0);
        assert!(game.is_playing());
        assert_eq!(game.state().entities.len(), PILE_SIZE);
    }

    #[test]
    fn test_claw_cycle_through_facade_ignores_movement() {
        let mut game = Game::with_variant(Variant::ClawMachine, 8);
        game.start();
        let doll = game.state.entities[0].pos;
        game.set_position(PositionInput::Coordinate(doll.x));
        game.state.entities[0].pos.y = CLAW_FLOOR_Y + HELD_OFFSET;
        let id = game.state.entities[0].id;

        let events = recorded(&mut game);
        assert!(game.handle_action_name("space"));
        let mut trail = vec![game.snapshot().claw_stage.unwrap()];
        for _ in 0..10_000 {
            let before = game.state().actor.pos;
            let stage = game.state().claw.stage;
            let moved = game.move_actor(25.0, 25.0);
            if stage != ClawStage::Idle {
                assert!(!moved);
                assert_eq!(game.state().actor.pos, before);
            }
            game.update(SIM_DT);
            let stage = game.snapshot().claw_stage.unwrap();
            if trail.last() != Some(&stage) {
                trail.push(stage);
            }
            if stage == ClawStage::Idle {
                break;
            }
        }

        assert_eq!(trail.len(), 8);
        assert_eq!(game.score(), 100);
        assert!(game.state().entities.iter().all(|e| e.id != id));
        assert!(events.borrow().contains(&GameEvent::Grabbed {
            kind: EntityKind::Doll
        }));
    }

    #[test]
    fn test_feedback_hook_hears_cues() {
        let heard = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&heard);
        let mut game = Game::with_variant(Variant::FruitCatcher, 9);
        game.set_feedback(Some(Box::new(move |cue: Cue| sink.borrow_mut().push(cue))));
        game.start();
        place(&mut game, EntityKind::Apple, Vec2::new(100.0, 158.0), 1.0);
        game.update(SIM_DT);

        assert_eq!(*heard.borrow(), vec![Cue::Start, Cue::Collect]);
    }

    #[test]
    fn test_idle_mode_plays_by_itself() {
        let mut game = Game::with_variant(Variant::FruitCatcher, 10);
        game.start();
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..(60 * 20) {
            game.tick(&input, SIM_DT);
            if !game.is_playing() {
                break;
            }
        }
        assert!(game.score() > 0);
    }

    #[test]
    fn test_determinism() {
        // Two games with the same seed produce identical sessions
        let run = || {
            let mut game = Game::with_variant(Variant::RiceBowl, 99999);
            game.start();
            let input = TickInput {
                idle_mode: true,
                ..Default::default()
            };
            for _ in 0..600 {
                game.tick(&input, SIM_DT);
            }
            game.snapshot()
        };
        assert_eq!(run(), run());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Tick(f32),
        Clock(f32),
        Move(f32, f32),
        Grab,
        Label(usize),
        Start,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0.0f32..0.2).prop_map(Op::Tick),
            1 => (0.0f32..2.0).prop_map(Op::Clock),
            2 => (-30.0f32..30.0, -30.0f32..30.0).prop_map(|(x, y)| Op::Move(x, y)),
            1 => Just(Op::Grab),
            1 => (0usize..4).prop_map(Op::Label),
            1 => Just(Op::Start),
        ]
    }

    fn apply(game: &mut Game, op: &Op) {
        match op {
            Op::Tick(dt) => game.update(*dt),
            Op::Clock(dt) => game.advance_clock(*dt),
            Op::Move(dx, dy) => {
                game.move_actor(*dx, *dy);
            }
            Op::Grab => {
                game.handle_action(Action::Grab);
            }
            Op::Label(i) => {
                let label = ["LEFT", "CENTER", "RIGHT", "UP"][*i];
                game.set_position(PositionInput::Label(label.into()));
            }
            Op::Start => game.start(),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn session_invariants_hold(
            variant in prop::sample::select(Variant::ALL.to_vec()),
            seed in any::<u64>(),
            ops in prop::collection::vec(op(), 1..400),
        ) {
            let mut game = Game::with_variant(variant, seed);
            game.start();
            let config = game.config().clone();
            let mut last_score = 0;

            for op in &ops {
                apply(&mut game, op);
                let state = game.state();

                if matches!(op, Op::Start) {
                    // Nothing carries over from the previous session
                    prop_assert!(state.is_playing());
                    prop_assert_eq!(state.score, 0);
                    prop_assert_eq!(state.level, 1);
                    prop_assert_eq!(state.actor.held, None);
                    prop_assert_eq!(state.claw.stage, ClawStage::Idle);
                    prop_assert_eq!(state.time_remaining, config.time_limit);
                    last_score = 0;
                }
                prop_assert!(state.score >= last_score);
                last_score = state.score;
                prop_assert_eq!(state.level, crate::sim::level_for_score(state.score, config.level_step));
                prop_assert!(state.held_count() <= 1);
                prop_assert_eq!(state.held_count(), usize::from(state.actor.held.is_some()));

                let pos = state.actor.pos;
                prop_assert!(pos.x >= 0.0 && pos.x <= config.width);
                prop_assert!(pos.y >= 0.0 && pos.y <= config.height);
            }
        }

        #[test]
        fn removed_entities_never_return(
            seed in any::<u64>(),
            steps in 1usize..600,
        ) {
            let mut game = Game::with_variant(Variant::FruitCatcher, seed);
            game.start();
            let mut gone = std::collections::HashSet::new();
            let mut alive: std::collections::HashSet<u32> = std::collections::HashSet::new();

            for _ in 0..steps {
                game.update(SIM_DT * 4.0);
                let now: std::collections::HashSet<u32> =
                    game.state().entities.iter().map(|e| e.id).collect();
                for id in alive.difference(&now) {
                    gone.insert(*id);
                }
                prop_assert!(now.is_disjoint(&gone));
                alive = now;
            }
        }
    }
}
