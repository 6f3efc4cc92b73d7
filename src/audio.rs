//! Feedback cues for sound/haptics layers
//!
//! The simulation never makes noise itself. It maps events to [`Cue`]s and hands them
//! to an optional [`FeedbackHook`]; with no hook installed nothing happens.

use crate::sim::{GameEvent, KindRole};

/// Semantic feedback cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Session started
    Start,
    /// Fruit caught
    Collect,
    /// Time bonus caught
    Bonus,
    /// Bomb caught
    Hazard,
    /// Claw closed on something
    Grab,
    /// Doll dropped in the chute
    Deliver,
    /// Doll dropped back on the pile
    Miss,
    /// Pile emptied and refilled
    BatchClear,
    LevelUp,
    GameOver,
}

impl Cue {
    /// Cue for an event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Cue> {
        match event {
            GameEvent::Started => Some(Cue::Start),
            GameEvent::Collected { kind } => match kind.role() {
                KindRole::Fruit { .. } => Some(Cue::Collect),
                KindRole::Bonus { .. } => Some(Cue::Bonus),
                KindRole::Hazard => Some(Cue::Hazard),
                KindRole::Collectible { .. } => None,
            },
            GameEvent::Grabbed { .. } => Some(Cue::Grab),
            GameEvent::Delivered { .. } => Some(Cue::Deliver),
            GameEvent::Returned { .. } => Some(Cue::Miss),
            GameEvent::BatchCleared => Some(Cue::BatchClear),
            GameEvent::LevelUp { .. } => Some(Cue::LevelUp),
            GameEvent::GameEnded { .. } => Some(Cue::GameOver),
            GameEvent::ScoreChanged { .. } | GameEvent::TimeExtended { .. } => None,
        }
    }
}

/// Presentation-layer receiver for cues
pub trait FeedbackHook {
    fn play(&mut self, cue: Cue);
}

impl<F: FnMut(Cue)> FeedbackHook for F {
    fn play(&mut self, cue: Cue) {
        self(cue)
    }
}

/// Hook that writes cues to the log
#[derive(Debug, Default)]
pub struct LogFeedback;

impl FeedbackHook for LogFeedback {
    fn play(&mut self, cue: Cue) {
        log::debug!("cue: {:?}", cue);
    }
}
