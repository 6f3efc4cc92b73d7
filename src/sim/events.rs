//! Game events and the subscriber list
//!
//! The simulation pushes events into a buffer while it runs; [`Game`](super::Game)
//! flushes that buffer to every subscriber once the tick has finished, so listeners
//! never observe a half-updated state.

use serde::{Deserialize, Serialize};

use super::state::EntityKind;

/// Semantic events emitted by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    /// One per scoring mutation
    ScoreChanged { score: u64, level: u32 },
    LevelUp { level: u32 },
    /// An entity was caught by the actor
    Collected { kind: EntityKind },
    TimeExtended { remaining: u32 },
    /// Claw picked something up
    Grabbed { kind: EntityKind },
    /// Claw dropped something in the destination zone
    Delivered { kind: EntityKind },
    /// Claw dropped something outside the destination zone
    Returned { kind: EntityKind },
    /// Last doll delivered, pile re-seeded
    BatchCleared,
    /// One per termination
    GameEnded { score: u64, level: u32 },
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GameEvent)>;

/// Observer list
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver to every listener in subscription order
    pub fn publish(&mut self, event: &GameEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}
