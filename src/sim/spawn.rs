//! Entity spawning
//!
//! Falling variants spawn one entity each time the spawn timer runs past the current
//! interval; pile variants are seeded in one go on start and on batch clear. The
//! spawner only ever appends to the entity list.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::level::fall_speed_for_level;
use super::state::{Entity, EntityKind, GameState};
use crate::settings::{GameConfig, Placement};

/// One row of the level-indexed kind distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRow {
    /// Row applies from this level up (until a higher row takes over)
    pub min_level: u32,
    /// Checked in order against a uniform roll in `[0, 1)`
    pub weights: Vec<(EntityKind, f32)>,
    /// Kind for the remaining probability mass
    pub fallback: EntityKind,
    pub speed_multiplier: f32,
}

impl SpawnRow {
    /// Row that always yields `kind`
    pub fn only(min_level: u32, kind: EntityKind) -> Self {
        Self {
            min_level,
            weights: Vec::new(),
            fallback: kind,
            speed_multiplier: 1.0,
        }
    }

    pub fn total_weight(&self) -> f32 {
        self.weights.iter().map(|(_, w)| w).sum()
    }

    /// Pick a kind for a roll in `[0, 1)`
    pub fn pick(&self, roll: f32) -> EntityKind {
        let mut cumulative = 0.0;
        for &(kind, weight) in &self.weights {
            cumulative += weight;
            if roll < cumulative {
                return kind;
            }
        }
        self.fallback
    }

    /// True if this row can ever produce `kind`
    #[cfg(test)]
    pub fn can_produce(&self, kind: EntityKind) -> bool {
        let weighted = self.weights.iter().any(|&(k, w)| k == kind && w > 0.0);
        weighted || (self.fallback == kind && self.total_weight() < 1.0)
    }
}

/// Level -> kind distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnTable {
    pub rows: Vec<SpawnRow>,
}

impl SpawnTable {
    pub fn new(mut rows: Vec<SpawnRow>) -> Self {
        rows.sort_by_key(|r| r.min_level);
        Self { rows }
    }

    /// Apples only at level 1, bombs and bananas from level 2, more bombs and faster
    /// falls from level 3
    pub fn fruit() -> Self {
        Self::new(vec![
            SpawnRow::only(1, EntityKind::Apple),
            SpawnRow {
                min_level: 2,
                weights: vec![(EntityKind::Bomb, 0.2), (EntityKind::Banana, 0.3)],
                fallback: EntityKind::Apple,
                speed_multiplier: 1.0,
            },
            SpawnRow {
                min_level: 3,
                weights: vec![(EntityKind::Bomb, 0.4), (EntityKind::Banana, 0.3)],
                fallback: EntityKind::Apple,
                speed_multiplier: 1.2,
            },
        ])
    }

    /// Rice bowl: clocks take the banana's slot as a time bonus
    pub fn rice() -> Self {
        Self::new(vec![
            SpawnRow::only(1, EntityKind::Rice),
            SpawnRow {
                min_level: 2,
                weights: vec![(EntityKind::Bomb, 0.2), (EntityKind::Clock, 0.3)],
                fallback: EntityKind::Rice,
                speed_multiplier: 1.0,
            },
            SpawnRow {
                min_level: 3,
                weights: vec![(EntityKind::Bomb, 0.4), (EntityKind::Clock, 0.3)],
                fallback: EntityKind::Rice,
                speed_multiplier: 1.2,
            },
        ])
    }

    /// Highest row whose `min_level` is at or below `level` (first row below that)
    pub fn row_for_level(&self, level: u32) -> Option<&SpawnRow> {
        self.rows
            .iter()
            .rev()
            .find(|r| r.min_level <= level)
            .or_else(|| self.rows.first())
    }
}

/// Spawn one falling entity above the top edge. Pile placements spawn nothing here.
pub fn spawn_falling(state: &mut GameState, config: &GameConfig) -> Option<u32> {
    let x = match &config.placement {
        Placement::Lanes { centers } => {
            if centers.is_empty() {
                return None;
            }
            centers[state.rng.random_range(0..centers.len())]
        }
        Placement::Uniform { margin } => {
            let lo = margin.min(config.width / 2.0);
            let hi = (config.width - margin).max(lo);
            if hi > lo { state.rng.random_range(lo..=hi) } else { lo }
        }
        Placement::Pile { .. } => return None,
    };

    let row = config.spawn.table.row_for_level(state.level)?;
    let roll: f32 = state.rng.random();
    let kind = row.pick(roll);
    let speed = fall_speed_for_level(state.level, &config.spawn) * row.speed_multiplier;

    let id = state.next_entity_id();
    state
        .entities
        .push(Entity::new(id, kind, Vec2::new(x, config.spawn.spawn_y), speed));
    Some(id)
}

/// Random resting spot inside the pile
pub fn resting_spot(state: &mut GameState, area: &Rect) -> Vec2 {
    area.random_point(&mut state.rng)
}

/// Replace the pile with a fresh batch of collectibles
pub fn refill_pile(state: &mut GameState, config: &GameConfig) {
    let (Placement::Pile { area }, Some(claw)) = (&config.placement, &config.claw) else {
        return;
    };
    state.entities.retain(|e| e.held);
    for _ in 0..claw.pile_size {
        let pos = resting_spot(state, area);
        let id = state.next_entity_id();
        state.entities.push(Entity::new(id, claw.pile_kind, pos, 0.0));
    }
    log::info!("Pile refilled with {} {}s", claw.pile_size, claw.pile_kind.as_str());
}
