//! Scoring and leveling policy
//!
//! Level is a pure function of score. Spawn pacing and fall speed are pure functions
//! of level, so nothing here depends on history.

use crate::settings::SpawnTuning;

/// `floor(score / step) + 1`
pub fn level_for_score(score: u64, step: u64) -> u32 {
    let level = score / step.max(1) + 1;
    u32::try_from(level).unwrap_or(u32::MAX)
}

/// Spawn interval for a level: the base interval at level 1, then
/// `base - step * level` floored at the minimum
pub fn spawn_interval_for_level(level: u32, tuning: &SpawnTuning) -> f32 {
    if level <= 1 {
        return tuning.base_interval;
    }
    (tuning.base_interval - tuning.interval_step * level as f32).max(tuning.min_interval)
}

/// Fall speed before the spawn table's per-row multiplier
pub fn fall_speed_for_level(level: u32, tuning: &SpawnTuning) -> f32 {
    tuning.base_speed + tuning.speed_per_level * level as f32
}
