//! Hit tests between entities and the actor
//!
//! Two geometries cover every variant: lane-based catching (zone match plus a thin
//! band around the basket line) and a plain Euclidean hit radius. Grab-style variants
//! have no fall collisions at all and only use [`nearest_within`].

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Actor, Entity};

/// Axis-aligned rectangle in playfield units (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True if the rectangle is non-empty and lies inside a `width` x `height` playfield
    pub fn fits_within(&self, width: f32, height: f32) -> bool {
        self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.x >= 0.0
            && self.min.y >= 0.0
            && self.max.x <= width
            && self.max.y <= height
    }

    /// Uniform random point inside the rectangle
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            uniform(rng, self.min.x, self.max.x),
            uniform(rng, self.min.y, self.max.y),
        )
    }
}

/// `random_range` panics on an empty range, degenerate rects collapse to a line
fn uniform<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

/// How a falling entity is caught by the actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HitGeometry {
    /// Zone match plus `|y - catch_y| < band`. `bounds` are the x split points between lanes.
    Lane {
        bounds: Vec<f32>,
        catch_y: f32,
        band: f32,
    },
    /// Euclidean distance strictly below `radius`
    Radius { radius: f32 },
}

impl HitGeometry {
    /// Check whether `entity` is caught by `actor` this tick
    pub fn hits(&self, entity: &Entity, actor: &Actor) -> bool {
        match self {
            HitGeometry::Lane {
                bounds,
                catch_y,
                band,
            } => {
                let Some(actor_lane) = actor.lane else {
                    return false;
                };
                lane_for_x(entity.pos.x, bounds) == actor_lane
                    && in_catch_band(entity.pos.y, *catch_y, *band)
            }
            HitGeometry::Radius { radius } => within_radius(entity.pos, actor.pos, *radius),
        }
    }
}

/// Map an x coordinate to a lane index given ascending split points
pub fn lane_for_x(x: f32, bounds: &[f32]) -> usize {
    bounds.iter().take_while(|&&b| x >= b).count()
}

/// Open band around the catch line (edges don't count)
#[inline]
pub fn in_catch_band(y: f32, catch_y: f32, band: f32) -> bool {
    y > catch_y - band && y < catch_y + band
}

#[inline]
pub fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// Index of the nearest non-held entity strictly within `range` of `point`
///
/// Equidistant candidates resolve to the first one in collection order.
pub fn nearest_within(entities: &[Entity], point: Vec2, range: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, entity) in entities.iter().enumerate() {
        if entity.held {
            continue;
        }
        let dist = entity.pos.distance(point);
        if dist >= range {
            continue;
        }
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}
