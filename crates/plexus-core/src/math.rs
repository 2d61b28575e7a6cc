use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Lower bound of the world square on both axes.
pub const WORLD_MIN: f32 = -1.0;
/// Upper bound of the world square on both axes.
pub const WORLD_MAX: f32 = 1.0;
/// Side length of the world square.
pub const WORLD_WIDTH: f32 = WORLD_MAX - WORLD_MIN;

/// How the distance between two particles is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Straight-line distance in the world plane.
    #[default]
    Euclidean,
    /// Minimum-image distance: the world wraps on both axes, so particles
    /// near opposite edges can be close across the seam.
    Toroidal,
}

impl DistanceMetric {
    #[inline]
    pub fn distance_sq(self, a: Vec2, b: Vec2) -> f32 {
        match self {
            DistanceMetric::Euclidean => a.distance_squared(b),
            DistanceMetric::Toroidal => {
                let dx = wrap_delta(b.x - a.x, WORLD_WIDTH);
                let dy = wrap_delta(b.y - a.y, WORLD_WIDTH);
                dx * dx + dy * dy
            }
        }
    }
}

/// Shortest signed offset along an axis that wraps every `width` units.
#[inline]
pub fn wrap_delta(d: f32, width: f32) -> f32 {
    let half = width * 0.5;
    if d > half {
        d - width
    } else if d < -half {
        d + width
    } else {
        d
    }
}

/// Linear fade: 1 at zero distance, 0 at the connection radius.
#[inline]
pub fn strength(dist_sq: f32, radius_sq: f32) -> f32 {
    1.0 - dist_sq / radius_sq
}
