use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GridError};
use crate::grid::SpatialGrid;
use crate::math::{DistanceMetric, WORLD_MIN, WORLD_WIDTH};
use crate::particle::BoundaryPolicy;

/// Settings bundle supplied by the host when the engine is created.
///
/// Missing fields fall back to [`Default`] when deserialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlexusConfig {
    pub particle_count: usize,
    /// `(min, max)` visual size, world units.
    pub size_range: (f32, f32),
    /// `(min, max)` speed, world units per second.
    pub speed_range: (f32, f32),
    /// Particles closer than this are connected.
    pub connection_radius: f32,
    /// Simulation frames per second, independent of the host tick rate.
    pub frame_rate: f32,
    /// Gaps longer than this (seconds) are simulated as one nominal frame.
    pub max_frame_dt: f32,
    pub boundary: BoundaryPolicy,
    pub metric: DistanceMetric,
    /// Smoothed mean occupancy of non-empty cells above which a warning is
    /// logged. Zero disables the check.
    pub occupancy_warn: f32,
}

impl Default for PlexusConfig {
    fn default() -> Self {
        Self {
            particle_count: 120,
            size_range: (0.004, 0.012),
            speed_range: (0.02, 0.08),
            connection_radius: 0.2,
            frame_rate: 30.0,
            max_frame_dt: 0.25,
            boundary: BoundaryPolicy::FlipWrap,
            metric: DistanceMetric::Euclidean,
            occupancy_warn: 8.0,
        }
    }
}

impl PlexusConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = self.connection_radius;
        if !(r.is_finite() && r > 0.0) {
            return Err(ConfigError::InvalidRadius(r));
        }
        check_range("size", self.size_range)?;
        check_range("speed", self.speed_range)?;
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(ConfigError::InvalidFrameRate(self.frame_rate));
        }
        if !(self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0) {
            return Err(ConfigError::InvalidMaxFrameDt(self.max_frame_dt));
        }
        Ok(())
    }

    /// Grid matching the connection radius and distance metric.
    ///
    /// Euclidean grids use cells of exactly the radius. Toroidal grids need
    /// cells that tile the world evenly so the wrap seam does not produce a
    /// narrow column, so they use `floor(width / radius)` cells per axis,
    /// each at least one radius wide.
    pub fn build_grid(&self) -> Result<SpatialGrid, GridError> {
        let r = self.connection_radius;
        match self.metric {
            DistanceMetric::Euclidean => SpatialGrid::new(WORLD_MIN, WORLD_WIDTH, r),
            DistanceMetric::Toroidal => {
                if !(r.is_finite() && r > 0.0) {
                    return Err(GridError::InvalidCellSize(r));
                }
                let mut side = (WORLD_WIDTH / r).floor().clamp(1.0, u32::MAX as f32) as u32;
                // Rounding in `WORLD_WIDTH / r` can overshoot by one cell.
                while side > 1 && WORLD_WIDTH / (side as f32) < r {
                    side -= 1;
                }
                SpatialGrid::with_side(WORLD_MIN, WORLD_WIDTH, side)
            }
        }
    }
}

fn check_range(name: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min >= 0.0 && min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { name, min, max })
    }
}
