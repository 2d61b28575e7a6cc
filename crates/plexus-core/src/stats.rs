use tracing::warn;

use crate::grid::SpatialGrid;

/// Counters from a single simulated frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepStats {
    /// Seconds simulated by this frame.
    pub dt: f32,
    /// Number of particles.
    pub particle_count: u64,
    /// Number of edges emitted.
    pub edge_count: u64,
    /// Candidate pairs whose distance was computed.
    pub pairs_tested: u64,
    /// Particles that changed cell this frame.
    pub relocations: u64,
    /// Largest number of particles in a single cell.
    pub max_occupancy: u64,
}

/// Watches how crowded grid cells get.
///
/// Neighbor search stays cheap only while cells hold a handful of particles.
/// The monitor keeps an exponential moving average of the mean occupancy of
/// non-empty cells and logs one warning when it crosses the threshold. It
/// re-arms once the average falls back under 60% of the threshold.
#[derive(Clone, Debug)]
pub struct OccupancyMonitor {
    /// Zero or negative disables the warning.
    pub threshold: f32,
    ema: f32,
    warned: bool,
}

impl OccupancyMonitor {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            ema: 0.0,
            warned: false,
        }
    }

    /// Smoothed mean occupancy.
    pub fn average(&self) -> f32 {
        self.ema
    }

    /// Feed the grid after a frame. Returns `true` when a warning was emitted.
    pub fn update(&mut self, grid: &SpatialGrid) -> bool {
        let occupied = grid.occupied_cells();
        let mean = if occupied == 0 {
            0.0
        } else {
            grid.len() as f32 / occupied as f32
        };
        self.observe(mean, grid.side())
    }

    fn observe(&mut self, mean: f32, side: u32) -> bool {
        // EMA with alpha=0.3
        self.ema = self.ema * 0.7 + mean * 0.3;

        if self.threshold <= 0.0 {
            return false;
        }
        if !self.warned && self.ema > self.threshold {
            self.warned = true;
            warn!(
                average = self.ema,
                threshold = self.threshold,
                grid_side = side,
                "grid cells are crowded; lower the particle count or the connection radius"
            );
            return true;
        }
        if self.warned && self.ema < self.threshold * 0.6 {
            self.warned = false;
        }
        false
    }

    pub fn reset(&mut self) {
        self.ema = 0.0;
        self.warned = false;
    }
}
