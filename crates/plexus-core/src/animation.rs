use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::clock::FrameClock;
use crate::config::PlexusConfig;
use crate::error::ConfigError;
use crate::grid::SpatialGrid;
use crate::math::{WORLD_MAX, WORLD_MIN};
use crate::particle::{ParticleSet, ParticleState};
use crate::proximity::{Edge, ProximityGraphBuilder};
use crate::stats::{OccupancyMonitor, StepStats};

/// What the renderer needs to draw one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleView {
    pub id: u32,
    pub position: Vec2,
    pub size: f32,
}

/// An edge with its endpoints resolved to positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Vec2,
    pub to: Vec2,
    pub strength: f32,
}

/// GPU-compatible particle vertex: 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 2],
    pub size: f32,
    pub _pad: f32,
}

/// GPU-compatible line vertex: 16 bytes, two per edge.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    /// Edge strength, used as opacity.
    pub alpha: f32,
    pub _pad: f32,
}

fn in_world(p: Vec2) -> bool {
    let range = WORLD_MIN..=WORLD_MAX;
    range.contains(&p.x) && range.contains(&p.y)
}

/// Owns the particle population, its grid and the current edge list.
///
/// Between two calls to [`update`](Self::update) or [`step`](Self::step)
/// every view is consistent: each particle sits in exactly the cell the grid
/// holds it in, and the edges were computed from the current positions.
pub struct AnimationState {
    config: PlexusConfig,
    particles: ParticleSet,
    grid: SpatialGrid,
    builder: ProximityGraphBuilder,
    clock: FrameClock,
    monitor: OccupancyMonitor,
    stats: StepStats,
    frame: u64,
}

impl AnimationState {
    /// Validate `config` and create a randomized population from `rng`.
    pub fn new<R: Rng>(config: PlexusConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let particles = ParticleSet::random(
            config.particle_count,
            config.size_range,
            config.speed_range,
            rng,
        );
        Self::assemble(config, particles)
    }

    pub fn with_seed(config: PlexusConfig, seed: u64) -> Result<Self, ConfigError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::new(config, &mut rng)
    }

    /// Start from explicit particle states. `states.len()` must equal
    /// `config.particle_count` and every position must lie in `[-1, 1]²`.
    pub fn from_particles(
        config: PlexusConfig,
        states: &[ParticleState],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if states.len() != config.particle_count {
            return Err(ConfigError::ParticleCount {
                expected: config.particle_count,
                actual: states.len(),
            });
        }
        if let Some((index, s)) = states
            .iter()
            .enumerate()
            .find(|(_, s)| !in_world(s.position))
        {
            return Err(ConfigError::PositionOutOfBounds {
                index,
                x: s.position.x,
                y: s.position.y,
            });
        }
        Self::assemble(config, ParticleSet::from_states(states))
    }

    fn assemble(config: PlexusConfig, mut particles: ParticleSet) -> Result<Self, ConfigError> {
        let mut grid = config.build_grid()?;
        grid.rebuild(&particles.position, &mut particles.cell);

        info!(
            particles = particles.count,
            radius = config.connection_radius,
            grid_side = grid.side(),
            metric = ?config.metric,
            "animation state created"
        );

        let mut state = Self {
            builder: ProximityGraphBuilder::new(config.connection_radius, config.metric),
            clock: FrameClock::new(config.frame_rate, config.max_frame_dt),
            monitor: OccupancyMonitor::new(config.occupancy_warn),
            stats: StepStats::default(),
            frame: 0,
            config,
            particles,
            grid,
        };
        state.refresh_edges(0.0, 0);
        Ok(state)
    }

    /// Replace the configuration, re-randomizing the population.
    ///
    /// On error the current state is left untouched.
    pub fn reconfigure<R: Rng>(
        &mut self,
        config: PlexusConfig,
        rng: &mut R,
    ) -> Result<(), ConfigError> {
        *self = Self::new(config, rng)?;
        Ok(())
    }

    /// Re-randomize the population with the current configuration.
    pub fn reinitialize<R: Rng>(&mut self, rng: &mut R) {
        self.particles = ParticleSet::random(
            self.config.particle_count,
            self.config.size_range,
            self.config.speed_range,
            rng,
        );
        self.grid
            .rebuild(&self.particles.position, &mut self.particles.cell);
        self.clock.reset();
        self.monitor.reset();
        self.frame = 0;
        self.refresh_edges(0.0, 0);
        debug!(particles = self.particles.count, "population reinitialized");
    }

    /// Advance the simulation if a frame is due at `now` (monotonic seconds).
    ///
    /// Returns `true` when particles moved and the edge list was rebuilt.
    pub fn update(&mut self, now: f64) -> bool {
        match self.clock.tick(now) {
            Some(dt) => {
                self.step(dt);
                true
            }
            None => false,
        }
    }

    /// Simulate one frame of `dt` seconds, bypassing the frame clock.
    pub fn step(&mut self, dt: f32) {
        let boundary = self.config.boundary;
        let mut relocations = 0;
        for i in 0..self.particles.count {
            self.particles.update_particle(i, dt, boundary);
            let pos = self.particles.position[i];
            if self
                .grid
                .relocate(i as u32, pos, &mut self.particles.cell[i])
            {
                relocations += 1;
            }
        }
        self.frame += 1;
        self.refresh_edges(dt, relocations);
    }

    fn refresh_edges(&mut self, dt: f32, relocations: u64) {
        self.builder.build(&self.grid, &self.particles.position);
        self.monitor.update(&self.grid);
        self.stats = StepStats {
            dt,
            particle_count: self.particles.count as u64,
            edge_count: self.builder.edges().len() as u64,
            pairs_tested: self.builder.pairs_tested() as u64,
            relocations,
            max_occupancy: self.grid.max_occupancy() as u64,
        };
    }

    pub fn config(&self) -> &PlexusConfig {
        &self.config
    }

    pub fn particle_set(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Number of frames simulated since creation or the last reinitialize.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_stats(&self) -> StepStats {
        self.stats
    }

    /// Smoothed mean occupancy of non-empty grid cells.
    pub fn occupancy(&self) -> f32 {
        self.monitor.average()
    }

    pub fn particles(&self) -> impl ExactSizeIterator<Item = ParticleView> + '_ {
        let p = &self.particles;
        (0..p.count).map(move |i| ParticleView {
            id: i as u32,
            position: p.position[i],
            size: p.size[i],
        })
    }

    pub fn edges(&self) -> &[Edge] {
        self.builder.edges()
    }

    pub fn segments(&self) -> impl ExactSizeIterator<Item = Segment> + '_ {
        let positions = &self.particles.position;
        self.builder.edges().iter().map(move |e| Segment {
            from: positions[e.a as usize],
            to: positions[e.b as usize],
            strength: e.strength,
        })
    }

    /// Refill `out` with one vertex per particle.
    pub fn write_particle_vertices(&self, out: &mut Vec<ParticleVertex>) {
        out.clear();
        out.extend(self.particles().map(|p| ParticleVertex {
            position: p.position.to_array(),
            size: p.size,
            _pad: 0.0,
        }));
    }

    /// Refill `out` with two vertices per edge (line list).
    pub fn write_line_vertices(&self, out: &mut Vec<LineVertex>) {
        out.clear();
        out.reserve(self.edges().len() * 2);
        for s in self.segments() {
            for end in [s.from, s.to] {
                out.push(LineVertex {
                    position: end.to_array(),
                    alpha: s.strength,
                    _pad: 0.0,
                });
            }
        }
    }
}
