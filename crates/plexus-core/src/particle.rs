use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::CellCoord;
use crate::math::{WORLD_MAX, WORLD_MIN, WORLD_WIDTH};

/// What happens to a particle that leaves the world square.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Teleport to the opposite edge and negate the *other* coordinate.
    ///
    /// Gives the diagonal-bounce look of the overlay. Some trajectories make a
    /// particle stall near a corner; this is the long-standing behavior and is
    /// kept as the default.
    #[default]
    FlipWrap,
    /// Plain wraparound on each axis.
    Wrap,
}

impl BoundaryPolicy {
    /// Bring a position that left the world back inside it.
    ///
    /// The x axis is resolved before the y axis. Positions already inside the
    /// world are returned unchanged.
    pub fn apply(self, mut p: Vec2) -> Vec2 {
        match self {
            BoundaryPolicy::FlipWrap => {
                if p.x < WORLD_MIN {
                    p.x = WORLD_MAX;
                    p.y = -p.y;
                } else if p.x > WORLD_MAX {
                    p.x = WORLD_MIN;
                    p.y = -p.y;
                }
                if p.y < WORLD_MIN {
                    p.y = WORLD_MAX;
                    p.x = -p.x;
                } else if p.y > WORLD_MAX {
                    p.y = WORLD_MIN;
                    p.x = -p.x;
                }
            }
            BoundaryPolicy::Wrap => {
                p.x = wrap_axis(p.x);
                p.y = wrap_axis(p.y);
            }
        }
        p
    }
}

#[inline]
fn wrap_axis(c: f32) -> f32 {
    if (WORLD_MIN..=WORLD_MAX).contains(&c) {
        c
    } else {
        (c - WORLD_MIN).rem_euclid(WORLD_WIDTH) + WORLD_MIN
    }
}

/// Initial kinematic state of one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleState {
    pub position: Vec2,
    /// Unit heading. Not normalized on insertion.
    pub direction: Vec2,
    pub speed: f32,
    pub size: f32,
}

impl ParticleState {
    pub fn new(position: Vec2, direction: Vec2, speed: f32, size: f32) -> Self {
        Self {
            position,
            direction,
            speed,
            size,
        }
    }

    /// A particle that never moves.
    pub fn stationary(position: Vec2) -> Self {
        Self::new(position, Vec2::ZERO, 0.0, 0.01)
    }
}

/// SoA particle storage.
///
/// The index of a particle in these arrays is its identity for the whole
/// lifetime of the set; the grid and the edge list refer to particles by it.
pub struct ParticleSet {
    pub count: usize,
    pub position: Vec<Vec2>,
    pub direction: Vec<Vec2>,
    pub speed: Vec<f32>,
    pub size: Vec<f32>,
    /// Cell currently holding the particle. Maintained by the grid.
    pub cell: Vec<CellCoord>,
}

impl ParticleSet {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            position: vec![Vec2::ZERO; count],
            direction: vec![Vec2::X; count],
            speed: vec![0.0; count],
            size: vec![0.01; count],
            cell: vec![CellCoord::default(); count],
        }
    }

    /// Create `count` particles with uniformly random position, heading,
    /// size and speed.
    pub fn random<R: Rng>(
        count: usize,
        size_range: (f32, f32),
        speed_range: (f32, f32),
        rng: &mut R,
    ) -> Self {
        let mut set = Self::new(count);
        for i in 0..count {
            let x = rng.gen_range(WORLD_MIN..WORLD_MAX);
            let y = rng.gen_range(WORLD_MIN..WORLD_MAX);
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            set.position[i] = Vec2::new(x, y);
            set.direction[i] = Vec2::from_angle(angle);
            set.size[i] = sample_range(rng, size_range);
            set.speed[i] = sample_range(rng, speed_range);
        }
        set
    }

    pub fn from_states(states: &[ParticleState]) -> Self {
        let mut set = Self::new(states.len());
        for (i, s) in states.iter().enumerate() {
            set.position[i] = s.position;
            set.direction[i] = s.direction;
            set.speed[i] = s.speed;
            set.size[i] = s.size;
        }
        set
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn state(&self, i: usize) -> ParticleState {
        ParticleState::new(self.position[i], self.direction[i], self.speed[i], self.size[i])
    }

    /// Integrate one particle over `dt` seconds and apply the boundary policy.
    #[inline]
    pub fn update_particle(&mut self, i: usize, dt: f32, boundary: BoundaryPolicy) {
        let moved = self.position[i] + self.direction[i] * self.speed[i] * dt;
        self.position[i] = boundary.apply(moved);
    }

    /// Integrate every particle. Does not touch cached cells; use
    /// [`AnimationState`](crate::animation::AnimationState) when a grid is attached.
    pub fn update(&mut self, dt: f32, boundary: BoundaryPolicy) {
        for i in 0..self.count {
            self.update_particle(i, dt, boundary);
        }
    }
}

fn sample_range<R: Rng>(rng: &mut R, (min, max): (f32, f32)) -> f32 {
    if min < max {
        rng.gen_range(min..max)
    } else {
        min
    }
}
