//! Particle-proximity animation engine.
//!
//! A fixed population of particles drifts over the world square `[-1, 1]²`.
//! Every simulated frame the engine relocates each particle inside a uniform
//! grid sized to the connection radius and enumerates every pair closer than
//! that radius exactly once, producing a list of faded edges for a renderer.

pub mod animation;
pub mod clock;
pub mod config;
pub mod error;
pub mod grid;
pub mod math;
pub mod particle;
pub mod proximity;
pub mod stats;

pub use animation::{AnimationState, LineVertex, ParticleVertex, ParticleView, Segment};
pub use config::PlexusConfig;
pub use error::{ConfigError, GridError};
pub use grid::{CellCoord, SpatialGrid};
pub use math::DistanceMetric;
pub use particle::{BoundaryPolicy, ParticleSet, ParticleState};
pub use proximity::{brute_force_edges, Edge, ProximityGraphBuilder};
