use thiserror::Error;

/// Errors raised while building a [`SpatialGrid`](crate::grid::SpatialGrid).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f32),
    #[error("world width must be a positive finite number, got {0}")]
    InvalidWorldWidth(f32),
    #[error("grid side {side} exceeds the limit of {max} cells per axis")]
    TooManyCells { side: u64, max: u32 },
}

/// Configuration values that cannot drive the engine.
///
/// All of these are checked once at construction; the per-frame API never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("connection radius must be a positive finite number, got {0}")]
    InvalidRadius(f32),
    #[error("invalid {name} range [{min}, {max}]")]
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },
    #[error("frame rate must be a positive finite number, got {0}")]
    InvalidFrameRate(f32),
    #[error("max frame dt must be a positive finite number, got {0}")]
    InvalidMaxFrameDt(f32),
    #[error("expected {expected} particles, got {actual}")]
    ParticleCount { expected: usize, actual: usize },
    #[error("particle {index} at ({x}, {y}) lies outside the world square")]
    PositionOutOfBounds { index: usize, x: f32, y: f32 },
    #[error(transparent)]
    Grid(#[from] GridError),
}
