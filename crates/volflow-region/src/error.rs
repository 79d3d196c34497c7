//! Error types for volflow-region

use thiserror::Error;

/// Errors that can occur during region processing operations
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] volflow_core::Error),

    /// Input volume has no in-memory voxel representation
    #[error("volume has no in-memory representation")]
    NoRepresentation,

    /// Seed position outside the grid
    #[error("invalid seed position: ({x}, {y}, {z})")]
    InvalidSeed { x: i32, y: i32, z: i32 },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Unsupported voxel format for this operation
    #[error("unsupported format: expected {expected}, got {actual}")]
    UnsupportedFormat {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
