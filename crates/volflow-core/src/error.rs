//! Error types for volflow-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use thiserror::Error;

/// volflow-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid grid dimensions
    #[error("invalid grid dimensions: {x}x{y}x{z}")]
    InvalidDimension { x: u32, y: u32, z: u32 },

    /// Voxel position outside the grid
    #[error("voxel position ({x}, {y}, {z}) outside grid")]
    PositionOutOfBounds { x: i32, y: i32, z: i32 },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Grid dimension mismatch
    #[error("dimension mismatch: expected {}x{}x{}, got {}x{}x{}", .expected.0, .expected.1, .expected.2, .actual.0, .actual.1, .actual.2)]
    DimensionMismatch {
        expected: (u32, u32, u32),
        actual: (u32, u32, u32),
    },

    /// Voxel format not supported by this operation
    #[error("unsupported voxel format: {0}")]
    UnsupportedFormat(String),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Statistics accessor called before any sample was added
    #[error("statistics hold no samples")]
    EmptyStatistics,

    /// Quantile requested from statistics that do not keep their samples
    #[error("statistics were created without sample collection")]
    SamplesNotCollected,

    /// Volume has no in-memory voxel representation
    #[error("volume has no in-memory representation")]
    NoRepresentation,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized grid decode error
    #[error("decode error: {0}")]
    DecodeError(String),
}

/// Result type alias for volflow-core operations
pub type Result<T> = std::result::Result<T, Error>;
