//! volflow Core - Basic data structures for volume processing
//!
//! This crate provides the fundamental data structures used throughout
//! volflow:
//!
//! - [`VoxelGrid`] / [`VoxelGridMut`] - Dense 3D voxel arrays (immutable / mutable)
//! - [`Volume`] - Spacing and format metadata around an optional voxel grid
//! - [`VoxelStatistics`] - Running mean / variance accumulator
//! - [`PhantomBuilder`] - Synthetic test volumes
//!
//! Positions use [`glam::IVec3`], dimensions [`glam::UVec3`] and spacing
//! [`glam::Vec3`]; `glam` is re-exported for convenience.

pub mod error;
pub mod grid;
pub mod phantom;
pub mod stats;
pub mod volume;

pub use error::{Error, Result};
pub use glam;
pub use grid::{VoxelFormat, VoxelGrid, VoxelGridMut};
pub use phantom::PhantomBuilder;
pub use stats::VoxelStatistics;
pub use volume::Volume;
