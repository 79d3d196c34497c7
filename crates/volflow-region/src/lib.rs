//! volflow-region - Region growing segmentation for volflow
//!
//! This crate provides seeded 3D region growing:
//!
//! - **Neighborhoods** - 6, 18 and 26-connected voxel adjacency
//! - **Gradient magnitude** - Central differences with spacing
//! - **Region growing** - Cost-driven flood fill with adaptive statistics
//!
//! # Examples
//!
//! ```
//! use glam::{IVec3, UVec3, Vec3};
//! use volflow_core::{PhantomBuilder, Volume, VoxelFormat};
//! use volflow_region::{CostFunction, Neighborhood, RegionGrowOptions, grow_region};
//!
//! let grid = PhantomBuilder::new(UVec3::splat(16), VoxelFormat::UInt8)
//!     .with_background(0.1)
//!     .with_sphere(Vec3::splat(8.0), 4.0, 0.9)
//!     .build()
//!     .unwrap();
//! let volume = Volume::from_grid(grid);
//!
//! let options = RegionGrowOptions::default()
//!     .with_cost_function(CostFunction::ThresholdOnly)
//!     .with_thresholds(0.5, 1.0)
//!     .with_neighborhood(Neighborhood::C6);
//! let segmentation = grow_region(&volume, IVec3::splat(8), &options).unwrap();
//! assert!(segmentation.count_nonzero() > 0);
//! ```

pub mod error;
pub mod gradient;
pub mod neighborhood;
pub mod regiongrow;

pub use error::{RegionError, RegionResult};
pub use gradient::{gradient_magnitude, sample_clamped};
pub use neighborhood::{Neighborhood, full_offsets};
pub use regiongrow::{CostFunction, RegionGrowOptions, grow_region, grow_region_into};
