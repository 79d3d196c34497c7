//! volflow - Volume processing dataflow network
//!
//! Processors with typed ports are wired into a [`network::ProcessorNetwork`]
//! that rejects illegal connections, propagates invalidation downstream
//! and evaluates processors upstream first. The bundled processors load
//! volumes and segment them with seeded region growing.
//!
//! # Overview
//!
//! - core types, re-exported at the crate root: voxel grids, volumes,
//!   running statistics and synthetic phantoms
//! - [`region`]: seeded region growing
//! - [`network`]: processors, ports, connections, invalidation, saved
//!   network descriptions
//! - [`modules`]: the volume source and region growing processors
//!
//! # Example
//!
//! ```
//! use volflow::glam::{IVec3, UVec3, Vec3};
//! use volflow::region::{RegionGrowOptions, grow_region};
//! use volflow::{PhantomBuilder, Volume, VoxelFormat};
//!
//! let grid = PhantomBuilder::new(UVec3::splat(16), VoxelFormat::UInt8)
//!     .with_background(0.1)
//!     .with_sphere(Vec3::splat(8.0), 4.0, 0.9)
//!     .build()
//!     .unwrap();
//! let segmentation = grow_region(
//!     &Volume::from_grid(grid),
//!     IVec3::splat(8),
//!     &RegionGrowOptions::default().with_thresholds(0.5, 1.0),
//! )
//! .unwrap();
//! assert!(segmentation.count_nonzero() > 0);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use volflow_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use volflow_modules as modules;
pub use volflow_network as network;
pub use volflow_region as region;
