//! volflow-modules - Volume processors for the volflow network
//!
//! - [`VolumeSource`] - Publishes an in-memory or file-backed volume
//! - [`RegionGrowProcessor`] - Seeded region growing into a persistent
//!   8-bit segmentation
//!
//! [`register_builtins`] adds both to a [`ProcessorRegistry`] so that saved
//! networks can be rebuilt.
//!
//! # Examples
//!
//! ```
//! use glam::{IVec3, UVec3};
//! use volflow_core::{PhantomBuilder, Volume, VoxelFormat};
//! use volflow_modules::{RegionGrowProcessor, VolumeSource};
//! use volflow_network::ProcessorNetwork;
//! use volflow_region::{CostFunction, RegionGrowOptions};
//!
//! let grid = PhantomBuilder::new(UVec3::splat(12), VoxelFormat::UInt8)
//!     .with_box(IVec3::splat(4), IVec3::splat(7), 1.0)
//!     .build()
//!     .unwrap();
//! let options = RegionGrowOptions::default()
//!     .with_cost_function(CostFunction::ThresholdOnly)
//!     .with_thresholds(0.5, 1.0);
//!
//! let mut network = ProcessorNetwork::new();
//! let source = network
//!     .add_processor(Box::new(VolumeSource::with_volume(Volume::from_grid(grid))), "source")
//!     .unwrap();
//! let grow = network
//!     .add_processor(Box::new(RegionGrowProcessor::with_seed(IVec3::splat(5), options)), "grow")
//!     .unwrap();
//! let out = network.port_ref(source, VolumeSource::OUTPORT).unwrap();
//! let inp = network.port_ref(grow, RegionGrowProcessor::INPORT).unwrap();
//! assert!(network.connect(out, inp));
//! network.process().unwrap();
//!
//! let body = network.body::<RegionGrowProcessor>(grow).unwrap();
//! assert_eq!(body.segmentation().unwrap().count_nonzero(), 64);
//! ```

mod properties;
pub mod regiongrow;
pub mod source;

pub use regiongrow::RegionGrowProcessor;
pub use source::VolumeSource;

use volflow_network::ProcessorRegistry;

/// Register every processor of this crate.
pub fn register_builtins(registry: &mut ProcessorRegistry) {
    registry.register_default::<VolumeSource>();
    registry.register_default::<RegionGrowProcessor>();
}

/// Registry holding every processor of this crate
pub fn builtin_registry() -> ProcessorRegistry {
    let mut registry = ProcessorRegistry::new();
    register_builtins(&mut registry);
    registry
}
