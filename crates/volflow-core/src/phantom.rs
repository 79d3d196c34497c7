//! Synthetic test volumes
//!
//! [`PhantomBuilder`] composes simple shapes (axis-aligned boxes and
//! spheres) over a constant background and optionally perturbs every voxel
//! with reproducible uniform noise. Values are given normalized to `[0, 1]`
//! and scaled to the grid's format.
//!
//! # Examples
//!
//! ```
//! use glam::{IVec3, UVec3};
//! use volflow_core::{PhantomBuilder, VoxelFormat};
//!
//! let grid = PhantomBuilder::new(UVec3::splat(10), VoxelFormat::Float32)
//!     .with_background(0.1)
//!     .with_box(IVec3::splat(3), IVec3::splat(6), 0.8)
//!     .build()
//!     .unwrap();
//! assert_eq!(grid.voxel_normalized(IVec3::splat(4)), Some(0.8));
//! assert_eq!(grid.voxel_normalized(IVec3::ZERO), Some(0.1));
//! ```

use crate::error::{Error, Result};
use crate::grid::{VoxelFormat, VoxelGrid};
use glam::{IVec3, UVec3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    /// Inclusive corner positions
    Box { min: IVec3, max: IVec3, value: f32 },
    Sphere { center: Vec3, radius: f32, value: f32 },
}

impl Shape {
    fn value_at(&self, pos: IVec3) -> Option<f32> {
        match *self {
            Shape::Box { min, max, value } => {
                (pos.cmpge(min).all() && pos.cmple(max).all()).then_some(value)
            }
            Shape::Sphere {
                center,
                radius,
                value,
            } => (pos.as_vec3().distance(center) <= radius).then_some(value),
        }
    }
}

/// Builder for synthetic phantom grids
#[derive(Debug, Clone)]
pub struct PhantomBuilder {
    dims: UVec3,
    format: VoxelFormat,
    background: f32,
    shapes: Vec<Shape>,
    noise: Option<(f32, u64)>,
}

impl PhantomBuilder {
    /// Start a phantom of the given size and format with a zero background.
    pub fn new(dims: UVec3, format: VoxelFormat) -> Self {
        PhantomBuilder {
            dims,
            format,
            background: 0.0,
            shapes: Vec::new(),
            noise: None,
        }
    }

    /// Set the background value.
    pub fn with_background(mut self, value: f32) -> Self {
        self.background = value;
        self
    }

    /// Add a box with inclusive corners. Later shapes paint over earlier ones.
    pub fn with_box(mut self, min: IVec3, max: IVec3, value: f32) -> Self {
        self.shapes.push(Shape::Box { min, max, value });
        self
    }

    /// Add a ball of voxels whose centers lie within `radius` of `center`.
    pub fn with_sphere(mut self, center: Vec3, radius: f32, value: f32) -> Self {
        self.shapes.push(Shape::Sphere {
            center,
            radius,
            value,
        });
        self
    }

    /// Add uniform noise in `[-amplitude, amplitude]` to every voxel.
    ///
    /// The same `seed` always yields the same grid.
    pub fn with_noise(mut self, amplitude: f32, seed: u64) -> Self {
        self.noise = Some((amplitude, seed));
        self
    }

    /// Build the grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] for an empty size and
    /// [`Error::InvalidParameter`] for a negative or non-finite noise
    /// amplitude.
    pub fn build(&self) -> Result<VoxelGrid> {
        let mut rng = match self.noise {
            Some((amplitude, _)) if !amplitude.is_finite() || amplitude < 0.0 => {
                return Err(Error::InvalidParameter(format!(
                    "noise amplitude must be non-negative, got {amplitude}"
                )));
            }
            Some((amplitude, seed)) if amplitude > 0.0 => {
                Some((amplitude, StdRng::seed_from_u64(seed)))
            }
            _ => None,
        };

        let scale = match self.format {
            VoxelFormat::Float32 => 1.0,
            format => format.max_value(),
        };

        VoxelGrid::from_fn(self.dims, self.format, |pos| {
            let mut value = self
                .shapes
                .iter()
                .rev()
                .find_map(|shape| shape.value_at(pos))
                .unwrap_or(self.background);
            if let Some((amplitude, rng)) = rng.as_mut() {
                value += rng.random_range(-*amplitude..=*amplitude);
            }
            match self.format {
                VoxelFormat::Float32 => value,
                _ => value.clamp(0.0, 1.0) * scale,
            }
        })
    }
}
