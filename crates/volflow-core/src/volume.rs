//! Volume - voxel grid plus physical metadata
//!
//! A `Volume` describes a 3D dataset: its dimensions, voxel format and voxel
//! spacing. The voxels themselves are held by an optional in-memory
//! [`VoxelGrid`]. A volume whose data lives elsewhere (on disk, on the GPU)
//! has no RAM representation, and algorithms that need voxel access fail
//! with [`Error::NoRepresentation`].

use crate::error::{Error, Result};
use crate::grid::{VoxelFormat, VoxelGrid};
use glam::{UVec3, Vec3};

/// Volume container
///
/// Cloning a `Volume` is cheap: the RAM representation is shared.
///
/// # Examples
///
/// ```
/// use glam::{UVec3, Vec3};
/// use volflow_core::{Volume, VoxelFormat, VoxelGrid};
///
/// let grid = VoxelGrid::new(UVec3::splat(8), VoxelFormat::UInt8).unwrap();
/// let volume = Volume::from_grid(grid).with_spacing(Vec3::new(1.0, 1.0, 2.5)).unwrap();
/// assert!(volume.ram_representation().is_some());
/// assert_eq!(volume.spacing().z, 2.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    dims: UVec3,
    format: VoxelFormat,
    spacing: Vec3,
    ram: Option<VoxelGrid>,
}

impl Volume {
    /// Wrap a grid as a volume with unit spacing.
    pub fn from_grid(grid: VoxelGrid) -> Self {
        Volume {
            dims: grid.dimensions(),
            format: grid.format(),
            spacing: Vec3::ONE,
            ram: Some(grid),
        }
    }

    /// Describe a volume whose voxels are not held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if any dimension is 0.
    pub fn without_representation(dims: UVec3, format: VoxelFormat) -> Result<Self> {
        if dims.x == 0 || dims.y == 0 || dims.z == 0 {
            return Err(Error::InvalidDimension {
                x: dims.x,
                y: dims.y,
                z: dims.z,
            });
        }
        Ok(Volume {
            dims,
            format,
            spacing: Vec3::ONE,
            ram: None,
        })
    }

    /// Set the voxel spacing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless every component is finite
    /// and positive.
    pub fn with_spacing(mut self, spacing: Vec3) -> Result<Self> {
        if !spacing.is_finite() || spacing.min_element() <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "voxel spacing must be positive, got {spacing}"
            )));
        }
        self.spacing = spacing;
        Ok(self)
    }

    /// Get the volume dimensions.
    pub fn dimensions(&self) -> UVec3 {
        self.dims
    }

    /// Get the voxel format.
    pub fn format(&self) -> VoxelFormat {
        self.format
    }

    /// Get the voxel spacing.
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// Physical extent of the volume (`dims * spacing`).
    pub fn extent(&self) -> Vec3 {
        self.dims.as_vec3() * self.spacing
    }

    /// Borrow the in-memory voxel grid, if any.
    pub fn ram_representation(&self) -> Option<&VoxelGrid> {
        self.ram.as_ref()
    }

    /// Borrow the in-memory voxel grid or fail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRepresentation`] when the volume holds no grid.
    pub fn require_ram(&self) -> Result<&VoxelGrid> {
        self.ram.as_ref().ok_or(Error::NoRepresentation)
    }

    /// Drop the in-memory grid, keeping the metadata.
    pub fn take_ram_representation(&mut self) -> Option<VoxelGrid> {
        self.ram.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_representation() {
        let volume = Volume::without_representation(UVec3::new(4, 5, 6), VoxelFormat::UInt16)
            .unwrap();
        assert!(volume.ram_representation().is_none());
        assert!(matches!(volume.require_ram(), Err(Error::NoRepresentation)));
        assert_eq!(volume.dimensions(), UVec3::new(4, 5, 6));
    }

    #[test]
    fn test_spacing_validation() {
        let grid = VoxelGrid::new(UVec3::splat(2), VoxelFormat::UInt8).unwrap();
        let volume = Volume::from_grid(grid);
        assert!(volume.clone().with_spacing(Vec3::new(1.0, 0.0, 1.0)).is_err());
        assert!(volume.clone().with_spacing(Vec3::splat(f32::NAN)).is_err());
        let volume = volume.with_spacing(Vec3::new(0.5, 0.5, 2.0)).unwrap();
        assert_eq!(volume.extent(), Vec3::new(1.0, 1.0, 4.0));
    }

    #[test]
    fn test_take_ram_representation() {
        let grid = VoxelGrid::new(UVec3::splat(2), VoxelFormat::UInt8).unwrap();
        let mut volume = Volume::from_grid(grid);
        assert!(volume.take_ram_representation().is_some());
        assert!(volume.require_ram().is_err());
        assert_eq!(volume.format(), VoxelFormat::UInt8);
    }
}
