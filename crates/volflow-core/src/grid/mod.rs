//! VoxelGrid - The in-memory voxel container
//!
//! A `VoxelGrid` is a dense 3D array of scalar samples. It is the RAM
//! representation of a [`Volume`](crate::Volume) and the type every
//! algorithm in volflow reads voxels from.
//!
//! # Voxel layout
//!
//! - Voxels are stored linearly with x varying fastest
//! - The voxel at `(x, y, z)` is at index `x + y * dx + z * dx * dy`
//! - Positions are signed (`IVec3`) so neighbor arithmetic may step
//!   outside the grid; every checked accessor returns `None` there
//!
//! # Ownership model
//!
//! `VoxelGrid` uses `Arc` for cheap cloning (shared ownership), which lets a
//! grid travel through several ports without copying. To modify voxel data,
//! convert to `VoxelGridMut` via [`VoxelGrid::try_into_mut`] or
//! [`VoxelGrid::to_mut`], then convert back with `Into<VoxelGrid>`.
//!
//! # Examples
//!
//! ```
//! use glam::{IVec3, UVec3};
//! use volflow_core::{VoxelFormat, VoxelGrid};
//!
//! let grid = VoxelGrid::new(UVec3::new(4, 4, 4), VoxelFormat::UInt8).unwrap();
//! let mut grid = grid.try_into_mut().unwrap();
//! grid.set_voxel(IVec3::new(1, 2, 3), 255.0).unwrap();
//!
//! let grid: VoxelGrid = grid.into();
//! assert_eq!(grid.voxel_normalized(IVec3::new(1, 2, 3)), Some(1.0));
//! assert_eq!(grid.voxel_normalized(IVec3::new(-1, 0, 0)), None);
//! ```

pub mod serial;

use crate::error::{Error, Result};
use glam::{IVec3, UVec3};
use std::sync::Arc;

/// Storage type of a single voxel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VoxelFormat {
    /// 8-bit unsigned, normalized by 255
    #[default]
    UInt8,
    /// 16-bit unsigned, normalized by 65535
    UInt16,
    /// 32-bit float, already normalized
    Float32,
}

impl VoxelFormat {
    /// Number of bytes used to store one voxel.
    pub fn bytes_per_voxel(self) -> usize {
        match self {
            VoxelFormat::UInt8 => 1,
            VoxelFormat::UInt16 => 2,
            VoxelFormat::Float32 => 4,
        }
    }

    /// Largest raw value representable in this format.
    pub fn max_value(self) -> f32 {
        match self {
            VoxelFormat::UInt8 => u8::MAX as f32,
            VoxelFormat::UInt16 => u16::MAX as f32,
            VoxelFormat::Float32 => f32::MAX,
        }
    }

    /// Short lowercase name used in serialized headers.
    pub fn name(self) -> &'static str {
        match self {
            VoxelFormat::UInt8 => "uint8",
            VoxelFormat::UInt16 => "uint16",
            VoxelFormat::Float32 => "float",
        }
    }

    /// Parse a format from its [`name`](Self::name).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for unknown names.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "uint8" => Ok(VoxelFormat::UInt8),
            "uint16" => Ok(VoxelFormat::UInt16),
            "float" => Ok(VoxelFormat::Float32),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum VoxelData {
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    Float32(Vec<f32>),
}

impl VoxelData {
    fn zeroed(format: VoxelFormat, len: usize) -> Self {
        match format {
            VoxelFormat::UInt8 => VoxelData::UInt8(vec![0; len]),
            VoxelFormat::UInt16 => VoxelData::UInt16(vec![0; len]),
            VoxelFormat::Float32 => VoxelData::Float32(vec![0.0; len]),
        }
    }

    fn format(&self) -> VoxelFormat {
        match self {
            VoxelData::UInt8(_) => VoxelFormat::UInt8,
            VoxelData::UInt16(_) => VoxelFormat::UInt16,
            VoxelData::Float32(_) => VoxelFormat::Float32,
        }
    }

    fn len(&self) -> usize {
        match self {
            VoxelData::UInt8(v) => v.len(),
            VoxelData::UInt16(v) => v.len(),
            VoxelData::Float32(v) => v.len(),
        }
    }

    #[inline]
    fn raw(&self, index: usize) -> f32 {
        match self {
            VoxelData::UInt8(v) => v[index] as f32,
            VoxelData::UInt16(v) => v[index] as f32,
            VoxelData::Float32(v) => v[index],
        }
    }

    #[inline]
    fn normalized(&self, index: usize) -> f32 {
        match self {
            VoxelData::UInt8(v) => v[index] as f32 / u8::MAX as f32,
            VoxelData::UInt16(v) => v[index] as f32 / u16::MAX as f32,
            VoxelData::Float32(v) => v[index],
        }
    }

    #[inline]
    fn set_raw(&mut self, index: usize, value: f32) {
        match self {
            VoxelData::UInt8(v) => v[index] = value.round().clamp(0.0, u8::MAX as f32) as u8,
            VoxelData::UInt16(v) => v[index] = value.round().clamp(0.0, u16::MAX as f32) as u16,
            VoxelData::Float32(v) => v[index] = value,
        }
    }
}

/// Internal voxel storage shared by [`VoxelGrid`] and [`VoxelGridMut`]
#[derive(Debug, Clone, PartialEq)]
struct GridData {
    dims: UVec3,
    data: VoxelData,
}

impl GridData {
    fn new(dims: UVec3, data: VoxelData) -> Result<Self> {
        check_dims(dims)?;
        let expected = voxel_count(dims);
        if data.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{}x{} = {}",
                data.len(),
                dims.x,
                dims.y,
                dims.z,
                expected
            )));
        }
        Ok(GridData { dims, data })
    }

    #[inline]
    fn contains(&self, pos: IVec3) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && (pos.x as u32) < self.dims.x
            && (pos.y as u32) < self.dims.y
            && (pos.z as u32) < self.dims.z
    }

    #[inline]
    fn index_unchecked(&self, pos: IVec3) -> usize {
        let (dx, dy) = (self.dims.x as usize, self.dims.y as usize);
        pos.x as usize + pos.y as usize * dx + pos.z as usize * dx * dy
    }

    #[inline]
    fn index(&self, pos: IVec3) -> Option<usize> {
        self.contains(pos).then(|| self.index_unchecked(pos))
    }

    fn position(&self, index: usize) -> IVec3 {
        let (dx, dy) = (self.dims.x as usize, self.dims.y as usize);
        IVec3::new(
            (index % dx) as i32,
            ((index / dx) % dy) as i32,
            (index / (dx * dy)) as i32,
        )
    }

    fn checked_index(&self, pos: IVec3) -> Result<usize> {
        self.index(pos).ok_or(Error::PositionOutOfBounds {
            x: pos.x,
            y: pos.y,
            z: pos.z,
        })
    }
}

fn check_dims(dims: UVec3) -> Result<()> {
    if dims.x == 0 || dims.y == 0 || dims.z == 0 {
        return Err(Error::InvalidDimension {
            x: dims.x,
            y: dims.y,
            z: dims.z,
        });
    }
    Ok(())
}

fn voxel_count(dims: UVec3) -> usize {
    dims.x as usize * dims.y as usize * dims.z as usize
}

/// Immutable, shareable voxel grid
///
/// # Examples
///
/// ```
/// use glam::UVec3;
/// use volflow_core::{VoxelFormat, VoxelGrid};
///
/// let grid = VoxelGrid::new(UVec3::new(64, 32, 16), VoxelFormat::UInt16).unwrap();
/// assert_eq!(grid.num_voxels(), 64 * 32 * 16);
/// assert_eq!(grid.bytes_per_voxel(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    inner: Arc<GridData>,
}

impl VoxelGrid {
    /// Create a new grid with all voxels set to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if any dimension is 0.
    pub fn new(dims: UVec3, format: VoxelFormat) -> Result<Self> {
        check_dims(dims)?;
        let data = VoxelData::zeroed(format, voxel_count(dims));
        Ok(Self::from_inner(GridData { dims, data }))
    }

    /// Create an 8-bit grid from raw data.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or the data length
    /// doesn't match.
    pub fn from_u8(dims: UVec3, data: Vec<u8>) -> Result<Self> {
        GridData::new(dims, VoxelData::UInt8(data)).map(Self::from_inner)
    }

    /// Create a 16-bit grid from raw data.
    pub fn from_u16(dims: UVec3, data: Vec<u16>) -> Result<Self> {
        GridData::new(dims, VoxelData::UInt16(data)).map(Self::from_inner)
    }

    /// Create a float grid from raw data.
    pub fn from_f32(dims: UVec3, data: Vec<f32>) -> Result<Self> {
        GridData::new(dims, VoxelData::Float32(data)).map(Self::from_inner)
    }

    /// Create a grid by evaluating `f` at every voxel position.
    ///
    /// The returned value is stored as a raw voxel value (rounded and
    /// clamped for integer formats).
    pub fn from_fn(dims: UVec3, format: VoxelFormat, mut f: impl FnMut(IVec3) -> f32) -> Result<Self> {
        let mut grid = Self::new(dims, format)?.to_mut();
        for index in 0..grid.num_voxels() {
            let pos = grid.inner.position(index);
            grid.inner.data.set_raw(index, f(pos));
        }
        Ok(grid.into())
    }

    fn from_inner(inner: GridData) -> Self {
        VoxelGrid {
            inner: Arc::new(inner),
        }
    }

    /// Get the grid dimensions.
    #[inline]
    pub fn dimensions(&self) -> UVec3 {
        self.inner.dims
    }

    /// Get the voxel storage format.
    #[inline]
    pub fn format(&self) -> VoxelFormat {
        self.inner.data.format()
    }

    /// Get the number of bytes per voxel.
    #[inline]
    pub fn bytes_per_voxel(&self) -> usize {
        self.format().bytes_per_voxel()
    }

    /// Total number of voxels.
    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.inner.data.len()
    }

    /// Check whether `pos` lies inside the grid.
    #[inline]
    pub fn contains(&self, pos: IVec3) -> bool {
        self.inner.contains(pos)
    }

    /// Linear index of `pos`, or `None` outside the grid.
    #[inline]
    pub fn linear_index(&self, pos: IVec3) -> Option<usize> {
        self.inner.index(pos)
    }

    /// Position of a linear index.
    pub fn position(&self, index: usize) -> IVec3 {
        self.inner.position(index)
    }

    /// Get the raw voxel value at `pos`.
    ///
    /// Returns `None` if `pos` is outside the grid.
    pub fn voxel(&self, pos: IVec3) -> Option<f32> {
        self.inner.index(pos).map(|i| self.inner.data.raw(i))
    }

    /// Get the voxel value at `pos` mapped to `[0, 1]`.
    ///
    /// Integer formats are divided by their maximum value; float grids are
    /// returned unchanged. Returns `None` if `pos` is outside the grid.
    pub fn voxel_normalized(&self, pos: IVec3) -> Option<f32> {
        self.inner.index(pos).map(|i| self.inner.data.normalized(i))
    }

    /// Get the normalized voxel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if the computed index is outside the voxel buffer.
    #[inline]
    pub fn voxel_normalized_unchecked(&self, pos: IVec3) -> f32 {
        self.inner.data.normalized(self.inner.index_unchecked(pos))
    }

    /// Get the normalized value at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_voxels()`.
    #[inline]
    pub fn voxel_normalized_at(&self, index: usize) -> f32 {
        self.inner.data.normalized(index)
    }

    /// Borrow the voxels of an 8-bit grid.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.inner.data {
            VoxelData::UInt8(v) => Some(v),
            _ => None,
        }
    }

    /// Number of voxels whose raw value is not zero.
    pub fn count_nonzero(&self) -> usize {
        (0..self.num_voxels())
            .filter(|&i| self.inner.data.raw(i) != 0.0)
            .count()
    }

    /// Check whether two grids have the same dimensions.
    pub fn sizes_equal(&self, other: &VoxelGrid) -> bool {
        self.inner.dims == other.inner.dims
    }

    /// Number of handles sharing this grid's voxel data.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Create a deep copy of this grid.
    ///
    /// Unlike `clone()` which shares data via Arc, this creates
    /// a completely independent copy.
    pub fn deep_clone(&self) -> Self {
        Self::from_inner((*self.inner).clone())
    }

    /// Try to get mutable access to the voxel data.
    ///
    /// Succeeds only if there is exactly one reference to the data.
    pub fn try_into_mut(self) -> std::result::Result<VoxelGridMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(inner) => Ok(VoxelGridMut { inner }),
            Err(inner) => Err(VoxelGrid { inner }),
        }
    }

    /// Create a mutable copy of this grid.
    pub fn to_mut(&self) -> VoxelGridMut {
        VoxelGridMut {
            inner: (*self.inner).clone(),
        }
    }
}

impl PartialEq for VoxelGrid {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

/// Mutable voxel grid
///
/// Allows modification of voxel data. Convert back to an immutable
/// [`VoxelGrid`] using `Into<VoxelGrid>`.
#[derive(Debug)]
pub struct VoxelGridMut {
    inner: GridData,
}

impl VoxelGridMut {
    /// Get the grid dimensions.
    #[inline]
    pub fn dimensions(&self) -> UVec3 {
        self.inner.dims
    }

    /// Get the voxel storage format.
    #[inline]
    pub fn format(&self) -> VoxelFormat {
        self.inner.data.format()
    }

    /// Total number of voxels.
    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.inner.data.len()
    }

    /// Check whether `pos` lies inside the grid.
    #[inline]
    pub fn contains(&self, pos: IVec3) -> bool {
        self.inner.contains(pos)
    }

    /// Get the raw voxel value at `pos`.
    pub fn voxel(&self, pos: IVec3) -> Option<f32> {
        self.inner.index(pos).map(|i| self.inner.data.raw(i))
    }

    /// Get the raw value at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_voxels()`.
    #[inline]
    pub fn voxel_at(&self, index: usize) -> f32 {
        self.inner.data.raw(index)
    }

    /// Get the voxel value at `pos` mapped to `[0, 1]`.
    pub fn voxel_normalized(&self, pos: IVec3) -> Option<f32> {
        self.inner.index(pos).map(|i| self.inner.data.normalized(i))
    }

    /// Set a raw voxel value.
    ///
    /// Integer formats round and clamp the value to their range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if `pos` is outside the grid.
    pub fn set_voxel(&mut self, pos: IVec3, value: f32) -> Result<()> {
        let index = self.inner.checked_index(pos)?;
        self.inner.data.set_raw(index, value);
        Ok(())
    }

    /// Set a voxel from a value in `[0, 1]`, scaled to the format's range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if `pos` is outside the grid.
    pub fn set_voxel_normalized(&mut self, pos: IVec3, value: f32) -> Result<()> {
        let index = self.inner.checked_index(pos)?;
        let raw = match self.format() {
            VoxelFormat::Float32 => value,
            format => value.clamp(0.0, 1.0) * format.max_value(),
        };
        self.inner.data.set_raw(index, raw);
        Ok(())
    }

    /// Set a raw value at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_voxels()`.
    #[inline]
    pub fn set_voxel_at(&mut self, index: usize, value: f32) {
        self.inner.data.set_raw(index, value);
    }
}

impl From<VoxelGridMut> for VoxelGrid {
    fn from(grid: VoxelGridMut) -> Self {
        VoxelGrid::from_inner(grid.inner)
    }
}
