//! Gradient magnitude by central differences

use glam::{IVec3, Vec3};
use volflow_core::VoxelGrid;

/// Normalized voxel value with the position clamped into the grid.
pub fn sample_clamped(grid: &VoxelGrid, pos: IVec3) -> f32 {
    let max = grid.dimensions().as_ivec3() - IVec3::ONE;
    grid.voxel_normalized_unchecked(pos.clamp(IVec3::ZERO, max))
}

/// Gradient magnitude at `pos` in physical units.
///
/// Each axis uses the central difference `v(p + e) - v(p - e)`; a neighbor
/// outside the grid is replaced by the center value, which turns that axis
/// into a one-sided difference. The difference vector is divided by
/// `2 * spacing` component-wise before taking its length.
///
/// # Examples
///
/// ```
/// use glam::{IVec3, UVec3, Vec3};
/// use volflow_core::{VoxelFormat, VoxelGrid};
/// use volflow_region::gradient_magnitude;
///
/// // Linear ramp along x: v = x / 10
/// let grid = VoxelGrid::from_fn(UVec3::splat(5), VoxelFormat::Float32, |p| p.x as f32 / 10.0)
///     .unwrap();
/// let g = gradient_magnitude(&grid, IVec3::splat(2), Vec3::ONE);
/// assert!((g - 0.1).abs() < 1e-6);
/// ```
pub fn gradient_magnitude(grid: &VoxelGrid, pos: IVec3, spacing: Vec3) -> f32 {
    let center = sample_clamped(grid, pos);
    let sample = |p: IVec3| grid.voxel_normalized(p).unwrap_or(center);

    let diff = Vec3::new(
        sample(pos + IVec3::X) - sample(pos - IVec3::X),
        sample(pos + IVec3::Y) - sample(pos - IVec3::Y),
        sample(pos + IVec3::Z) - sample(pos - IVec3::Z),
    );
    (diff / (2.0 * spacing)).length()
}
