//! Seeded region growing
//!
//! Starting from a seed voxel, the region expands through a [`Neighborhood`]
//! as long as each candidate voxel is "close enough" to the seed. Closeness
//! is a cost normalized by the spread of values around the seed:
//!
//! - [`CostFunction::Intensity`]: `|v - v_seed| / (strictness * sd)`
//! - [`CostFunction::GradientMagnitude`]: `|g - g_seed| / (strictness * gsd)`
//! - [`CostFunction::Weighted`]: both, mixed by `p = gsd / (sd + gsd)` as
//!   `ci * p + cg * (1 - p)`
//! - [`CostFunction::ThresholdOnly`]: no cost gating
//!
//! A voxel is accepted while its cost stays below 1. `sd` and `gsd` are the
//! population standard deviations of intensity and gradient magnitude over
//! the 26 voxels around the seed. In adaptive mode every visited voxel is
//! added to these statistics, so the acceptance band follows the region as
//! it grows.
//!
//! Voxels closer than two voxels to any grid border are never visited.

use crate::error::{RegionError, RegionResult};
use crate::gradient::{gradient_magnitude, sample_clamped};
use crate::neighborhood::{Neighborhood, full_offsets};
use glam::{IVec3, Vec3};
use tracing::debug;
use volflow_core::{Volume, VoxelFormat, VoxelGrid, VoxelGridMut, VoxelStatistics};

/// Width of the border band that region growing never enters
const BORDER_MARGIN: i32 = 2;

/// Cost function used to accept or reject a candidate voxel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CostFunction {
    /// Intensity difference to the seed
    #[default]
    Intensity,
    /// Gradient magnitude difference to the seed
    GradientMagnitude,
    /// Intensity and gradient costs weighted by their spreads
    Weighted,
    /// Accept every voxel; only thresholds and seed distance bound the fill
    ThresholdOnly,
}

impl CostFunction {
    /// Whether this cost function needs gradient magnitudes.
    pub fn uses_gradient(self) -> bool {
        matches!(self, CostFunction::GradientMagnitude | CostFunction::Weighted)
    }

    /// Short name ("intensity", "gradient", "weighted", "threshold").
    pub fn name(self) -> &'static str {
        match self {
            CostFunction::Intensity => "intensity",
            CostFunction::GradientMagnitude => "gradient",
            CostFunction::Weighted => "weighted",
            CostFunction::ThresholdOnly => "threshold",
        }
    }

    /// Parse a name produced by [`CostFunction::name`].
    pub fn from_name(name: &str) -> RegionResult<Self> {
        match name {
            "intensity" => Ok(CostFunction::Intensity),
            "gradient" => Ok(CostFunction::GradientMagnitude),
            "weighted" => Ok(CostFunction::Weighted),
            "threshold" => Ok(CostFunction::ThresholdOnly),
            _ => Err(RegionError::InvalidParameters(format!(
                "unknown cost function: {name}"
            ))),
        }
    }
}

/// Options for region growing
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGrowOptions {
    /// Label written into the segmentation (0 erases)
    pub segment_id: u8,
    /// Lower normalized intensity bound, used when `use_thresholds` is set
    pub lower_threshold: f32,
    /// Upper normalized intensity bound, used when `use_thresholds` is set
    pub upper_threshold: f32,
    /// Scale of the acceptance band; larger values grow larger regions
    pub strictness: f32,
    /// Cost function
    pub cost_function: CostFunction,
    /// Reject voxels outside `[lower_threshold, upper_threshold]`
    pub use_thresholds: bool,
    /// Update the seed statistics with every visited voxel
    pub adaptive: bool,
    /// Maximum Euclidean distance from the seed in voxels (0 = unlimited)
    pub max_seed_distance: f32,
    /// Neighbor connectivity
    pub neighborhood: Neighborhood,
}

impl Default for RegionGrowOptions {
    fn default() -> Self {
        Self {
            segment_id: 1,
            lower_threshold: 0.0,
            upper_threshold: 1.0,
            strictness: 1.0,
            cost_function: CostFunction::Intensity,
            use_thresholds: false,
            adaptive: false,
            max_seed_distance: 0.0,
            neighborhood: Neighborhood::C26,
        }
    }
}

impl RegionGrowOptions {
    /// Set the segment id
    pub fn with_segment_id(mut self, id: u8) -> Self {
        self.segment_id = id;
        self
    }

    /// Enable thresholds with the given normalized bounds
    pub fn with_thresholds(mut self, lower: f32, upper: f32) -> Self {
        self.lower_threshold = lower;
        self.upper_threshold = upper;
        self.use_thresholds = true;
        self
    }

    /// Set the strictness
    pub fn with_strictness(mut self, strictness: f32) -> Self {
        self.strictness = strictness;
        self
    }

    /// Set the cost function
    pub fn with_cost_function(mut self, cost_function: CostFunction) -> Self {
        self.cost_function = cost_function;
        self
    }

    /// Enable or disable adaptive statistics
    pub fn with_adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Set the maximum seed distance in voxels
    pub fn with_max_seed_distance(mut self, distance: f32) -> Self {
        self.max_seed_distance = distance;
        self
    }

    /// Set the neighborhood
    pub fn with_neighborhood(mut self, neighborhood: Neighborhood) -> Self {
        self.neighborhood = neighborhood;
        self
    }

    /// Check the options for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::InvalidParameters`] for a negative or
    /// non-finite strictness or seed distance, and for inverted thresholds
    /// when thresholds are enabled.
    pub fn validate(&self) -> RegionResult<()> {
        if !self.strictness.is_finite() || self.strictness < 0.0 {
            return Err(RegionError::InvalidParameters(format!(
                "strictness must be non-negative, got {}",
                self.strictness
            )));
        }
        if !self.max_seed_distance.is_finite() || self.max_seed_distance < 0.0 {
            return Err(RegionError::InvalidParameters(format!(
                "max seed distance must be non-negative, got {}",
                self.max_seed_distance
            )));
        }
        if self.use_thresholds && self.lower_threshold > self.upper_threshold {
            return Err(RegionError::InvalidParameters(format!(
                "lower threshold {} exceeds upper threshold {}",
                self.lower_threshold, self.upper_threshold
            )));
        }
        Ok(())
    }
}

/// Statistics around the seed that drive the cost functions
struct SeedModel {
    value: f32,
    gradient: f32,
    intensity: VoxelStatistics,
    gradients: VoxelStatistics,
}

impl SeedModel {
    fn new(grid: &VoxelGrid, seed: IVec3, spacing: Vec3, with_gradient: bool) -> Self {
        let mut intensity = VoxelStatistics::new(false);
        let mut gradients = VoxelStatistics::new(false);
        for offset in full_offsets() {
            intensity.add_sample(sample_clamped(grid, seed + offset));
            if with_gradient {
                gradients.add_sample(gradient_magnitude(grid, seed + offset, spacing));
            }
        }
        let gradient = if with_gradient {
            gradient_magnitude(grid, seed, spacing)
        } else {
            0.0
        };

        SeedModel {
            value: grid.voxel_normalized_unchecked(seed),
            gradient,
            intensity,
            gradients,
        }
    }

    fn cost(&self, options: &RegionGrowOptions, value: f32, gradient: f32) -> RegionResult<f32> {
        let strictness = options.strictness;
        let cost = match options.cost_function {
            CostFunction::ThresholdOnly => 0.0,
            CostFunction::Intensity => normalized_difference(
                (value - self.value).abs(),
                strictness * self.intensity.stddev()?,
            ),
            CostFunction::GradientMagnitude => normalized_difference(
                (gradient - self.gradient).abs(),
                strictness * self.gradients.stddev()?,
            ),
            CostFunction::Weighted => {
                let sd = self.intensity.stddev()?;
                let gsd = self.gradients.stddev()?;
                let ci = normalized_difference((value - self.value).abs(), strictness * sd);
                let cg = normalized_difference((gradient - self.gradient).abs(), strictness * gsd);
                // Equal weights when neither quantity varies around the seed
                let p = if sd + gsd > 0.0 { gsd / (sd + gsd) } else { 0.5 };
                ci * p + cg * (1.0 - p)
            }
        };
        Ok(cost)
    }
}

/// `diff / denom`, with a zero denominator accepting only an exact match.
fn normalized_difference(diff: f32, denom: f32) -> f32 {
    if denom > 0.0 {
        diff / denom
    } else if diff == 0.0 {
        0.0
    } else {
        f32::INFINITY
    }
}

fn outside_margin(pos: IVec3, dims: IVec3) -> bool {
    pos.cmplt(IVec3::splat(BORDER_MARGIN)).any()
        || pos.cmpge(dims - IVec3::splat(BORDER_MARGIN)).any()
}

/// Run the flood fill and return the marked-voxel mask.
fn grow_mask(volume: &Volume, seed: IVec3, options: &RegionGrowOptions) -> RegionResult<Vec<bool>> {
    options.validate()?;
    let grid = volume
        .ram_representation()
        .ok_or(RegionError::NoRepresentation)?;
    if !grid.contains(seed) {
        return Err(RegionError::InvalidSeed {
            x: seed.x,
            y: seed.y,
            z: seed.z,
        });
    }

    let spacing = volume.spacing();
    let dims = grid.dimensions().as_ivec3();
    let with_gradient = options.cost_function.uses_gradient();
    let offsets = options.neighborhood.offsets();
    let mut model = SeedModel::new(grid, seed, spacing, with_gradient);

    debug!(
        target: "volflow-region",
        seed = ?seed,
        value = model.value,
        cost_function = ?options.cost_function,
        "growing region"
    );
    if outside_margin(seed, dims) {
        debug!(target: "volflow-region", seed = ?seed, "seed lies in the border margin");
    }

    let mut marked = vec![false; grid.num_voxels()];
    let mut stack: Vec<IVec3> = Vec::with_capacity(offsets.len() + 1);
    stack.push(seed);
    stack.extend(offsets.iter().map(|&o| seed + o));

    let mut num_marked = 0usize;
    while let Some(pos) = stack.pop() {
        if outside_margin(pos, dims) {
            continue;
        }
        let Some(index) = grid.linear_index(pos) else {
            continue;
        };
        if marked[index] {
            continue;
        }

        let value = grid.voxel_normalized_at(index);
        let gradient = if with_gradient {
            gradient_magnitude(grid, pos, spacing)
        } else {
            0.0
        };

        if options.adaptive {
            model.intensity.add_sample(value);
            if with_gradient {
                model.gradients.add_sample(gradient);
            }
        }

        if options.use_thresholds
            && (value < options.lower_threshold || value > options.upper_threshold)
        {
            continue;
        }

        if model.cost(options, value, gradient)? >= 1.0 {
            continue;
        }

        if options.max_seed_distance > 0.0
            && (pos - seed).as_vec3().length() > options.max_seed_distance
        {
            continue;
        }

        marked[index] = true;
        num_marked += 1;

        for &offset in &offsets {
            let next = pos + offset;
            if grid.linear_index(next).is_some_and(|i| !marked[i]) {
                stack.push(next);
            }
        }
    }

    debug!(
        target: "volflow-region",
        marked = num_marked,
        samples = model.intensity.num_samples(),
        "region grown"
    );
    Ok(marked)
}

/// Grow a region into a new 8-bit segmentation
///
/// # Arguments
///
/// * `volume` - Input volume; must hold an in-memory grid
/// * `seed` - Seed position
/// * `options` - Region growing options
///
/// # Returns
///
/// A `UInt8` grid of the input's size holding `options.segment_id` on every
/// marked voxel and 0 elsewhere.
///
/// # Errors
///
/// Returns [`RegionError::NoRepresentation`] if the volume holds no grid,
/// [`RegionError::InvalidSeed`] if the seed is outside the grid and
/// [`RegionError::InvalidParameters`] for invalid options.
///
/// # Examples
///
/// ```
/// use glam::{IVec3, UVec3};
/// use volflow_core::{PhantomBuilder, Volume, VoxelFormat};
/// use volflow_region::{CostFunction, RegionGrowOptions, grow_region};
///
/// let grid = PhantomBuilder::new(UVec3::splat(12), VoxelFormat::UInt8)
///     .with_box(IVec3::splat(4), IVec3::splat(7), 0.8)
///     .build()
///     .unwrap();
/// let volume = Volume::from_grid(grid);
/// let options = RegionGrowOptions::default()
///     .with_cost_function(CostFunction::ThresholdOnly)
///     .with_thresholds(0.5, 1.0);
/// let segmentation = grow_region(&volume, IVec3::splat(5), &options).unwrap();
/// assert_eq!(segmentation.count_nonzero(), 64);
/// ```
pub fn grow_region(
    volume: &Volume,
    seed: IVec3,
    options: &RegionGrowOptions,
) -> RegionResult<VoxelGrid> {
    let marked = grow_mask(volume, seed, options)?;
    let mut segmentation = VoxelGrid::new(volume.dimensions(), VoxelFormat::UInt8)?.to_mut();
    write_segment(&mut segmentation, &marked, options.segment_id);
    Ok(segmentation.into())
}

/// Grow a region into an existing 8-bit segmentation
///
/// Marked voxels receive `options.segment_id` only where the segmentation
/// still holds 0, so earlier segments are kept. A segment id of 0 erases
/// every marked voxel regardless of its current label.
///
/// # Returns
///
/// The number of marked voxels.
///
/// # Errors
///
/// In addition to the errors of [`grow_region`], returns
/// [`RegionError::UnsupportedFormat`] if the segmentation is not `UInt8`
/// and [`RegionError::Core`] with a dimension mismatch if its size differs
/// from the volume's.
pub fn grow_region_into(
    volume: &Volume,
    seed: IVec3,
    options: &RegionGrowOptions,
    segmentation: &mut VoxelGridMut,
) -> RegionResult<usize> {
    if segmentation.format() != VoxelFormat::UInt8 {
        return Err(RegionError::UnsupportedFormat {
            expected: VoxelFormat::UInt8.name(),
            actual: segmentation.format().name(),
        });
    }
    let (expected, actual) = (volume.dimensions(), segmentation.dimensions());
    if expected != actual {
        return Err(volflow_core::Error::DimensionMismatch {
            expected: (expected.x, expected.y, expected.z),
            actual: (actual.x, actual.y, actual.z),
        }
        .into());
    }

    let marked = grow_mask(volume, seed, options)?;
    write_segment(segmentation, &marked, options.segment_id);
    Ok(marked.iter().filter(|&&m| m).count())
}

fn write_segment(segmentation: &mut VoxelGridMut, marked: &[bool], segment_id: u8) {
    let id = f32::from(segment_id);
    for (index, &m) in marked.iter().enumerate() {
        if m && (segment_id == 0 || segmentation.voxel_at(index) == 0.0) {
            segmentation.set_voxel_at(index, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;
    use volflow_core::PhantomBuilder;

    fn box_volume() -> Volume {
        let grid = PhantomBuilder::new(UVec3::splat(12), VoxelFormat::UInt8)
            .with_background(0.1)
            .with_box(IVec3::splat(4), IVec3::splat(7), 0.8)
            .build()
            .unwrap();
        Volume::from_grid(grid)
    }

    #[test]
    fn test_normalized_difference() {
        assert_eq!(normalized_difference(0.5, 1.0), 0.5);
        assert_eq!(normalized_difference(0.0, 0.0), 0.0);
        assert_eq!(normalized_difference(0.1, 0.0), f32::INFINITY);
    }

    #[test]
    fn test_cost_function_names() {
        for cost in [
            CostFunction::Intensity,
            CostFunction::GradientMagnitude,
            CostFunction::Weighted,
            CostFunction::ThresholdOnly,
        ] {
            assert_eq!(CostFunction::from_name(cost.name()).unwrap(), cost);
        }
        assert!(CostFunction::from_name("laplace").is_err());
    }

    #[test]
    fn test_outside_margin() {
        let dims = IVec3::splat(10);
        assert!(outside_margin(IVec3::new(1, 5, 5), dims));
        assert!(outside_margin(IVec3::new(5, 8, 5), dims));
        assert!(!outside_margin(IVec3::splat(2), dims));
        assert!(!outside_margin(IVec3::splat(7), dims));
    }

    #[test]
    fn test_threshold_only_fills_box() {
        let options = RegionGrowOptions::default()
            .with_cost_function(CostFunction::ThresholdOnly)
            .with_thresholds(0.5, 1.0)
            .with_segment_id(3);
        let seg = grow_region(&box_volume(), IVec3::splat(5), &options).unwrap();
        assert_eq!(seg.count_nonzero(), 64);
        assert_eq!(seg.voxel(IVec3::splat(4)), Some(3.0));
        assert_eq!(seg.voxel(IVec3::splat(3)), Some(0.0));
    }

    #[test]
    fn test_zero_spread_accepts_exact_matches() {
        let options = RegionGrowOptions::default().with_strictness(1.0);
        let seg = grow_region(&box_volume(), IVec3::splat(5), &options).unwrap();
        // Uniform neighborhood: only exact matches are accepted
        assert_eq!(seg.count_nonzero(), 64);
    }

    #[test]
    fn test_invalid_seed() {
        let options = RegionGrowOptions::default();
        let err = grow_region(&box_volume(), IVec3::new(12, 0, 0), &options).unwrap_err();
        assert!(matches!(err, RegionError::InvalidSeed { x: 12, .. }));
    }

    #[test]
    fn test_no_representation() {
        let volume =
            Volume::without_representation(UVec3::splat(8), VoxelFormat::UInt8).unwrap();
        let err = grow_region(&volume, IVec3::splat(4), &RegionGrowOptions::default())
            .unwrap_err();
        assert!(matches!(err, RegionError::NoRepresentation));
    }

    #[test]
    fn test_invalid_options() {
        let volume = box_volume();
        let options = RegionGrowOptions::default().with_strictness(-1.0);
        assert!(grow_region(&volume, IVec3::splat(5), &options).is_err());
        let options = RegionGrowOptions::default().with_thresholds(0.9, 0.1);
        assert!(grow_region(&volume, IVec3::splat(5), &options).is_err());
    }

    #[test]
    fn test_into_rejects_wrong_target() {
        let volume = box_volume();
        let options = RegionGrowOptions::default();

        let mut target = VoxelGrid::new(UVec3::splat(12), VoxelFormat::UInt16)
            .unwrap()
            .to_mut();
        let err = grow_region_into(&volume, IVec3::splat(5), &options, &mut target).unwrap_err();
        assert!(matches!(err, RegionError::UnsupportedFormat { .. }));

        let mut target = VoxelGrid::new(UVec3::splat(11), VoxelFormat::UInt8)
            .unwrap()
            .to_mut();
        let err = grow_region_into(&volume, IVec3::splat(5), &options, &mut target).unwrap_err();
        assert!(matches!(
            err,
            RegionError::Core(volflow_core::Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_border_seed_yields_empty_region() {
        let options = RegionGrowOptions::default().with_cost_function(CostFunction::ThresholdOnly);
        let seg = grow_region(&box_volume(), IVec3::new(0, 5, 5), &options).unwrap();
        // Neighbors of a seed at x = 0 all lie in the margin
        assert_eq!(seg.count_nonzero(), 0);
    }
}
