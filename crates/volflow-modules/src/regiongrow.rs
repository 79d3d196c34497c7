//! Region growing processor
//!
//! [`RegionGrowProcessor`] grows a region from its seed in the incoming
//! volume and publishes an 8-bit segmentation. Each run draws into the
//! segmentation kept from earlier runs, so successive seeds with different
//! segment ids build up a multi-label segmentation. The segmentation is
//! reset when the input size changes or on request.

use glam::IVec3;
use std::any::Any;
use tracing::{debug, info};
use volflow_core::{Volume, VoxelFormat, VoxelGrid};
use volflow_network::{
    NetworkError, NetworkResult, PortData, PortSpec, PortType, ProcessContext, ProcessorBody,
};
use volflow_region::{
    CostFunction, Neighborhood, RegionError, RegionGrowOptions, grow_region_into,
};

use crate::properties::{format_ivec3, invalid_value, parse_ivec3, parse_value};

/// Processor wrapping [`volflow_region::grow_region_into`]
#[derive(Debug, Clone, Default)]
pub struct RegionGrowProcessor {
    seed: Option<IVec3>,
    options: RegionGrowOptions,
    segmentation: Option<VoxelGrid>,
    last_marked: usize,
}

impl RegionGrowProcessor {
    /// Volume inport id
    pub const INPORT: &'static str = "volume.in";
    /// Segmentation outport id
    pub const OUTPORT: &'static str = "segmentation.out";

    /// Create a processor with default options and no seed
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor growing from `seed` with `options`
    pub fn with_seed(seed: IVec3, options: RegionGrowOptions) -> Self {
        RegionGrowProcessor {
            seed: Some(seed),
            options,
            ..Self::default()
        }
    }

    /// Seed voxel
    pub fn seed(&self) -> Option<IVec3> {
        self.seed
    }

    /// Set the seed for the next run
    pub fn set_seed(&mut self, seed: IVec3) {
        self.seed = Some(seed);
    }

    /// Region growing options
    pub fn options(&self) -> &RegionGrowOptions {
        &self.options
    }

    /// Replace the region growing options
    pub fn set_options(&mut self, options: RegionGrowOptions) {
        self.options = options;
    }

    /// Segmentation built so far
    pub fn segmentation(&self) -> Option<&VoxelGrid> {
        self.segmentation.as_ref()
    }

    /// Drop the segmentation; the next run starts from an empty one.
    pub fn clear_segmentation(&mut self) {
        self.segmentation = None;
    }

    /// Number of voxels marked by the last run
    pub fn last_marked(&self) -> usize {
        self.last_marked
    }

    fn failed(ctx: &ProcessContext, err: RegionError) -> NetworkError {
        NetworkError::ProcessingFailed {
            processor: ctx.processor_name().to_string(),
            message: err.to_string(),
        }
    }

    /// Grow into a copy of the kept segmentation; a failed run leaves it untouched.
    fn grow(&mut self, volume: &Volume, seed: IVec3) -> Result<VoxelGrid, RegionError> {
        let dims = volume.dimensions();
        let mut segmentation = match &self.segmentation {
            Some(seg) if seg.dimensions() == dims => seg.to_mut(),
            Some(_) => {
                info!(target: "volflow-modules", ?dims, "input size changed, segmentation reset");
                VoxelGrid::new(dims, VoxelFormat::UInt8)?.to_mut()
            }
            None => VoxelGrid::new(dims, VoxelFormat::UInt8)?.to_mut(),
        };
        self.last_marked = grow_region_into(volume, seed, &self.options, &mut segmentation)?;
        Ok(segmentation.into())
    }
}

impl ProcessorBody for RegionGrowProcessor {
    fn class_name(&self) -> &'static str {
        "RegionGrow"
    }

    fn ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::inport(Self::INPORT, PortType::Volume),
            PortSpec::outport(Self::OUTPORT, PortType::Volume),
        ]
    }

    fn process(&mut self, ctx: &mut ProcessContext) -> NetworkResult<()> {
        let Some(volume) = ctx.input(Self::INPORT).and_then(PortData::as_volume).cloned() else {
            return ctx.clear_output(Self::OUTPORT);
        };
        let Some(seed) = self.seed else {
            debug!(target: "volflow-modules", "no seed set");
            return ctx.clear_output(Self::OUTPORT);
        };

        let segmentation = self.grow(&volume, seed).map_err(|e| Self::failed(ctx, e))?;
        debug!(
            target: "volflow-modules",
            ?seed,
            segment_id = self.options.segment_id,
            marked = self.last_marked,
            "region grown"
        );
        self.segmentation = Some(segmentation.clone());
        let output = Volume::from_grid(segmentation).with_spacing(volume.spacing())?;
        ctx.set_output(Self::OUTPORT, PortData::Volume(output))
    }

    fn deinitialize(&mut self) {
        self.segmentation = None;
    }

    fn properties(&self) -> Vec<(String, String)> {
        let o = &self.options;
        let mut properties = Vec::new();
        if let Some(seed) = self.seed {
            properties.push(("seed".to_string(), format_ivec3(seed)));
        }
        properties.extend([
            ("segment_id".to_string(), o.segment_id.to_string()),
            ("lower_threshold".to_string(), o.lower_threshold.to_string()),
            ("upper_threshold".to_string(), o.upper_threshold.to_string()),
            ("use_thresholds".to_string(), o.use_thresholds.to_string()),
            ("strictness".to_string(), o.strictness.to_string()),
            ("cost_function".to_string(), o.cost_function.name().to_string()),
            ("adaptive".to_string(), o.adaptive.to_string()),
            ("max_seed_distance".to_string(), o.max_seed_distance.to_string()),
            ("neighborhood".to_string(), o.neighborhood.level().to_string()),
        ]);
        properties
    }

    fn set_property(&mut self, name: &str, value: &str) -> NetworkResult<()> {
        let o = &mut self.options;
        match name {
            "seed" => {
                self.seed = Some(parse_ivec3(value).ok_or_else(|| invalid_value(name, value))?);
            }
            "segment_id" => o.segment_id = parse_value(name, value)?,
            "lower_threshold" => o.lower_threshold = parse_value(name, value)?,
            "upper_threshold" => o.upper_threshold = parse_value(name, value)?,
            "use_thresholds" => o.use_thresholds = parse_value(name, value)?,
            "strictness" => o.strictness = parse_value(name, value)?,
            "cost_function" => {
                o.cost_function =
                    CostFunction::from_name(value.trim()).map_err(|_| invalid_value(name, value))?;
            }
            "adaptive" => o.adaptive = parse_value(name, value)?,
            "max_seed_distance" => o.max_seed_distance = parse_value(name, value)?,
            "neighborhood" => {
                o.neighborhood = Neighborhood::from_level(parse_value(name, value)?)
                    .map_err(|_| invalid_value(name, value))?;
            }
            _ => {
                return Err(NetworkError::UnknownProperty {
                    class: self.class_name().to_string(),
                    property: name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
