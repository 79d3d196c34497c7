//! Volume source processor

use glam::Vec3;
use std::any::Any;
use std::path::PathBuf;
use tracing::debug;
use volflow_core::{Volume, VoxelGrid};
use volflow_network::{
    NetworkError, NetworkResult, PortData, PortSpec, PortType, ProcessContext, ProcessorBody,
};

use crate::properties::{format_vec3, invalid_value, parse_vec3};

/// Publishes a volume on its outport
///
/// The volume is either set directly or loaded from a serialized grid
/// file named by the `path` property. The `spacing` property applies to a
/// loaded volume and is also stamped onto a volume set directly.
#[derive(Debug, Clone, Default)]
pub struct VolumeSource {
    volume: Option<Volume>,
    path: Option<PathBuf>,
    spacing: Option<Vec3>,
}

impl VolumeSource {
    /// Outport id
    pub const OUTPORT: &'static str = "volume.out";

    /// Create a source without a volume
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding `volume`
    pub fn with_volume(volume: Volume) -> Self {
        VolumeSource {
            volume: Some(volume),
            ..Self::default()
        }
    }

    /// Replace the volume; it is published on the next run.
    pub fn set_volume(&mut self, volume: Option<Volume>) {
        self.volume = volume;
        self.path = None;
    }

    /// Load the volume from a grid file on the next run.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
        self.volume = None;
    }

    /// Current volume, if set or already loaded
    pub fn volume(&self) -> Option<&Volume> {
        self.volume.as_ref()
    }

    fn load(&mut self) -> NetworkResult<()> {
        if self.volume.is_some() {
            return Ok(());
        }
        let Some(path) = &self.path else {
            return Ok(());
        };
        let grid = VoxelGrid::read_from_file(path)?;
        let mut volume = Volume::from_grid(grid);
        if let Some(spacing) = self.spacing {
            volume = volume.with_spacing(spacing)?;
        }
        debug!(
            target: "volflow-modules",
            path = %path.display(),
            dims = ?volume.dimensions(),
            "volume loaded"
        );
        self.volume = Some(volume);
        Ok(())
    }
}

impl ProcessorBody for VolumeSource {
    fn class_name(&self) -> &'static str {
        "VolumeSource"
    }

    fn ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::outport(Self::OUTPORT, PortType::Volume)]
    }

    fn process(&mut self, ctx: &mut ProcessContext) -> NetworkResult<()> {
        self.load()?;
        match &self.volume {
            Some(volume) => ctx.set_output(Self::OUTPORT, PortData::Volume(volume.clone())),
            None => ctx.clear_output(Self::OUTPORT),
        }
    }

    fn properties(&self) -> Vec<(String, String)> {
        let mut properties = Vec::new();
        if let Some(path) = &self.path {
            properties.push(("path".to_string(), path.display().to_string()));
        }
        if let Some(spacing) = self.spacing {
            properties.push(("spacing".to_string(), format_vec3(spacing)));
        }
        properties
    }

    fn set_property(&mut self, name: &str, value: &str) -> NetworkResult<()> {
        match name {
            "path" => self.set_path(value),
            "spacing" => {
                let spacing = parse_vec3(value).ok_or_else(|| invalid_value(name, value))?;
                if self.path.is_some() {
                    self.volume = None;
                } else if let Some(volume) = &self.volume {
                    self.volume = Some(volume.clone().with_spacing(spacing)?);
                }
                self.spacing = Some(spacing);
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

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;
    use volflow_core::VoxelFormat;

    fn cube() -> Volume {
        Volume::from_grid(VoxelGrid::new(UVec3::splat(4), VoxelFormat::UInt8).unwrap())
    }

    #[test]
    fn test_spacing_keeps_held_volume() {
        let mut source = VolumeSource::with_volume(cube());
        source.set_property("spacing", "1 1 2").unwrap();
        let volume = source.volume().unwrap();
        assert_eq!(volume.spacing(), Vec3::new(1.0, 1.0, 2.0));
        assert_eq!(volume.dimensions(), UVec3::splat(4));
        assert_eq!(
            source.properties(),
            vec![("spacing".to_string(), "1 1 2".to_string())]
        );
    }

    #[test]
    fn test_spacing_reloads_path() {
        let mut source = VolumeSource::new();
        source.set_property("path", "missing.grid").unwrap();
        source.set_property("spacing", "2 2 2").unwrap();
        assert!(source.volume().is_none());
        assert!(matches!(
            source.set_property("spacing", "1 2"),
            Err(NetworkError::InvalidPropertyValue { .. })
        ));
    }
}
