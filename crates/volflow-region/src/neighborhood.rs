//! Voxel neighborhoods
//!
//! A [`Neighborhood`] selects which of the 26 voxels around a position are
//! considered adjacent during region growing. The selection keeps every
//! offset in `{-1, 0, 1}^3` (origin excluded) whose L1 norm does not exceed
//! the neighborhood level, which yields the 6 face neighbors for level 1,
//! faces plus the 12 edge neighbors for level 2 and all 26 for level 3.

use crate::error::{RegionError, RegionResult};
use glam::IVec3;

/// Connectivity used when expanding a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Neighborhood {
    /// Face neighbors (L1 norm <= 1)
    C6 = 1,
    /// Face and edge neighbors (L1 norm <= 2)
    C18 = 2,
    /// Full 3x3x3 block (L1 norm <= 3)
    #[default]
    C26 = 3,
}

impl Neighborhood {
    /// Create a neighborhood from its level (1, 2 or 3).
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::InvalidParameters`] for any other level.
    pub fn from_level(level: u8) -> RegionResult<Self> {
        match level {
            1 => Ok(Neighborhood::C6),
            2 => Ok(Neighborhood::C18),
            3 => Ok(Neighborhood::C26),
            _ => Err(RegionError::InvalidParameters(format!(
                "neighborhood level must be 1, 2 or 3, got {level}"
            ))),
        }
    }

    /// Maximum L1 norm of an included offset.
    pub fn level(self) -> i32 {
        self as i32
    }

    /// Offsets of the neighbors selected by this neighborhood.
    pub fn offsets(self) -> Vec<IVec3> {
        full_offsets()
            .into_iter()
            .filter(|o| o.abs().element_sum() <= self.level())
            .collect()
    }
}

/// All 26 offsets of the 3x3x3 block around a voxel, origin excluded.
///
/// Ordered with x varying fastest, then y, then z.
pub fn full_offsets() -> Vec<IVec3> {
    let mut offsets = Vec::with_capacity(26);
    for z in -1..=1 {
        for y in -1..=1 {
            for x in -1..=1 {
                if x != 0 || y != 0 || z != 0 {
                    offsets.push(IVec3::new(x, y, z));
                }
            }
        }
    }
    offsets
}
