//! Running statistics over voxel samples
//!
//! [`VoxelStatistics`] accumulates a stream of `f32` samples and reports
//! mean, variance and standard deviation using Welford's online algorithm.
//! The variance is the *population* variance (`m2 / n`), which the region
//! growing thresholds are calibrated against.
//!
//! When created with sample collection enabled the raw samples are kept as
//! well, making median and quartiles available.
//!
//! # Examples
//!
//! ```
//! use volflow_core::VoxelStatistics;
//!
//! let mut stats = VoxelStatistics::new(false);
//! for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
//!     stats.add_sample(v);
//! }
//! assert_eq!(stats.mean().unwrap(), 5.0);
//! assert!((stats.stddev().unwrap() - 2.0).abs() < 1e-6);
//! ```

use crate::error::{Error, Result};

/// Welford accumulator for voxel samples
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelStatistics {
    count: usize,
    sum: f32,
    mean: f32,
    m2: f32,
    min: f32,
    max: f32,
    collect_samples: bool,
    samples: Vec<f32>,
}

impl Default for VoxelStatistics {
    fn default() -> Self {
        Self::new(false)
    }
}

impl VoxelStatistics {
    /// Create empty statistics.
    ///
    /// # Arguments
    ///
    /// * `collect_samples` - Keep every sample so that median and quartiles
    ///   can be computed
    pub fn new(collect_samples: bool) -> Self {
        VoxelStatistics {
            count: 0,
            sum: 0.0,
            mean: 0.0,
            m2: 0.0,
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
            collect_samples,
            samples: Vec::new(),
        }
    }

    /// Clear all accumulated state. Sample collection stays as configured.
    pub fn reset(&mut self) {
        *self = Self::new(self.collect_samples);
    }

    /// Add one sample.
    pub fn add_sample(&mut self, value: f32) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f32;
        if self.count > 1 {
            self.m2 += delta * (value - self.mean);
        }

        if self.collect_samples {
            self.samples.push(value);
        }
    }

    /// Number of samples added since the last reset.
    pub fn num_samples(&self) -> usize {
        self.count
    }

    /// Whether no sample has been added yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether raw samples are kept.
    pub fn collects_samples(&self) -> bool {
        self.collect_samples
    }

    /// Sum of all samples. Zero when empty.
    pub fn sum(&self) -> f32 {
        self.sum
    }

    fn ensure_samples(&self) -> Result<()> {
        if self.count == 0 {
            return Err(Error::EmptyStatistics);
        }
        Ok(())
    }

    /// Running mean.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStatistics`] when no sample was added.
    pub fn mean(&self) -> Result<f32> {
        self.ensure_samples()?;
        Ok(self.mean)
    }

    /// Population variance `m2 / n`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStatistics`] when no sample was added.
    pub fn variance(&self) -> Result<f32> {
        self.ensure_samples()?;
        Ok(self.m2 / self.count as f32)
    }

    /// Population standard deviation `sqrt(m2 / n)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStatistics`] when no sample was added.
    pub fn stddev(&self) -> Result<f32> {
        self.variance().map(f32::sqrt)
    }

    /// Smallest sample.
    pub fn min(&self) -> Result<f32> {
        self.ensure_samples()?;
        Ok(self.min)
    }

    /// Largest sample.
    pub fn max(&self) -> Result<f32> {
        self.ensure_samples()?;
        Ok(self.max)
    }

    /// Sample at `quarter / 4` of the sorted buffer (0 → min side).
    fn sorted_sample(&self, quarter: usize) -> Result<f32> {
        if !self.collect_samples {
            return Err(Error::SamplesNotCollected);
        }
        self.ensure_samples()?;
        let mut sorted = self.samples.clone();
        sorted.sort_by(f32::total_cmp);
        Ok(sorted[sorted.len() * quarter / 4])
    }

    /// Median of the collected samples (element `n / 2` after sorting).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SamplesNotCollected`] if sample collection is off,
    /// or [`Error::EmptyStatistics`] when no sample was added.
    pub fn median(&self) -> Result<f32> {
        self.sorted_sample(2)
    }

    /// Lower quartile (element `n / 4` after sorting).
    pub fn lower_quartile(&self) -> Result<f32> {
        self.sorted_sample(1)
    }

    /// Upper quartile (element `3n / 4` after sorting).
    pub fn upper_quartile(&self) -> Result<f32> {
        self.sorted_sample(3)
    }
}
