//! Sharpness threshold for the blur gate.
//!
//! A selfie whose luma variance falls below the threshold is rejected
//! as blurry. The threshold is fixed per configuration and does not
//! scale with resolution.

use super::statistics::LumaStatistics;
use serde::{Deserialize, Serialize};

/// Default minimum luma variance on the 0-255 luma scale.
pub const DEFAULT_MIN_VARIANCE: f64 = 100.0;

/// Quality threshold for selfie sharpness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharpnessThreshold {
    /// Minimum acceptable luma variance. Frames strictly below are blurry.
    pub min_variance: f64,
}

impl Default for SharpnessThreshold {
    fn default() -> Self {
        Self {
            min_variance: DEFAULT_MIN_VARIANCE,
        }
    }
}

impl SharpnessThreshold {
    /// Creates a threshold at `min_variance`.
    pub fn new(min_variance: f64) -> Self {
        Self { min_variance }
    }

    /// Checks statistics against the threshold.
    pub fn check(&self, stats: &LumaStatistics) -> Result<(), ThresholdViolation> {
        if stats.variance < self.min_variance {
            return Err(ThresholdViolation::LowVariance {
                observed: stats.variance,
                threshold: self.min_variance,
            });
        }

        Ok(())
    }
}

/// Threshold violation types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdViolation {
    /// Luma variance below the minimum.
    #[error("luma variance {observed:.2} below threshold {threshold:.2}")]
    LowVariance {
        /// Measured variance.
        observed: f64,
        /// Required minimum.
        threshold: f64,
    },
}
