//! Selfie sharpness estimation.
//!
//! Variance of luma is used as a focus proxy: an out-of-focus or flat
//! image has little contrast energy and therefore low luma variance.
//! The estimator is a pure function of the frame; decoding happens
//! earlier in the capture path.

use super::statistics::{LumaStatistics, LumaWeights};
use super::threshold::{SharpnessThreshold, ThresholdViolation, DEFAULT_MIN_VARIANCE};
use crate::capture::Frame;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Sharpness section of the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpnessConfig {
    /// Frames with luma variance strictly below this are blurry.
    pub min_variance: f64,
    /// Channel weights used to form luma.
    pub luma_weights: LumaWeights,
}

impl Default for SharpnessConfig {
    fn default() -> Self {
        Self {
            min_variance: DEFAULT_MIN_VARIANCE,
            luma_weights: LumaWeights::BT601,
        }
    }
}

impl SharpnessConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_variance.is_finite() || self.min_variance < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.min_variance));
        }
        let w = self.luma_weights;
        if [w.red, w.green, w.blue]
            .iter()
            .any(|c| !c.is_finite() || *c < 0.0)
        {
            return Err(ConfigError::InvalidLumaWeights);
        }
        Ok(())
    }
}

/// Outcome of evaluating one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SharpnessVerdict {
    /// Whether the frame is too blurry to submit.
    pub is_blurry: bool,
    /// Luma statistics the verdict was derived from.
    pub stats: LumaStatistics,
    /// The violated threshold, when blurry.
    pub violation: Option<ThresholdViolation>,
}

impl SharpnessVerdict {
    /// Measured luma variance.
    pub fn variance(&self) -> f64 {
        self.stats.variance
    }
}

/// Decides whether a still frame is sharp enough to submit.
#[derive(Debug, Clone, Default)]
pub struct SharpnessEstimator {
    weights: LumaWeights,
    threshold: SharpnessThreshold,
}

impl SharpnessEstimator {
    /// Creates an estimator with BT.601 weights and the default threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an estimator from the sharpness configuration.
    pub fn from_config(config: &SharpnessConfig) -> Self {
        Self {
            weights: config.luma_weights,
            threshold: SharpnessThreshold::new(config.min_variance),
        }
    }

    /// Returns the configured threshold.
    pub fn threshold(&self) -> &SharpnessThreshold {
        &self.threshold
    }

    /// Evaluates a decoded, non-empty frame.
    pub fn evaluate(&self, frame: &Frame) -> SharpnessVerdict {
        debug_assert!(frame.pixel_count() > 0, "sharpness of an empty frame");

        let stats = LumaStatistics::analyze(frame, &self.weights);
        let violation = self.threshold.check(&stats).err();

        tracing::debug!(
            variance = stats.variance,
            mean = stats.mean,
            pixels = stats.sample_size,
            blurry = violation.is_some(),
            "Sharpness evaluated"
        );

        SharpnessVerdict {
            is_blurry: violation.is_some(),
            stats,
            violation,
        }
    }
}
