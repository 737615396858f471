//! Local image-quality analysis.
//!
//! This module decides whether a captured selfie is sharp enough to
//! send for verification. The check is a cheap sanity gate run on every
//! capture, not a substitute for the server's own quality assessment.

mod sharpness;
mod statistics;
mod threshold;

pub use sharpness::{SharpnessConfig, SharpnessEstimator, SharpnessVerdict};
pub use statistics::{LumaStatistics, LumaWeights};
pub use threshold::{SharpnessThreshold, ThresholdViolation, DEFAULT_MIN_VARIANCE};
