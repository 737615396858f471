//! Luma statistics over a frame.
//!
//! Two passes over the pixel buffer: one for the mean, one for the
//! population variance around it.

use crate::capture::Frame;
use serde::{Deserialize, Serialize};

/// Weights applied to the red, green and blue channels to form luma.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumaWeights {
    /// Red channel weight.
    pub red: f64,
    /// Green channel weight.
    pub green: f64,
    /// Blue channel weight.
    pub blue: f64,
}

impl LumaWeights {
    /// ITU-R BT.601 luma coefficients.
    pub const BT601: Self = Self {
        red: 0.299,
        green: 0.587,
        blue: 0.114,
    };

    /// Luma of a single pixel. Alpha is ignored.
    #[inline]
    pub fn luma(&self, r: u8, g: u8, b: u8) -> f64 {
        self.red * r as f64 + self.green * g as f64 + self.blue * b as f64
    }
}

impl Default for LumaWeights {
    fn default() -> Self {
        Self::BT601
    }
}

/// Luma statistics of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumaStatistics {
    /// Arithmetic mean luma.
    pub mean: f64,
    /// Population variance of luma (divisor N).
    pub variance: f64,
    /// Number of pixels analyzed.
    pub sample_size: usize,
}

impl LumaStatistics {
    /// Computes luma mean and variance for every pixel of the frame.
    pub fn analyze(frame: &Frame, weights: &LumaWeights) -> Self {
        let luma = |px: &[u8]| weights.luma(px[0], px[1], px[2]);

        let n = frame.pixel_count();
        if n == 0 {
            return Self {
                mean: 0.0,
                variance: 0.0,
                sample_size: 0,
            };
        }

        let count = n as f64;
        let mean = frame.samples().map(luma).sum::<f64>() / count;
        let variance = frame
            .samples()
            .map(|px| (luma(px) - mean).powi(2))
            .sum::<f64>()
            / count;

        Self {
            mean,
            variance,
            sample_size: n,
        }
    }
}
