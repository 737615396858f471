//! File-based configuration.
//!
//! All sections are optional in the TOML file; missing sections and
//! fields fall back to their defaults.

use crate::analysis::SharpnessConfig;
use crate::capture::CaptureConfig;
use crate::service::ServiceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Zero width or height.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// JPEG quality outside 1-100.
    #[error("invalid JPEG quality {0} (must be 1-100)")]
    InvalidJpegQuality(u8),
    /// Negative or non-finite sharpness threshold.
    #[error("invalid sharpness threshold {0}")]
    InvalidThreshold(f64),
    /// Negative or non-finite luma weight.
    #[error("luma weights must be finite and non-negative")]
    InvalidLumaWeights,
    /// Service URL is not http or https.
    #[error("invalid service URL: {0}")]
    InvalidServiceUrl(String),
    /// Zero timeout.
    #[error("invalid timeout (must be at least one second)")]
    InvalidTimeout,
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Camera settings.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Blur gate settings.
    #[serde(default)]
    pub sharpness: SharpnessConfig,
    /// Verification service settings.
    #[serde(default)]
    pub service: ServiceConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.sharpness.validate()?;
        self.service.validate()?;
        Ok(())
    }
}
