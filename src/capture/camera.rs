//! Camera abstraction for still capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing real devices, still-image files and mock implementations
//! to feed the same capture session.

use super::decode::{decode_frame, DecodeError};
use super::{CaptureConfig, Frame};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// No device at the requested index or path.
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    /// Access to the device was refused.
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    /// The device exists but could not be opened.
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    /// The capture configuration was rejected.
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    /// The device produced no frame.
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    /// The still could not be decoded.
    #[error("failed to decode frame: {0}")]
    Decode(#[from] DecodeError),
    /// Capture attempted before `open`.
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for camera implementations.
///
/// This abstraction allows swapping between real camera hardware
/// and mock implementations for testing.
pub trait Camera {
    /// Opens and initializes the camera with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Captures a single still frame.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Closes the camera and releases resources.
    fn close(&mut self);
}

/// What a [`MockCamera`] produces on its next capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockPattern {
    /// Every pixel the same colour (always blurry).
    Uniform([u8; 3]),
    /// Single-pixel black/white checkerboard (always sharp).
    Checkerboard,
    /// The device returns nothing.
    Empty,
}

/// Mock camera for testing that generates synthetic frames.
///
/// Captures follow a script of patterns; once the script is exhausted
/// the fallback pattern repeats.
#[derive(Debug)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    sequence: u64,
    script: VecDeque<MockPattern>,
    fallback: MockPattern,
    unavailable: bool,
}

impl Default for MockCamera {
    fn default() -> Self {
        Self {
            config: None,
            sequence: 0,
            script: VecDeque::new(),
            fallback: MockPattern::Checkerboard,
            unavailable: false,
        }
    }
}

impl MockCamera {
    /// Mock camera producing sharp checkerboard frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera that always produces the given pattern.
    pub fn with_pattern(pattern: MockPattern) -> Self {
        Self {
            fallback: pattern,
            ..Self::default()
        }
    }

    /// Camera that plays `patterns` in order, then falls back to a checkerboard.
    pub fn scripted(patterns: impl IntoIterator<Item = MockPattern>) -> Self {
        Self {
            script: patterns.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Camera whose device refuses to open, as when permission is denied.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        if self.unavailable {
            return Err(CameraError::PermissionDenied(
                "mock device refused access".to_string(),
            ));
        }
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!("MockCamera opened with config: {:?}", config);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;
        let pattern = self.script.pop_front().unwrap_or(self.fallback);

        let frame = match pattern {
            MockPattern::Uniform(rgb) => {
                Frame::uniform(config.width, config.height, rgb, self.sequence + 1)
            }
            MockPattern::Checkerboard => {
                Frame::checkerboard(config.width, config.height, self.sequence + 1)
            }
            MockPattern::Empty => {
                return Err(CameraError::CaptureFailed(
                    "device returned no frame".to_string(),
                ))
            }
        };

        self.sequence += 1;
        Ok(frame)
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        tracing::info!("MockCamera closed");
    }
}

/// Camera backed by a still image file.
///
/// Every capture decodes the file again, so a file replaced on disk
/// between captures acts like a retake.
#[derive(Debug)]
pub struct StillImageCamera {
    path: PathBuf,
    open: bool,
    sequence: u64,
}

impl StillImageCamera {
    /// Camera reading stills from `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            open: false,
            sequence: 0,
        }
    }
}

impl Camera for StillImageCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        if !self.path.is_file() {
            return Err(CameraError::DeviceNotFound(self.path.display().to_string()));
        }
        self.open = true;
        self.sequence = 0;
        tracing::info!(path = %self.path.display(), "Still image camera opened");
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        if !self.open {
            return Err(CameraError::NotInitialized);
        }
        let bytes = std::fs::read(&self.path)
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        if bytes.is_empty() {
            return Err(CameraError::CaptureFailed("still image is empty".to_string()));
        }
        self.sequence += 1;
        Ok(decode_frame(&bytes, self.sequence)?)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }
}
