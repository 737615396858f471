//! Live camera backed by the platform capture API.

use super::{Camera, CameraError, CaptureConfig, Frame};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType, Resolution};

/// A physical camera opened through `nokhwa`.
pub struct DeviceCamera {
    device: Option<nokhwa::Camera>,
    sequence: u64,
}

impl DeviceCamera {
    /// Camera that opens the device named by the capture config.
    pub fn new() -> Self {
        Self {
            device: None,
            sequence: 0,
        }
    }
}

impl Default for DeviceCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for DeviceCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::HighestResolution(
            Resolution::new(config.width, config.height),
        ));
        let mut device = nokhwa::Camera::new(CameraIndex::Index(config.device_id), requested)
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;
        device
            .open_stream()
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        tracing::info!(device_id = config.device_id, "Camera stream opened");
        self.device = Some(device);
        self.sequence = 0;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let device = self.device.as_mut().ok_or(CameraError::NotInitialized)?;
        let buffer = device
            .frame()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let rgb = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        let (width, height) = rgb.dimensions();
        let pixels: Vec<u8> = rgb
            .into_raw()
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect();

        self.sequence += 1;
        let frame = Frame::new(pixels, width, height, self.sequence);
        if !frame.is_valid() {
            return Err(CameraError::CaptureFailed("device returned no frame".to_string()));
        }
        Ok(frame)
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            if let Err(e) = device.stop_stream() {
                tracing::warn!(error = %e, "Failed to stop camera stream");
            }
        }
    }
}
