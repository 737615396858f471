//! Camera input and frame handling.
//!
//! This module provides abstractions for capturing still frames from a
//! camera, decoding encoded stills into pixel buffers and producing the
//! JPEG representation sent to the verification service.

mod camera;
mod config;
mod decode;
#[cfg(feature = "camera")]
mod device;
mod frame;

pub use camera::{Camera, CameraError, MockCamera, MockPattern, StillImageCamera};
pub use config::CaptureConfig;
pub use decode::{decode_frame, encode_jpeg, jpeg_bytes, DecodeError};
#[cfg(feature = "camera")]
pub use device::DeviceCamera;
pub use frame::{Frame, BYTES_PER_PIXEL};
