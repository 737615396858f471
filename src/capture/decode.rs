//! Still image decoding and JPEG encoding.
//!
//! Decoding turns encoded camera stills or uploaded files into RGBA
//! [`Frame`]s. Encoding produces the JPEG selfie part of a submission.

use super::Frame;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use thiserror::Error;

/// Errors raised while decoding or encoding still images.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not a supported image format.
    #[error("unrecognized image data: {0}")]
    Unrecognized(String),
    /// Zero width or height.
    #[error("image has no pixels")]
    Empty,
    /// Pixel buffer length disagrees with the dimensions.
    #[error("pixel buffer does not match {width}x{height}")]
    BufferMismatch {
        /// Frame width.
        width: u32,
        /// Frame height.
        height: u32,
    },
    /// The JPEG encoder failed.
    #[error("failed to encode JPEG: {0}")]
    Encode(String),
}

/// Decodes an encoded still (JPEG, PNG) into a frame.
///
/// JPEG input is kept alongside the pixels so it can be submitted as-is.
pub fn decode_frame(bytes: &[u8], sequence: u64) -> Result<Frame, DecodeError> {
    let format =
        image::guess_format(bytes).map_err(|e| DecodeError::Unrecognized(e.to_string()))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| DecodeError::Unrecognized(e.to_string()))?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::Empty);
    }

    let frame = Frame::new(decoded.into_raw(), width, height, sequence);
    tracing::debug!(width, height, ?format, "Decoded still image");

    if format == ImageFormat::Jpeg {
        Ok(frame.with_jpeg(bytes.to_vec()))
    } else {
        Ok(frame)
    }
}

/// Encodes a frame as baseline JPEG at the given quality (1-100).
///
/// Alpha is dropped; JPEG has no transparency.
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>, DecodeError> {
    if !frame.is_valid() {
        return Err(DecodeError::BufferMismatch {
            width: frame.width(),
            height: frame.height(),
        });
    }

    let rgb: Vec<u8> = frame
        .samples()
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let image = RgbImage::from_raw(frame.width(), frame.height(), rgb).ok_or(
        DecodeError::BufferMismatch {
            width: frame.width(),
            height: frame.height(),
        },
    )?;

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(&image)
        .map_err(|e| DecodeError::Encode(e.to_string()))?;
    Ok(out)
}

/// Returns JPEG bytes for a frame, reusing the source bytes when present.
pub fn jpeg_bytes(frame: &Frame, quality: u8) -> Result<Vec<u8>, DecodeError> {
    match frame.jpeg() {
        Some(bytes) => Ok(bytes.to_vec()),
        None => encode_jpeg(frame, quality),
    }
}
