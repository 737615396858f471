//! Frame type representing a decoded still image with metadata.

/// Number of bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A single decoded still frame.
///
/// Pixels are stored as a flat RGBA buffer, row-major. A frame may also
/// carry the encoded bytes it was decoded from so that submission can reuse
/// the camera's own JPEG instead of re-encoding.
#[derive(Clone)]
pub struct Frame {
    /// Raw RGBA pixel data.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Encoded JPEG bytes this frame was decoded from, if any.
    jpeg: Option<Vec<u8>>,
    /// Monotonic sequence number.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame from an RGBA buffer.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            jpeg: None,
            sequence,
        }
    }

    /// Builds a frame where every pixel has the same RGB value.
    pub fn uniform(width: u32, height: u32, rgb: [u8; 3], sequence: u64) -> Self {
        let count = (width as usize) * (height as usize);
        let pixels = std::iter::repeat([rgb[0], rgb[1], rgb[2], 255])
            .take(count)
            .flatten()
            .collect();
        Self::new(pixels, width, height, sequence)
    }

    /// Builds a black/white checkerboard with single-pixel cells.
    pub fn checkerboard(width: u32, height: u32, sequence: u64) -> Self {
        let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * BYTES_PER_PIXEL);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 0 } else { 255 };
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Self::new(pixels, width, height, sequence)
    }

    /// Attaches the encoded JPEG bytes the frame was decoded from.
    pub fn with_jpeg(mut self, jpeg: Vec<u8>) -> Self {
        self.jpeg = Some(jpeg);
        self
    }

    /// Returns a reference to the raw RGBA data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Iterates over pixels as `[r, g, b, a]` samples.
    pub fn samples(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.pixels.chunks_exact(BYTES_PER_PIXEL)
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the source JPEG bytes, if the frame came from one.
    #[inline]
    pub fn jpeg(&self) -> Option<&[u8]> {
        self.jpeg.as_deref()
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the frame is non-empty and the buffer matches its dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixel_count() > 0 && self.pixels.len() == self.pixel_count() * BYTES_PER_PIXEL
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .field("jpeg_bytes", &self.jpeg.as_ref().map(Vec::len))
            .finish()
    }
}
