use thiserror::Error;

pub const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Frame buffer size mismatch: expected {expected} bytes for {width}x{height} RGB, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A camera frame as delivered by the capture layer.
///
/// Pixels are packed row-major with three bytes per pixel in R, G, B order.
/// Dimensions may be zero; such frames are valid values but are rejected by
/// the preprocessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    frame_number: u64,
    timestamp_ns: u64,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RawFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SchemaError> {
        let expected = width as usize * height as usize * RGB_CHANNELS;
        if pixels.len() != expected {
            return Err(SchemaError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            frame_number: 0,
            timestamp_ns: 0,
            width,
            height,
            pixels,
        })
    }

    /// Frame filled with a single color.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * RGB_CHANNELS)
            .collect();
        Self {
            frame_number: 0,
            timestamp_ns: 0,
            width,
            height,
            pixels,
        }
    }

    pub fn with_sequence(mut self, frame_number: u64, timestamp_ns: u64) -> Self {
        self.frame_number = frame_number;
        self.timestamp_ns = timestamp_ns;
        self
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
