use crate::config::DEFAULT_INPUT_EDGE;
use crate::{InputTensor, Preprocess, PreprocessError};
use common::span;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use schema::{RGB_CHANNELS, RawFrame};

/// Stretches the whole frame onto the square model input with a bilinear
/// filter. No cropping, no letterboxing and no normalization: the quantized
/// classifier consumes raw 0-255 channel values.
pub struct CpuPreProcessor {
    edge: u32,
    resizer: Resizer,
    options: ResizeOptions,
    resized: Image<'static>,
}

impl CpuPreProcessor {
    pub fn new(edge: u32) -> Self {
        Self {
            edge,
            resizer: Resizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
            resized: Image::new(edge, edge, PixelType::U8x3),
        }
    }

    /// Preprocess a packed RGB buffer that is not wrapped in a `RawFrame`.
    pub fn preprocess_from_u8_slice(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<InputTensor, PreprocessError> {
        let _s = span!("preprocess_frame");

        tracing::trace!(
            width,
            height,
            pixel_bytes = pixels.len(),
            edge = self.edge,
            "Preprocessing frame dimensions"
        );

        if self.edge == 0 {
            return Err(PreprocessError::ZeroEdge);
        }
        if width == 0 || height == 0 {
            return Err(PreprocessError::EmptyFrame { width, height });
        }

        let expected = width as usize * height as usize * RGB_CHANNELS;
        if pixels.len() != expected {
            return Err(PreprocessError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        if width == self.edge && height == self.edge {
            return InputTensor::from_vec(self.edge, pixels.to_vec());
        }

        self.resize(pixels, width, height)?;
        InputTensor::from_vec(self.edge, self.resized.buffer().to_vec())
    }

    fn resize(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<(), PreprocessError> {
        let _s = span!("resize");

        let src = ImageRef::new(width, height, pixels, PixelType::U8x3)?;
        self.resizer.resize(&src, &mut self.resized, &self.options)?;
        Ok(())
    }
}

impl Default for CpuPreProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_EDGE)
    }
}

impl Preprocess for CpuPreProcessor {
    fn preprocess(&mut self, frame: &RawFrame) -> Result<InputTensor, PreprocessError> {
        self.preprocess_from_u8_slice(frame.pixels(), frame.width(), frame.height())
    }

    fn input_edge(&self) -> u32 {
        self.edge
    }
}
