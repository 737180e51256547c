use crate::error::PreprocessError;
use ndarray::{ArrayView4, ShapeError};
use schema::RGB_CHANNELS;

/// Model input: `edge * edge` pixels, row-major, three raw bytes per pixel
/// in R, G, B order. Equivalent to an NHWC `[1, edge, edge, 3]` u8 tensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputTensor {
    edge: u32,
    data: Vec<u8>,
}

impl InputTensor {
    pub fn byte_len(edge: u32) -> usize {
        RGB_CHANNELS * edge as usize * edge as usize
    }

    pub fn from_vec(edge: u32, data: Vec<u8>) -> Result<Self, PreprocessError> {
        let expected = Self::byte_len(edge);
        if data.len() != expected {
            return Err(PreprocessError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { edge, data })
    }

    pub fn zeros(edge: u32) -> Self {
        Self {
            edge,
            data: vec![0u8; Self::byte_len(edge)],
        }
    }

    pub fn edge(&self) -> u32 {
        self.edge
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// NHWC shape `[1, edge, edge, 3]`
    pub fn shape(&self) -> [usize; 4] {
        let edge = self.edge as usize;
        [1, edge, edge, RGB_CHANNELS]
    }

    pub fn view(&self) -> Result<ArrayView4<'_, u8>, ShapeError> {
        let [n, h, w, c] = self.shape();
        ArrayView4::from_shape((n, h, w, c), &self.data)
    }

    /// RGB triplet of the pixel at (`x`, `y`)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.edge || y >= self.edge {
            return None;
        }
        let idx = (y as usize * self.edge as usize + x as usize) * RGB_CHANNELS;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }
}
