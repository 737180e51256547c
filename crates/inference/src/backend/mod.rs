use crate::error::{InferenceError, LoadError};
use preprocess::InputTensor;
use std::path::Path;

#[cfg(feature = "ort-backend")]
pub mod ort;

/// Fixed shape the classifier is expected to declare: one NHWC u8 input of
/// `[1, input_edge, input_edge, 3]` and one u8 output of `[1, num_classes]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelShape {
    pub input_edge: u32,
    pub num_classes: usize,
}

impl ModelShape {
    pub fn new(input_edge: u32, num_classes: usize) -> Self {
        Self {
            input_edge,
            num_classes,
        }
    }

    pub fn input_len(&self) -> usize {
        InputTensor::byte_len(self.input_edge)
    }

    /// Read the shape from a model's declared input and output dimensions.
    ///
    /// The input must be `[1, e, e, 3]` and the output `[1, n]`; a batch of
    /// `-1` (dynamic) is accepted, any other dynamic or zero dimension is not.
    pub fn from_dims(input: &[i64], output: &[i64]) -> Result<Self, LoadError> {
        let input_edge = match input {
            [batch, h, w, 3] if is_single_batch(*batch) && h == w && *h > 0 => {
                u32::try_from(*h).map_err(|_| model_dims_error("input", input))?
            }
            _ => return Err(model_dims_error("input", input)),
        };

        let num_classes = match output {
            [batch, n] if is_single_batch(*batch) && *n > 0 => {
                usize::try_from(*n).map_err(|_| model_dims_error("output", output))?
            }
            _ => return Err(model_dims_error("output", output)),
        };

        Ok(Self::new(input_edge, num_classes))
    }
}

fn is_single_batch(dim: i64) -> bool {
    dim == 1 || dim == -1
}

fn model_dims_error(which: &str, dims: &[i64]) -> LoadError {
    let expected = if which == "input" {
        "[1, e, e, 3]"
    } else {
        "[1, n]"
    };
    LoadError::Model(format!("{which} declares {dims:?}, expected {expected}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendOptions {
    pub intra_threads: usize,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self { intra_threads: 2 }
    }
}

pub trait InferenceBackend: Send {
    fn load_model(path: &Path, options: BackendOptions) -> Result<Self, LoadError>
    where
        Self: Sized;

    /// Input edge and output width as declared by the loaded model.
    fn declared_shape(&self) -> ModelShape;

    /// Run one forward pass. Callers guarantee exclusive access.
    fn infer(&mut self, input: &InputTensor) -> Result<OutputVector, InferenceError>;
}

/// Raw classifier output: one quantized confidence byte per class.
///
/// Assumes zero-point 0 and scale 1/255, so `v` maps to `v / 255.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputVector(Vec<u8>);

impl OutputVector {
    pub fn new(scores: Vec<u8>) -> Self {
        Self(scores)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn confidence(&self, index: usize) -> Option<f32> {
        self.0.get(index).map(|&v| dequantize(v))
    }
}

impl From<Vec<u8>> for OutputVector {
    fn from(scores: Vec<u8>) -> Self {
        Self(scores)
    }
}

pub fn dequantize(value: u8) -> f32 {
    value as f32 / 255.0
}
