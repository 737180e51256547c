pub mod config;
pub mod cpu;
pub mod error;
pub mod tensor;

use schema::RawFrame;

pub use config::DEFAULT_INPUT_EDGE;
pub use cpu::CpuPreProcessor;
pub use error::PreprocessError;
pub use tensor::InputTensor;

/// Trait for frame preprocessing implementations
pub trait Preprocess {
    /// Convert a camera frame into the model's input tensor.
    ///
    /// Frames with a zero dimension or an inconsistent pixel buffer are
    /// rejected rather than padded.
    fn preprocess(&mut self, frame: &RawFrame) -> Result<InputTensor, PreprocessError>;

    /// Edge of the square input this preprocessor targets
    fn input_edge(&self) -> u32;
}

/// One-shot preprocessing of `frame` to an `edge` x `edge` tensor.
///
/// Hot loops should keep a `CpuPreProcessor` around instead so the resizer
/// and its scratch image are reused between frames.
pub fn preprocess(frame: &RawFrame, edge: u32) -> Result<InputTensor, PreprocessError> {
    CpuPreProcessor::new(edge).preprocess(frame)
}
