pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod labels;
pub mod logging;
pub mod overlay;
pub mod pipeline;
pub mod postprocessing;
pub mod service;

// Re-export commonly used types for convenience
pub use backend::{InferenceBackend, ModelShape, OutputVector};
pub use config::InferenceConfig;
pub use engine::InferenceEngine;
pub use error::{InferenceError, LoadError};
pub use labels::LabelVocabulary;
pub use pipeline::DetectionPipeline;
pub use postprocessing::{PostProcessor, decode};
pub use schema::DetectionResult;
pub use service::{DetectionService, DetectionServiceHandle, DetectionSink, DetectionStats};
