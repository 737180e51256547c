use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Startup failure of a model or label asset. Assets are static, so these
/// are never retried.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Label file {0} contains no labels")]
    EmptyLabels(PathBuf),

    #[error("Invalid model: {0}")]
    Model(String),

    #[error("Label vocabulary has {labels} entries but the model outputs {outputs} classes")]
    VocabularyMismatch { labels: usize, outputs: usize },
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure of a single forward pass. Fatal to that call only.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Inference engine is closed")]
    Closed,

    #[error("Tensor shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Backend error: {0}")]
    Backend(String),
}
