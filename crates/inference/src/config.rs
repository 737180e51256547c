use crate::backend::{BackendOptions, ModelShape};
use crate::error::LoadError;
use crate::postprocessing::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_TOP_K, PostProcessor};
use preprocess::DEFAULT_INPUT_EDGE;
use std::env;
use std::path::PathBuf;

pub use common::{Environment, LogLevel};

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub environment: Environment,
    pub log_level: LogLevel,
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub input_size: u32,
    /// Expected model output width; when unset the model's own declaration
    /// is only checked against the label count.
    pub num_classes: Option<usize>,
    pub confidence_threshold: f32,
    pub top_k: usize,
    pub intra_threads: usize,
    pub otel_endpoint: Option<String>,
}

impl InferenceConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();
        let log_level = LogLevel::from_env();

        let model_path = env::var("MODEL_PATH")
            .unwrap_or_else(|_| "models/mobilenet_v1_1.0_224_quant.onnx".to_string())
            .into();

        let labels_path = env::var("LABELS_PATH")
            .unwrap_or_else(|_| "models/labels.txt".to_string())
            .into();

        let input_size = env::var("INPUT_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_INPUT_EDGE);

        let num_classes = env::var("NUM_CLASSES").ok().and_then(|s| s.parse().ok());

        let confidence_threshold = env::var("CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);

        let top_k = env::var("TOP_K")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOP_K);

        let intra_threads = env::var("INTRA_THREADS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(BackendOptions::default().intra_threads);

        let otel_endpoint = env::var("OTEL_ENDPOINT").ok().filter(|s| !s.is_empty());

        let config = Self {
            environment,
            log_level,
            model_path,
            labels_path,
            input_size,
            num_classes,
            confidence_threshold,
            top_k,
            intra_threads,
            otel_endpoint,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..1.0).contains(&self.confidence_threshold) {
            anyhow::bail!(
                "CONFIDENCE_THRESHOLD must be in [0, 1), got {}",
                self.confidence_threshold
            );
        }
        if self.top_k == 0 {
            anyhow::bail!("TOP_K must be at least 1");
        }
        if self.input_size == 0 {
            anyhow::bail!("INPUT_SIZE must be non-zero");
        }
        if self.intra_threads == 0 {
            anyhow::bail!("INTRA_THREADS must be at least 1");
        }
        Ok(())
    }

    /// Check the shape a loaded model declares against `INPUT_SIZE` and, when
    /// set, `NUM_CLASSES`.
    pub fn check_model_shape(&self, declared: ModelShape) -> Result<(), LoadError> {
        if declared.input_edge != self.input_size {
            return Err(LoadError::Model(format!(
                "model input is {0}x{0}, INPUT_SIZE is {1}",
                declared.input_edge, self.input_size
            )));
        }
        match self.num_classes {
            Some(expected) if expected != declared.num_classes => Err(LoadError::Model(format!(
                "model declares {} classes, NUM_CLASSES is {}",
                declared.num_classes, expected
            ))),
            _ => Ok(()),
        }
    }

    pub fn backend_options(&self) -> BackendOptions {
        BackendOptions {
            intra_threads: self.intra_threads,
        }
    }

    pub fn postprocessor(&self) -> PostProcessor {
        PostProcessor::new(self.confidence_threshold, self.top_k)
    }

    /// Create default configuration for testing
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            log_level: LogLevel::Debug,
            model_path: "/models/model.onnx".into(),
            labels_path: "/models/labels.txt".into(),
            input_size: DEFAULT_INPUT_EDGE,
            num_classes: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            intra_threads: 1,
            otel_endpoint: None,
        }
    }
}
