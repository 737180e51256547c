use crate::backend::InferenceBackend;
use crate::config::InferenceConfig;
use crate::engine::InferenceEngine;
use crate::error::{InferenceError, LoadError};
use crate::labels::LabelVocabulary;
use crate::postprocessing::PostProcessor;
use preprocess::{CpuPreProcessor, Preprocess};
use schema::{DetectionResult, RawFrame};
use std::sync::Arc;

struct Ready {
    engine: Arc<InferenceEngine>,
    labels: Arc<LabelVocabulary>,
    preprocessor: CpuPreProcessor,
    postprocessor: PostProcessor,
}

/// Per-frame detector: preprocess, run the model, decode.
///
/// A pipeline whose assets failed to load is disabled and answers every frame
/// with an empty list; the capture loop never sees an error from `detect`.
pub struct DetectionPipeline {
    ready: Option<Ready>,
}

impl DetectionPipeline {
    pub fn new(
        engine: Arc<InferenceEngine>,
        labels: Arc<LabelVocabulary>,
        postprocessor: PostProcessor,
    ) -> Result<Self, LoadError> {
        let outputs = engine.shape().num_classes;
        if labels.len() != outputs {
            return Err(LoadError::VocabularyMismatch {
                labels: labels.len(),
                outputs,
            });
        }

        let preprocessor = CpuPreProcessor::new(engine.shape().input_edge);
        Ok(Self {
            ready: Some(Ready {
                engine,
                labels,
                preprocessor,
                postprocessor,
            }),
        })
    }

    pub fn disabled() -> Self {
        Self { ready: None }
    }

    /// Load labels and model from `config`. The model's declared output width
    /// must match the vocabulary.
    pub fn try_open<B: InferenceBackend + 'static>(
        config: &InferenceConfig,
    ) -> Result<Self, LoadError> {
        let labels = LabelVocabulary::load(&config.labels_path)?;
        let engine = InferenceEngine::open::<B>(&config.model_path, config.backend_options())?;
        config.check_model_shape(engine.shape())?;

        Self::new(Arc::new(engine), Arc::new(labels), config.postprocessor())
    }

    /// Like `try_open`, but a load failure yields a disabled pipeline.
    pub fn open<B: InferenceBackend + 'static>(config: &InferenceConfig) -> Self {
        match Self::try_open::<B>(config) {
            Ok(pipeline) => {
                tracing::info!("Detection pipeline ready");
                pipeline
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to load detection assets, detection disabled"
                );
                Self::disabled()
            }
        }
    }

    /// True while assets are loaded and the engine has not been closed.
    pub fn is_ready(&self) -> bool {
        self.ready.as_ref().is_some_and(|r| r.engine.is_open())
    }

    pub fn engine(&self) -> Option<Arc<InferenceEngine>> {
        self.ready.as_ref().map(|r| Arc::clone(&r.engine))
    }

    pub fn detect(&mut self, frame: &RawFrame) -> Vec<DetectionResult> {
        let Some(ready) = self.ready.as_mut() else {
            return Vec::new();
        };

        let tensor = match ready.preprocessor.preprocess(frame) {
            Ok(tensor) => tensor,
            Err(e) => {
                tracing::warn!(
                    frame_number = frame.frame_number(),
                    error = %e,
                    "Skipping frame that cannot be preprocessed"
                );
                return Vec::new();
            }
        };

        let output = {
            let _infer_span = tracing::info_span!("model_inference").entered();
            match ready.engine.run(&tensor) {
                Ok(output) => output,
                Err(InferenceError::Closed) => {
                    tracing::debug!("Inference engine closed, no detections");
                    return Vec::new();
                }
                Err(e) => {
                    tracing::error!(
                        frame_number = frame.frame_number(),
                        error = %e,
                        "Inference failed"
                    );
                    return Vec::new();
                }
            }
        };

        ready.postprocessor.decode(&output, &ready.labels)
    }

    /// Close the underlying engine. Idempotent.
    pub fn close(&self) {
        if let Some(ready) = &self.ready {
            ready.engine.close();
        }
    }
}
