use crate::backend::{BackendOptions, InferenceBackend, ModelShape, OutputVector};
use crate::error::{InferenceError, LoadError};
use preprocess::InputTensor;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Handle to a loaded model.
///
/// The backend sits behind a mutex: `run` calls are serialized, and `close`
/// waits for an in-flight `run` before releasing the model. Once closed the
/// slot stays empty and every later `run` fails with `InferenceError::Closed`.
pub struct InferenceEngine {
    backend: Mutex<Option<Box<dyn InferenceBackend>>>,
    shape: ModelShape,
}

impl InferenceEngine {
    pub fn open<B: InferenceBackend + 'static>(
        model_path: impl AsRef<Path>,
        options: BackendOptions,
    ) -> Result<Self, LoadError> {
        let model_path = model_path.as_ref();
        tracing::info!(path = %model_path.display(), "Loading inference model");

        let backend = B::load_model(model_path, options)?;
        Ok(Self::from_backend(backend))
    }

    /// Wrap a loaded backend; the engine's shape is what the model declares.
    pub fn from_backend(backend: impl InferenceBackend + 'static) -> Self {
        let shape = backend.declared_shape();
        Self {
            backend: Mutex::new(Some(Box::new(backend))),
            shape,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn InferenceBackend>>> {
        // A panic inside a backend leaves the Option itself intact.
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn shape(&self) -> ModelShape {
        self.shape
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    pub fn run(&self, input: &InputTensor) -> Result<OutputVector, InferenceError> {
        let expected = self.shape.input_len();
        if input.len() != expected {
            return Err(InferenceError::ShapeMismatch {
                expected,
                actual: input.len(),
            });
        }

        let mut guard = self.lock();
        let backend = guard.as_mut().ok_or(InferenceError::Closed)?;
        let output = backend.infer(input)?;

        if output.len() != self.shape.num_classes {
            return Err(InferenceError::ShapeMismatch {
                expected: self.shape.num_classes,
                actual: output.len(),
            });
        }

        Ok(output)
    }

    /// Release the model. Idempotent.
    pub fn close(&self) {
        if self.lock().take().is_some() {
            tracing::info!("Inference engine closed");
        }
    }
}

impl Drop for InferenceEngine {
    fn drop(&mut self) {
        self.close();
    }
}
