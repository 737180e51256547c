use super::{BackendOptions, InferenceBackend, ModelShape, OutputVector};
use crate::error::{InferenceError, LoadError};
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::{Outlet, TensorElementType, TensorRef},
};
use preprocess::InputTensor;
use std::path::Path;

/// Quantized classifier exported to ONNX, run on ONNX Runtime's CPU provider.
pub struct OrtBackend {
    session: Session,
    shape: ModelShape,
}

fn model_error(e: impl std::fmt::Display) -> LoadError {
    LoadError::Model(e.to_string())
}

fn backend_error(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::Backend(e.to_string())
}

/// Dimensions of the single u8 tensor behind `outlets`.
fn u8_tensor_dims<'a>(which: &str, outlets: &'a [Outlet]) -> Result<&'a [i64], LoadError> {
    let [outlet] = outlets else {
        return Err(LoadError::Model(format!(
            "expected exactly one {which}, model has {}",
            outlets.len()
        )));
    };

    let dtype = outlet.dtype();
    match (dtype.tensor_type(), dtype.tensor_shape()) {
        (Some(TensorElementType::Uint8), Some(shape)) => Ok(&shape[..]),
        (ty, _) => Err(LoadError::Model(format!(
            "{which} '{}' must be a uint8 tensor, got {:?}",
            outlet.name(),
            ty
        ))),
    }
}

impl InferenceBackend for OrtBackend {
    fn load_model(path: &Path, options: BackendOptions) -> Result<Self, LoadError> {
        if !path.is_file() {
            return Err(LoadError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "model file not found"),
            ));
        }

        tracing::info!(
            intra_threads = options.intra_threads,
            "Initializing ONNX Runtime with CPU execution provider"
        );

        let session = Session::builder()
            .map_err(model_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(model_error)?
            .with_intra_threads(options.intra_threads)
            .map_err(model_error)?
            .commit_from_file(path)
            .map_err(model_error)?;

        let shape = ModelShape::from_dims(
            u8_tensor_dims("input", session.inputs())?,
            u8_tensor_dims("output", session.outputs())?,
        )?;

        tracing::info!(
            input_edge = shape.input_edge,
            num_classes = shape.num_classes,
            "Model loaded from {}",
            path.display()
        );
        Ok(Self { session, shape })
    }

    fn declared_shape(&self) -> ModelShape {
        self.shape
    }

    fn infer(&mut self, input: &InputTensor) -> Result<OutputVector, InferenceError> {
        let view = input.view().map_err(backend_error)?;

        let outputs = self
            .session
            .run(ort::inputs![
                TensorRef::from_array_view(view.into_dyn()).map_err(backend_error)?
            ])
            .map_err(backend_error)?;

        let scores = outputs[0]
            .try_extract_array::<u8>()
            .map_err(backend_error)?;

        Ok(OutputVector::new(scores.iter().copied().collect()))
    }
}
