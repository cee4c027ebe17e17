mod deeplab_cpu;
mod deeplab_gpu;
mod unet_cpu;

pub use deeplab_cpu::DeepLabV3Cpu;
pub use deeplab_gpu::DeepLabV3Gpu;
pub use unet_cpu::UNetCpu;

use std::path::Path;

use ort::execution_providers::ExecutionProviderDispatch;
use ort::session::{builder::SessionBuilder, Session};

use crate::backend::validate_shape;
use crate::errors::{Result, VocSegError};

/// A committed session with its resolved tensor names, shape-checked against
/// the backend's declared contract.
pub(crate) struct LoadedSession {
    pub session: Session,
    pub input_name: String,
    pub output_name: String,
}

/// Build and commit an ONNX Runtime session for one backend variant.
///
/// The session's reported input/output shapes are validated against the
/// declared ones here, so a weight file that does not implement the declared
/// numeric contract fails at initialization instead of producing garbage
/// masks later.
pub(crate) fn load_session(
    backend: &str,
    model_path: &Path,
    execution_providers: Vec<ExecutionProviderDispatch>,
    input_shape: &[usize],
    output_shape: &[usize],
) -> Result<LoadedSession> {
    let model_err = |operation: &str, source: ort::Error| VocSegError::Model {
        backend: backend.to_string(),
        operation: operation.to_string(),
        source: Box::new(source),
    };

    let session = SessionBuilder::new()
        .map_err(|e| model_err("session builder", e))?
        .with_execution_providers(execution_providers)
        .map_err(|e| model_err("execution provider registration", e))?
        .with_memory_pattern(true)
        .map_err(|e| model_err("memory pattern configuration", e))?
        .commit_from_file(model_path)
        .map_err(|e| VocSegError::Model {
            backend: backend.to_string(),
            operation: format!("loading weights from {}", model_path.display()),
            source: Box::new(e),
        })?;

    let metadata_missing = |tensor: &str| VocSegError::Model {
        backend: backend.to_string(),
        operation: format!("model metadata: no {} tensor shape reported", tensor),
        source: Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "tensor shape unavailable",
        )),
    };

    let input = session
        .inputs
        .first()
        .ok_or_else(|| metadata_missing("input"))?;
    let reported = input
        .input_type
        .tensor_shape()
        .ok_or_else(|| metadata_missing("input"))?;
    validate_shape(backend, "input", reported, input_shape)?;
    let input_name = input.name.clone();

    let output = session
        .outputs
        .first()
        .ok_or_else(|| metadata_missing("output"))?;
    let reported = output
        .output_type
        .tensor_shape()
        .ok_or_else(|| metadata_missing("output"))?;
    validate_shape(backend, "output", reported, output_shape)?;
    let output_name = output.name.clone();

    Ok(LoadedSession {
        session,
        input_name,
        output_name,
    })
}
