use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the segmentation pipeline.
///
/// # Why structured errors
///
/// Each variant captures context specific to its error domain (filesystem, image processing,
/// model operations, etc.), providing detailed diagnostic information without requiring
/// callers to parse error strings. The thiserror crate generates Display implementations
/// automatically from format strings, reducing boilerplate while maintaining type safety.
#[derive(Error, Debug)]
pub enum VocSegError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (backend: {backend})")]
    ImageProcessing {
        backend: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Model error: {operation} failed (backend: {backend})")]
    Model {
        backend: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, VocSegError>;

/// Convert anyhow errors to configuration errors.
///
/// # Why this conversion exists
///
/// Some dependencies return anyhow::Error which lacks structured error information.
/// Rather than propagating the generic error type throughout the codebase, we convert
/// to our domain-specific error type at boundaries.
impl From<anyhow::Error> for VocSegError {
    fn from(err: anyhow::Error) -> Self {
        VocSegError::Configuration {
            message: err.to_string(),
        }
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Code that has context should construct VocSegError::FileSystem directly
/// with the specific path and operation; this conversion is the fallback.
impl From<std::io::Error> for VocSegError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

/// Convert image crate errors to image processing errors.
impl From<image::ImageError> for VocSegError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            backend: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert ONNX Runtime errors to model errors.
impl From<ort::Error> for VocSegError {
    fn from(err: ort::Error) -> Self {
        Self::Model {
            backend: "unknown".to_string(),
            operation: "ort operation".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert ndarray shape errors to model errors.
///
/// Shape errors occur during tensor operations which are part of model inference,
/// so they're categorized as model errors rather than a separate tensor error type.
impl From<ndarray::ShapeError> for VocSegError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Model {
            backend: "unknown".to_string(),
            operation: "tensor shape conversion".to_string(),
            source: Box::new(err),
        }
    }
}
