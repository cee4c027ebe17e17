use std::path::Path;

use image::{DynamicImage, RgbImage};

use crate::backends::{DeepLabV3Cpu, DeepLabV3Gpu, UNetCpu};
use crate::errors::{Result, VocSegError};

/// Output of one [`SegmentationBackend::process`] call.
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    /// Color-coded class mask at the *original* input resolution, never the
    /// backend's internal model resolution.
    pub mask: RgbImage,
    /// Wall-clock milliseconds spent strictly inside the model's feed, run
    /// and fetch. Resize, normalize, colorize and upscale work is excluded.
    pub latency_ms: u64,
}

/// One interchangeable segmentation model plus its numeric contract.
///
/// Implementations own their loaded session and pre-allocated scratch
/// buffers; `process` overwrites that scratch state on every call, which is
/// why it takes `&mut self` - one inference per backend instance may be in
/// flight at a time. Separate instances are fully independent.
///
/// Lifecycle: constructed uninitialized, `initialize` exactly once, then any
/// number of `process` calls.
pub trait SegmentationBackend {
    /// Human-readable display name, also used for selection.
    fn name(&self) -> &str;

    /// Declared input tensor shape, row-major, channel-last.
    fn input_shape(&self) -> &[usize];

    /// Declared output tensor shape.
    fn output_shape(&self) -> &[usize];

    /// Load the model weights into an executable session, validate the
    /// session's reported tensor shapes against the declared ones, and
    /// allocate all scratch buffers.
    ///
    /// A failure is fatal for this backend only; other backends stay usable.
    /// Calling it a second time is an error.
    fn initialize(&mut self) -> Result<()>;

    /// Segment one image, blocking the caller for the full duration.
    ///
    /// Returns an error if `initialize` has not completed or the image has a
    /// zero dimension.
    fn process(&mut self, image: &DynamicImage) -> Result<SegmentationResult>;
}

/// Error for `process` before `initialize`, shared by all variants.
pub(crate) fn uninitialized(name: &str) -> VocSegError {
    VocSegError::Validation {
        field: name.to_string(),
        reason: "process() called before initialize()".to_string(),
    }
}

/// Error for a second `initialize` call, shared by all variants.
pub(crate) fn already_initialized(name: &str) -> VocSegError {
    VocSegError::Validation {
        field: name.to_string(),
        reason: "initialize() called more than once".to_string(),
    }
}

/// Compare a session-reported tensor shape against a backend's declared one.
///
/// A mismatch means the weight file does not implement the declared numeric
/// contract, which is an initialization defect rather than a runtime
/// condition to recover from. Dynamic dimensions (reported as -1) are
/// accepted.
pub(crate) fn validate_shape(
    backend: &str,
    tensor: &str,
    reported: &[i64],
    declared: &[usize],
) -> Result<()> {
    let compatible = reported.len() == declared.len()
        && reported
            .iter()
            .zip(declared)
            .all(|(&r, &d)| r < 0 || r as usize == d);
    if !compatible {
        return Err(VocSegError::Model {
            backend: backend.to_string(),
            operation: format!(
                "{} shape validation: model reports {:?}, backend declares {:?}",
                tensor, reported, declared
            ),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "declared and actual tensor shapes differ",
            )),
        });
    }
    Ok(())
}

/// Build the fixed, ordered list of backend variants from conventional weight
/// file names under `model_dir`. None of them is initialized yet.
pub fn available_backends(model_dir: &Path, device_id: i32) -> Vec<Box<dyn SegmentationBackend>> {
    vec![
        Box::new(DeepLabV3Gpu::new(
            model_dir.join("deeplabv3_257_mv_gpu.onnx"),
            device_id,
        )),
        Box::new(DeepLabV3Cpu::new(model_dir.join("deeplabv3_513_cpu.onnx"))),
        Box::new(UNetCpu::new(model_dir.join("unet_256.onnx"))),
    ]
}

/// Initialize every backend, dropping the ones whose weights fail to load.
///
/// One backend failing must not take the others down; the failure is logged
/// and the backend excluded from the returned list.
pub fn initialize_backends(
    mut backends: Vec<Box<dyn SegmentationBackend>>,
) -> Vec<Box<dyn SegmentationBackend>> {
    backends.retain_mut(|backend| match backend.initialize() {
        Ok(()) => true,
        Err(e) => {
            eprintln!("{}: disabled after initialization failure: {}", backend.name(), e);
            false
        }
    });
    backends
}

/// Select a backend by display name, or by position in the ordered list when
/// the selector parses as an index.
pub fn select_backend<'a>(
    backends: &'a mut [Box<dyn SegmentationBackend>],
    selector: &str,
) -> Result<&'a mut Box<dyn SegmentationBackend>> {
    let position = match selector.parse::<usize>() {
        Ok(index) => Some(index).filter(|&i| i < backends.len()),
        Err(_) => backends.iter().position(|b| b.name() == selector),
    };
    match position {
        Some(index) => Ok(&mut backends[index]),
        None => {
            let available = backends
                .iter()
                .map(|b| b.name().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(VocSegError::Configuration {
                message: format!("unknown backend {:?}; available: {}", selector, available),
            })
        }
    }
}
