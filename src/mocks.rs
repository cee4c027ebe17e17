use image::{DynamicImage, GenericImageView, RgbImage};

use crate::backend::{self, SegmentationBackend, SegmentationResult};
use crate::errors::{Result, VocSegError};
use crate::labels;

const MOCK_INPUT_SHAPE: [usize; 4] = [1, 8, 8, 3];
const MOCK_OUTPUT_SHAPE: [usize; 4] = [1, 8, 8, 21];

/// Deterministic backend double implementing the full contract without a
/// model runtime: fills the mask with one palette color and replays scripted
/// latencies, cycling when calls outnumber the script.
pub struct MockBackend {
    name: String,
    fill_class: usize,
    latencies: Vec<u64>,
    fail_on_calls: Vec<usize>,
    calls: usize,
    initialized: bool,
}

impl MockBackend {
    pub fn new(name: &str, fill_class: usize, latencies: Vec<u64>) -> Self {
        assert!(fill_class < labels::NUM_CLASSES);
        Self {
            name: name.to_string(),
            fill_class,
            latencies,
            fail_on_calls: Vec::new(),
            calls: 0,
            initialized: false,
        }
    }

    /// Script `process` failures by zero-based call index (warm-up included).
    pub fn failing_on(mut self, calls: Vec<usize>) -> Self {
        self.fail_on_calls = calls;
        self
    }

    pub const fn calls(&self) -> usize {
        self.calls
    }
}

impl SegmentationBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_shape(&self) -> &[usize] {
        &MOCK_INPUT_SHAPE
    }

    fn output_shape(&self) -> &[usize] {
        &MOCK_OUTPUT_SHAPE
    }

    fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Err(backend::already_initialized(&self.name));
        }
        self.initialized = true;
        Ok(())
    }

    fn process(&mut self, image: &DynamicImage) -> Result<SegmentationResult> {
        if !self.initialized {
            return Err(backend::uninitialized(&self.name));
        }
        let call = self.calls;
        self.calls += 1;
        if self.fail_on_calls.contains(&call) {
            return Err(VocSegError::Model {
                backend: self.name.clone(),
                operation: format!("scripted failure on call {}", call),
                source: Box::new(std::io::Error::other("mock inference failure")),
            });
        }
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(VocSegError::Validation {
                field: "input image".to_string(),
                reason: format!("has degenerate dimensions {}x{}", width, height),
            });
        }
        let mask = RgbImage::from_pixel(width, height, labels::color_of(self.fill_class));
        let latency_ms = if self.latencies.is_empty() {
            0
        } else {
            self.latencies[call % self.latencies.len()]
        };
        Ok(SegmentationResult { mask, latency_ms })
    }
}

/// Backend whose weights never load; used to exercise initialization failure
/// isolation.
pub struct FailingBackend {
    name: String,
}

impl FailingBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl SegmentationBackend for FailingBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_shape(&self) -> &[usize] {
        &MOCK_INPUT_SHAPE
    }

    fn output_shape(&self) -> &[usize] {
        &MOCK_OUTPUT_SHAPE
    }

    fn initialize(&mut self) -> Result<()> {
        Err(VocSegError::Model {
            backend: self.name.clone(),
            operation: "loading weights".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "weights unavailable",
            )),
        })
    }

    fn process(&mut self, _image: &DynamicImage) -> Result<SegmentationResult> {
        Err(backend::uninitialized(&self.name))
    }
}
