use std::path::PathBuf;
use std::time::Instant;

use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::prelude::*;
use ort::session::Session;
use ort::value::TensorRef;

use crate::backend::{self, SegmentationBackend, SegmentationResult};
use crate::backends;
use crate::errors::Result;
use crate::postprocess;
use crate::preprocess::{self, Normalization};

const NAME: &str = "UNet 256 CPU";
const INPUT_SHAPE: [usize; 3] = [256, 256, 3];
const OUTPUT_SHAPE: [usize; 3] = [256, 256, 21];

/// ImageNet statistics over unit-range channels; this variant scales to
/// [0, 1] before subtracting, unlike the DeepLab GPU contract.
const NORMALIZATION: Normalization = Normalization::MeanStd {
    mean: [0.485, 0.456, 0.406],
    std: [0.229, 0.224, 0.225],
    scale: 255.0,
};

/// CPU-oriented UNet: float32 HWC input without a batch axis, per-pixel
/// vector of 21 class scores out. Its flattening differs from DeepLab GPU
/// (no batch axis, row index leading), so this variant reads its own layout
/// rather than assuming a universal order.
pub struct UNetCpu {
    model_path: PathBuf,
    state: Option<State>,
}

struct State {
    session: Session,
    input_name: String,
    output_name: String,
    input: Array3<f32>,
    scratch_mask: RgbImage,
}

impl UNetCpu {
    pub const fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            state: None,
        }
    }
}

impl SegmentationBackend for UNetCpu {
    fn name(&self) -> &str {
        NAME
    }

    fn input_shape(&self) -> &[usize] {
        &INPUT_SHAPE
    }

    fn output_shape(&self) -> &[usize] {
        &OUTPUT_SHAPE
    }

    fn initialize(&mut self) -> Result<()> {
        if self.state.is_some() {
            return Err(backend::already_initialized(NAME));
        }
        let loaded = backends::load_session(
            NAME,
            &self.model_path,
            vec![],
            &INPUT_SHAPE,
            &OUTPUT_SHAPE,
        )?;
        self.state = Some(State {
            session: loaded.session,
            input_name: loaded.input_name,
            output_name: loaded.output_name,
            input: Array3::zeros((INPUT_SHAPE[0], INPUT_SHAPE[1], INPUT_SHAPE[2])),
            scratch_mask: RgbImage::new(OUTPUT_SHAPE[1] as u32, OUTPUT_SHAPE[0] as u32),
        });
        Ok(())
    }

    fn process(&mut self, image: &DynamicImage) -> Result<SegmentationResult> {
        let state = self.state.as_mut().ok_or_else(|| backend::uninitialized(NAME))?;
        let started = Instant::now();
        let (original_width, original_height) = image.dimensions();

        let resized =
            preprocess::resize_for_input(image, INPUT_SHAPE[1] as u32, INPUT_SHAPE[0] as u32)?;
        preprocess::fill_float_hwc(&resized, &NORMALIZATION, state.input.view_mut())?;

        let compute = Instant::now();
        let outputs = state.session.run(
            ort::inputs![state.input_name.as_str() => TensorRef::from_array_view(&state.input)?],
        )?;
        let scores = outputs[state.output_name.as_str()]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix3>()?;
        let latency_ms = compute.elapsed().as_millis() as u64;

        // Row index leads and the class channel is innermost: pixel (x, y)
        // reads the score vector at [y, x].
        postprocess::colorize_into(&mut state.scratch_mask, |x, y| {
            postprocess::argmax_scores(scores.slice(s![y as usize, x as usize, ..]))
        });
        let mask = postprocess::upscale_mask(&state.scratch_mask, original_width, original_height);

        let overhead = started.elapsed().as_millis() as u64 - latency_ms;
        eprintln!("{}: pre and post processing took {} ms", NAME, overhead);
        Ok(SegmentationResult { mask, latency_ms })
    }
}
