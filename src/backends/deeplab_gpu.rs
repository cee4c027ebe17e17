use std::path::PathBuf;
use std::time::Instant;

use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::prelude::*;
use ort::execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider};
use ort::session::Session;
use ort::value::TensorRef;

use crate::backend::{self, SegmentationBackend, SegmentationResult};
use crate::backends;
use crate::errors::Result;
use crate::postprocess;
use crate::preprocess::{self, Normalization};

const NAME: &str = "DeepLab v3 257 GPU";
const INPUT_SHAPE: [usize; 4] = [1, 257, 257, 3];
const OUTPUT_SHAPE: [usize; 4] = [1, 257, 257, 21];

/// Symmetric 128/128 normalization in the 0-255 domain; this constant pair
/// belongs to this variant alone.
const NORMALIZATION: Normalization = Normalization::MeanStd {
    mean: [128.0; 3],
    std: [128.0; 3],
    scale: 1.0,
};

/// GPU-oriented DeepLab v3: float32 NHWC input, per-pixel vector of 21 class
/// scores out, argmaxed over the trailing class dimension.
pub struct DeepLabV3Gpu {
    model_path: PathBuf,
    device_id: i32,
    state: Option<State>,
}

struct State {
    session: Session,
    input_name: String,
    output_name: String,
    input: Array4<f32>,
    scratch_mask: RgbImage,
}

impl DeepLabV3Gpu {
    pub const fn new(model_path: PathBuf, device_id: i32) -> Self {
        Self {
            model_path,
            device_id,
            state: None,
        }
    }
}

impl SegmentationBackend for DeepLabV3Gpu {
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
            vec![
                TensorRTExecutionProvider::default()
                    .with_device_id(self.device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(self.device_id)
                    .build(),
            ],
            &INPUT_SHAPE,
            &OUTPUT_SHAPE,
        )?;
        self.state = Some(State {
            session: loaded.session,
            input_name: loaded.input_name,
            output_name: loaded.output_name,
            input: Array4::zeros((1, INPUT_SHAPE[1], INPUT_SHAPE[2], INPUT_SHAPE[3])),
            scratch_mask: RgbImage::new(OUTPUT_SHAPE[2] as u32, OUTPUT_SHAPE[1] as u32),
        });
        Ok(())
    }

    fn process(&mut self, image: &DynamicImage) -> Result<SegmentationResult> {
        let state = self.state.as_mut().ok_or_else(|| backend::uninitialized(NAME))?;
        let started = Instant::now();
        let (original_width, original_height) = image.dimensions();

        let resized =
            preprocess::resize_for_input(image, INPUT_SHAPE[2] as u32, INPUT_SHAPE[1] as u32)?;
        preprocess::fill_float_hwc(
            &resized,
            &NORMALIZATION,
            state.input.index_axis_mut(Axis(0), 0),
        )?;

        let compute = Instant::now();
        let outputs = state.session.run(
            ort::inputs![state.input_name.as_str() => TensorRef::from_array_view(&state.input)?],
        )?;
        let scores = outputs[state.output_name.as_str()]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix4>()?;
        let latency_ms = compute.elapsed().as_millis() as u64;

        // Channel-last layout: the 21 class scores for pixel (x, y) live in
        // the trailing axis at [0, y, x].
        postprocess::colorize_into(&mut state.scratch_mask, |x, y| {
            postprocess::argmax_scores(scores.slice(s![0, y as usize, x as usize, ..]))
        });
        let mask = postprocess::upscale_mask(&state.scratch_mask, original_width, original_height);

        let overhead = started.elapsed().as_millis() as u64 - latency_ms;
        eprintln!("{}: pre and post processing took {} ms", NAME, overhead);
        Ok(SegmentationResult { mask, latency_ms })
    }
}
