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
use crate::preprocess;

const NAME: &str = "DeepLab v3 513 CPU";
const INPUT_SHAPE: [usize; 4] = [1, 513, 513, 3];
const OUTPUT_SHAPE: [usize; 3] = [1, 513, 513];

/// CPU-oriented DeepLab v3: raw byte NHWC input (no normalization), and the
/// model itself emits a per-pixel integer class id, so post-processing is a
/// palette lookup without any argmax.
pub struct DeepLabV3Cpu {
    model_path: PathBuf,
    state: Option<State>,
}

struct State {
    session: Session,
    input_name: String,
    output_name: String,
    input: Array4<u8>,
    scratch_mask: RgbImage,
}

impl DeepLabV3Cpu {
    pub const fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            state: None,
        }
    }
}

impl SegmentationBackend for DeepLabV3Cpu {
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
        preprocess::fill_byte_hwc(&resized, state.input.index_axis_mut(Axis(0), 0))?;

        let compute = Instant::now();
        let outputs = state.session.run(
            ort::inputs![state.input_name.as_str() => TensorRef::from_array_view(&state.input)?],
        )?;
        let ids = outputs[state.output_name.as_str()]
            .try_extract_array::<i64>()?
            .into_dimensionality::<Ix3>()?;
        let latency_ms = compute.elapsed().as_millis() as u64;

        // Already-argmaxed ids are not bounded by construction the way score
        // argmax is, so the frame's id range is checked before colorizing.
        let (min_id, max_id) = ids
            .iter()
            .fold((i64::MAX, i64::MIN), |(lo, hi), &id| (lo.min(id), hi.max(id)));
        postprocess::validate_class_id(min_id, NAME)?;
        postprocess::validate_class_id(max_id, NAME)?;

        postprocess::colorize_into(&mut state.scratch_mask, |x, y| {
            ids[[0, y as usize, x as usize]] as usize
        });
        let mask = postprocess::upscale_mask(&state.scratch_mask, original_width, original_height);

        let overhead = started.elapsed().as_millis() as u64 - latency_ms;
        eprintln!("{}: pre and post processing took {} ms", NAME, overhead);
        Ok(SegmentationResult { mask, latency_ms })
    }
}
