use image::{imageops, imageops::FilterType, RgbImage};
use ndarray::prelude::*;

use crate::errors::{Result, VocSegError};
use crate::labels;

/// Index of the maximum score in a per-pixel class score vector.
///
/// Strict `>` replacement during a left-to-right scan, so exact ties keep the
/// lowest class index. Every backend routes its scores through this one
/// function to guarantee identical tie handling regardless of the variant's
/// own tensor layout.
pub fn argmax_scores(scores: ArrayView1<f32>) -> usize {
    let mut arg_max = 0;
    let mut val_max = f32::NEG_INFINITY;
    for (label, &score) in scores.iter().enumerate() {
        if score > val_max {
            arg_max = label;
            val_max = score;
        }
    }
    arg_max
}

/// Paint a pre-allocated model-resolution mask from a per-pixel class lookup.
///
/// `class_at(x, y)` must return an index below [`labels::NUM_CLASSES`]; each
/// backend is responsible for reading its own output layout inside the
/// closure.
pub fn colorize_into<F>(mask: &mut RgbImage, class_at: F)
where
    F: Fn(u32, u32) -> usize,
{
    let (width, height) = mask.dimensions();
    for y in 0..height {
        for x in 0..width {
            mask.put_pixel(x, y, labels::color_of(class_at(x, y)));
        }
    }
}

/// Reject class ids a model emitted outside the fixed palette.
///
/// Byte/id-emitting backends cannot rely on argmax bounding the index, so
/// their raw ids are validated once per frame before colorizing.
pub fn validate_class_id(raw: i64, backend: &str) -> Result<usize> {
    usize::try_from(raw)
        .ok()
        .filter(|&id| id < labels::NUM_CLASSES)
        .ok_or_else(|| VocSegError::Model {
            backend: backend.to_string(),
            operation: format!("class id {} outside the {}-label palette", raw, labels::NUM_CLASSES),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "model output out of range",
            )),
        })
}

/// Enlarge a model-resolution mask to the original image resolution.
///
/// Unlike the nearest-neighbor input downscale, the mask is enlarged for
/// display, so interpolated (Triangle) scaling is used.
pub fn upscale_mask(mask: &RgbImage, width: u32, height: u32) -> RgbImage {
    imageops::resize(mask, width, height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_argmax_picks_maximum() {
        let scores = array![0.1, 0.9, 0.3, 0.2];
        assert_eq!(argmax_scores(scores.view()), 1);
    }

    #[test]
    fn test_argmax_tie_keeps_lowest_index() {
        let scores = array![0.2, 0.7, 0.7, 0.1];
        assert_eq!(argmax_scores(scores.view()), 1);
        let all_equal = Array1::from_elem(labels::NUM_CLASSES, 0.5);
        assert_eq!(argmax_scores(all_equal.view()), 0);
    }

    #[test]
    fn test_argmax_handles_negative_scores() {
        let scores = array![-3.0, -1.5, -2.0];
        assert_eq!(argmax_scores(scores.view()), 1);
    }

    #[test]
    fn test_colorize_writes_palette_colors() {
        let mut mask = RgbImage::new(4, 2);
        colorize_into(&mut mask, |x, _| if x < 2 { 0 } else { 15 });
        assert_eq!(*mask.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*mask.get_pixel(3, 1), labels::color_of(15));
    }

    #[test]
    fn test_class_id_validation() {
        assert_eq!(validate_class_id(0, "test").unwrap(), 0);
        assert_eq!(validate_class_id(20, "test").unwrap(), 20);
        assert!(validate_class_id(21, "test").is_err());
        assert!(validate_class_id(-1, "test").is_err());
    }

    #[test]
    fn test_upscale_reaches_original_resolution() {
        let mask = RgbImage::from_pixel(8, 8, Rgb([128, 0, 0]));
        let upscaled = upscale_mask(&mask, 123, 77);
        assert_eq!(upscaled.dimensions(), (123, 77));
        // A uniform mask stays uniform through interpolation.
        assert!(upscaled.pixels().all(|p| *p == Rgb([128, 0, 0])));
    }
}
