use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, RgbImage};
use ndarray::prelude::*;
use ndarray::Zip;
use nshare::AsNdarray3;

use crate::errors::{Result, VocSegError};

/// Per-channel normalization scheme of a backend's input tensor.
///
/// The constants are part of each backend's numeric contract and are never
/// shared between backends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Channel bytes pass through unchanged (byte-tensor backends).
    Passthrough,
    /// `(value / scale - mean_c) / std_c` per channel `c`.
    ///
    /// `scale` is 1.0 for backends normalizing in the 0-255 domain and 255.0
    /// for backends expecting unit-range input before mean/std.
    MeanStd {
        mean: [f32; 3],
        std: [f32; 3],
        scale: f32,
    },
}

impl Normalization {
    pub fn apply(&self, value: u8, channel: usize) -> f32 {
        match self {
            Self::Passthrough => f32::from(value),
            Self::MeanStd { mean, std, scale } => {
                (f32::from(value) / scale - mean[channel]) / std[channel]
            }
        }
    }
}

/// Resize an arbitrary-size image to a backend's declared input resolution.
///
/// Nearest-neighbor sampling is deliberate: it is fast, and preserving hard
/// label edges matters more here than photometric smoothness.
pub fn resize_for_input(image: &DynamicImage, width: u32, height: u32) -> Result<RgbImage> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(VocSegError::Validation {
            field: "input image".to_string(),
            reason: format!("has degenerate dimensions {}x{}", w, h),
        });
    }
    let rgb = image.to_rgb8();
    Ok(imageops::resize(&rgb, width, height, FilterType::Nearest))
}

/// Fill a pre-allocated `(H, W, 3)` float tensor from a resized image,
/// applying the backend's normalization. Channel order is R, G, B.
pub fn fill_float_hwc(
    image: &RgbImage,
    normalization: &Normalization,
    mut out: ArrayViewMut3<f32>,
) -> Result<()> {
    check_hwc_shape(image, out.shape())?;
    let hwc = image.as_ndarray3().permuted_axes([1, 2, 0]);
    Zip::indexed(&mut out).for_each(|(y, x, c), v| {
        *v = normalization.apply(hwc[[y, x, c]], c);
    });
    Ok(())
}

/// Fill a pre-allocated `(H, W, 3)` byte tensor from a resized image.
/// Channel values pass through as truncated 8-bit values.
pub fn fill_byte_hwc(image: &RgbImage, mut out: ArrayViewMut3<u8>) -> Result<()> {
    check_hwc_shape(image, out.shape())?;
    let hwc = image.as_ndarray3().permuted_axes([1, 2, 0]);
    out.assign(&hwc);
    Ok(())
}

fn check_hwc_shape(image: &RgbImage, shape: &[usize]) -> Result<()> {
    let expected = [image.height() as usize, image.width() as usize, 3];
    if shape != expected {
        return Err(VocSegError::Validation {
            field: "input tensor".to_string(),
            reason: format!("shape {:?} does not match image layout {:?}", shape, expected),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_resize_reaches_declared_resolution() {
        let img = gradient_image(640, 480);
        let resized = resize_for_input(&img, 257, 257).unwrap();
        assert_eq!(resized.dimensions(), (257, 257));
    }

    #[test]
    fn test_degenerate_image_rejected() {
        let img = DynamicImage::new_rgb8(0, 10);
        let err = resize_for_input(&img, 257, 257).unwrap_err();
        assert!(matches!(err, VocSegError::Validation { .. }));
    }

    #[test]
    fn test_symmetric_normalization() {
        let norm = Normalization::MeanStd {
            mean: [128.0; 3],
            std: [128.0; 3],
            scale: 1.0,
        };
        assert_eq!(norm.apply(128, 0), 0.0);
        assert_eq!(norm.apply(0, 1), -1.0);
        assert!((norm.apply(255, 2) - 0.992_187_5).abs() < 1e-6);
    }

    #[test]
    fn test_imagenet_normalization() {
        let norm = Normalization::MeanStd {
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
            scale: 255.0,
        };
        // 255/255 = 1.0 -> (1.0 - 0.485) / 0.229
        assert!((norm.apply(255, 0) - (1.0 - 0.485) / 0.229).abs() < 1e-5);
        assert!((norm.apply(0, 2) - (-0.406 / 0.225)).abs() < 1e-5);
    }

    #[test]
    fn test_float_tensor_layout_is_rgb_row_major() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([10, 20, 30]));
        let mut tensor = Array3::<f32>::zeros((2, 2, 3));
        fill_float_hwc(&img, &Normalization::Passthrough, tensor.view_mut()).unwrap();
        assert_eq!(tensor[[0, 1, 0]], 10.0);
        assert_eq!(tensor[[0, 1, 1]], 20.0);
        assert_eq!(tensor[[0, 1, 2]], 30.0);
        assert_eq!(tensor[[0, 0, 0]], 0.0);
    }

    #[test]
    fn test_byte_tensor_passthrough() {
        let img = RgbImage::from_pixel(3, 2, Rgb([7, 8, 9]));
        let mut tensor = Array3::<u8>::zeros((2, 3, 3));
        fill_byte_hwc(&img, tensor.view_mut()).unwrap();
        assert!(tensor
            .exact_chunks((1, 1, 3))
            .into_iter()
            .all(|px| px[[0, 0, 0]] == 7 && px[[0, 0, 1]] == 8 && px[[0, 0, 2]] == 9));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let img = RgbImage::new(4, 4);
        let mut tensor = Array3::<u8>::zeros((2, 3, 3));
        assert!(fill_byte_hwc(&img, tensor.view_mut()).is_err());
    }
}
