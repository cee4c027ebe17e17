use image::{Rgb, RgbImage};

use crate::errors::{Result, VocSegError};

/// Average two channel values with integer division, matching a 50%-opacity
/// composite of both layers.
pub const fn mix_channels(a: u8, b: u8) -> u8 {
    ((a as u16 + b as u16) / 2) as u8
}

/// Alpha-blend the original photo and its segmentation mask into one
/// visualization image.
///
/// Both inputs must share dimensions; the output is fully opaque.
pub fn blend_images(background: &RgbImage, foreground: &RgbImage) -> Result<RgbImage> {
    if background.dimensions() != foreground.dimensions() {
        return Err(VocSegError::Validation {
            field: "blend inputs".to_string(),
            reason: format!(
                "dimensions differ: {:?} vs {:?}",
                background.dimensions(),
                foreground.dimensions()
            ),
        });
    }
    let (width, height) = background.dimensions();
    let mut result = RgbImage::new(width, height);
    for (x, y, out) in result.enumerate_pixels_mut() {
        let bg = background.get_pixel(x, y);
        let fg = foreground.get_pixel(x, y);
        *out = Rgb([
            mix_channels(bg[0], fg[0]),
            mix_channels(bg[1], fg[1]),
            mix_channels(bg[2], fg[2]),
        ]);
    }
    Ok(result)
}
