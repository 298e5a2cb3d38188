//! Synthetic camera frames

use image::{DynamicImage, RgbImage};

/// Pixel layouts a synthetic source can deliver, mimicking the variety of
/// native camera formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntheticLayout {
    #[default]
    Rgb8,
    Rgba8,
    Luma8,
}

impl SyntheticLayout {
    /// Re-express an RGB frame in this layout
    pub fn apply(&self, frame: RgbImage) -> DynamicImage {
        let image = DynamicImage::ImageRgb8(frame);
        match self {
            SyntheticLayout::Rgb8 => image,
            SyntheticLayout::Rgba8 => DynamicImage::ImageRgba8(image.to_rgba8()),
            SyntheticLayout::Luma8 => DynamicImage::ImageLuma8(image.to_luma8()),
        }
    }
}

/// Gradient frame whose content shifts with `frame_number`, so consecutive
/// frames differ the way real footage does
pub fn synthetic_frame(frame_number: u64, width: u32, height: u32) -> RgbImage {
    let base = (frame_number % 256) as u8;
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            base.wrapping_add((x % 256) as u8),
            base.wrapping_add((y % 256) as u8),
            base.wrapping_add(((x + y) % 256) as u8),
        ])
    })
}
