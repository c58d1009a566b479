use crate::error::OcrError;
use image::DynamicImage;

/// Reduce the image to a single luminance channel.
/// Accepts any incoming color mode; every later step assumes this has run.
pub fn apply(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    Ok(DynamicImage::ImageLuma8(image.to_luma8()))
}
