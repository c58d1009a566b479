use crate::error::OcrError;
use image::{imageops::FilterType, DynamicImage};

/// Resize both dimensions by an integer factor with a Lanczos filter.
/// A factor of 1 (or 0) returns the image unchanged.
pub fn apply(image: &DynamicImage, factor: u32) -> Result<DynamicImage, OcrError> {
    if factor <= 1 {
        return Ok(image.clone());
    }

    Ok(image.resize_exact(
        image.width() * factor,
        image.height() * factor,
        FilterType::Lanczos3,
    ))
}
