use crate::error::OcrError;
use image::DynamicImage;
use imageproc::filter::median_filter;

/// 3x3 median filter. Kills salt-and-pepper speckle without softening the
/// character edges a blur would smear.
pub fn apply(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    let denoised = median_filter(&gray, 1, 1);
    Ok(DynamicImage::ImageLuma8(denoised))
}
