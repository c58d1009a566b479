use crate::error::OcrError;
use image::DynamicImage;
use std::time::Instant;

use super::steps;

/// Grayscale, denoise, adaptively binarize, and clean up an image.
///
/// The heavy-handed variant: best for scans and photos with noise or uneven
/// lighting. Output is binary grayscale.
pub fn binarize(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let img = run_step("grayscale", image, steps::grayscale::apply)?;
    let img = run_step("denoise", &img, steps::denoise::apply)?;
    let img = run_step("threshold", &img, steps::threshold::apply)?;
    run_step("morphology", &img, steps::morphology::apply)
}

/// Grayscale an image and boost its contrast and edge definition.
///
/// The gentle variant: keeps the full tonal range, same dimensions as the
/// input.
pub fn enhance(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let img = run_step("grayscale", image, steps::grayscale::apply)?;
    let img = run_step("contrast", &img, steps::contrast::apply)?;
    let img = run_step("sharpen", &img, steps::sharpen::apply)?;
    run_step("unsharp", &img, steps::unsharp::apply)
}

/// Resize both dimensions by an integer factor with a high-quality filter.
pub fn upscale(image: &DynamicImage, factor: u32) -> Result<DynamicImage, OcrError> {
    let start = Instant::now();
    let result = steps::upscale::apply(image, factor)?;
    tracing::trace!(
        step = "upscale",
        factor,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "preprocessing step finished"
    );
    Ok(result)
}

fn run_step<F>(name: &str, image: &DynamicImage, step: F) -> Result<DynamicImage, OcrError>
where
    F: FnOnce(&DynamicImage) -> Result<DynamicImage, OcrError>,
{
    let start = Instant::now();
    let result = step(image)?;
    tracing::trace!(
        step = name,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "preprocessing step finished"
    );
    Ok(result)
}
