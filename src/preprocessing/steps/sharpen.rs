use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::filter3x3;

/// Fixed boost factor; 1.0 leaves the image unchanged, values above push
/// each pixel away from its smoothed neighborhood.
const SHARPNESS_FACTOR: f32 = 2.0;

/// Center-weighted 3x3 smoothing kernel (weights 1 around a center of 5,
/// normalized by 13).
const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    5.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
];

/// Sharpness boost: blend the image away from its smoothed copy so character
/// edges stand out from the surrounding paper.
pub fn apply(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    let smoothed: GrayImage = filter3x3(&gray, &SMOOTH_KERNEL);

    let sharpened = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let original = f32::from(gray.get_pixel(x, y).0[0]);
        let smooth = f32::from(smoothed.get_pixel(x, y).0[0]);
        let value = original + (original - smooth) * (SHARPNESS_FACTOR - 1.0);
        Luma([value.clamp(0.0, 255.0) as u8])
    });

    Ok(DynamicImage::ImageLuma8(sharpened))
}
