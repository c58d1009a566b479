use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

/// Gaussian radius of the blurred copy.
const RADIUS: f32 = 1.0;
/// Fraction of the difference added back (150 percent).
const AMOUNT: f32 = 1.5;
/// Differences smaller than this are left untouched, so flat paper regions
/// do not pick up amplified noise.
const THRESHOLD: f32 = 3.0;

/// Unsharp mask: subtract a blurred copy to isolate edges, then add the
/// difference back scaled by `AMOUNT`.
pub fn apply(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    let blurred = gaussian_blur_f32(&gray, RADIUS);

    let masked = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let original = f32::from(gray.get_pixel(x, y).0[0]);
        let soft = f32::from(blurred.get_pixel(x, y).0[0]);
        let diff = original - soft;
        if diff.abs() < THRESHOLD {
            Luma([original as u8])
        } else {
            Luma([(original + diff * AMOUNT).clamp(0.0, 255.0) as u8])
        }
    });

    Ok(DynamicImage::ImageLuma8(masked))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsharp_skips_flat_regions() {
        let img = GrayImage::from_pixel(16, 16, Luma([180]));

        let result = apply(&DynamicImage::ImageLuma8(img)).unwrap().to_luma8();

        assert_eq!(result.get_pixel(8, 8).0[0], 180);
    }

    #[test]
    fn test_unsharp_accentuates_edges() {
        let img = GrayImage::from_fn(24, 10, |x, _| if x < 12 { Luma([60]) } else { Luma([190]) });

        let result = apply(&DynamicImage::ImageLuma8(img)).unwrap().to_luma8();

        // The dark side of the edge gets darker, the light side lighter.
        assert!(result.get_pixel(11, 5).0[0] < 60);
        assert!(result.get_pixel(12, 5).0[0] > 190);
    }
}
