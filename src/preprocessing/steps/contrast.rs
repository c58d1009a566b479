use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};

/// Fixed boost factor; 1.0 leaves the image unchanged.
const CONTRAST_FACTOR: f32 = 1.5;

/// Scale each pixel's distance from the image mean by a fixed factor,
/// widening the separation between ink and paper.
pub fn apply(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    if gray.is_empty() {
        return Ok(DynamicImage::ImageLuma8(gray));
    }

    let total: u64 = gray.pixels().map(|p| u64::from(p.0[0])).sum();
    let mean = total as f32 / gray.len() as f32;

    let boosted = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = f32::from(gray.get_pixel(x, y).0[0]);
        let stretched = mean + (value - mean) * CONTRAST_FACTOR;
        Luma([stretched.clamp(0.0, 255.0) as u8])
    });

    Ok(DynamicImage::ImageLuma8(boosted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contrast_widens_spread_around_mean() {
        // Two-tone image: mean sits at 125.
        let img = GrayImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Luma([100])
            } else {
                Luma([150])
            }
        });

        let result = apply(&DynamicImage::ImageLuma8(img)).unwrap().to_luma8();

        assert!(result.get_pixel(0, 0).0[0] < 100);
        assert!(result.get_pixel(9, 0).0[0] > 150);
    }

    #[test]
    fn test_contrast_leaves_uniform_image_alone() {
        let img = GrayImage::from_pixel(10, 10, Luma([128]));

        let result = apply(&DynamicImage::ImageLuma8(img)).unwrap().to_luma8();

        assert_eq!(result.get_pixel(4, 4).0[0], 128);
    }
}
