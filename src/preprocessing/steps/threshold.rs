use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};

/// Sauvola window size in pixels.
const WINDOW: i64 = 15;
/// Sauvola sensitivity.
const K: f64 = 0.2;
/// Dynamic range of the standard deviation for 8-bit input.
const R: f64 = 128.0;

/// Adaptive (locally weighted) binarization.
///
/// Each pixel is compared against a threshold derived from the mean and
/// standard deviation of its surrounding window, so unevenly lit regions do
/// not blow out to solid black or white the way a global threshold would.
pub fn apply(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let gray = image.to_luma8();
    Ok(DynamicImage::ImageLuma8(binarize_sauvola(&gray)))
}

fn binarize_sauvola(img: &GrayImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let stats = WindowStats::build(img);
    let half = WINDOW / 2;

    GrayImage::from_fn(width, height, |x, y| {
        let x0 = (i64::from(x) - half).max(0) as u32;
        let y0 = (i64::from(y) - half).max(0) as u32;
        let x1 = (i64::from(x) + half).min(i64::from(width) - 1) as u32;
        let y1 = (i64::from(y) + half).min(i64::from(height) - 1) as u32;

        let (mean, std_dev) = stats.mean_std(x0, y0, x1, y1);
        let threshold = mean * (1.0 + K * (std_dev / R - 1.0));

        if f64::from(img.get_pixel(x, y).0[0]) > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Integral images over pixel values and their squares, for O(1) window
/// mean/deviation queries.
struct WindowStats {
    stride: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl WindowStats {
    fn build(img: &GrayImage) -> Self {
        let (width, height) = img.dimensions();
        let stride = width as usize + 1;
        let mut sum = vec![0.0; stride * (height as usize + 1)];
        let mut sum_sq = vec![0.0; stride * (height as usize + 1)];

        for y in 0..height as usize {
            for x in 0..width as usize {
                let v = f64::from(img.get_pixel(x as u32, y as u32).0[0]);
                let idx = (y + 1) * stride + (x + 1);
                sum[idx] = v + sum[idx - 1] + sum[idx - stride] - sum[idx - stride - 1];
                sum_sq[idx] =
                    v * v + sum_sq[idx - 1] + sum_sq[idx - stride] - sum_sq[idx - stride - 1];
            }
        }

        Self {
            stride,
            sum,
            sum_sq,
        }
    }

    /// Mean and standard deviation over the inclusive rectangle
    /// (x0, y0)..=(x1, y1).
    fn mean_std(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> (f64, f64) {
        let (x0, y0) = (x0 as usize, y0 as usize);
        let (x1, y1) = (x1 as usize + 1, y1 as usize + 1);
        let area = ((x1 - x0) * (y1 - y0)) as f64;

        let rect = |grid: &[f64]| {
            grid[y1 * self.stride + x1] - grid[y0 * self.stride + x1]
                - grid[y1 * self.stride + x0]
                + grid[y0 * self.stride + x0]
        };

        let mean = rect(&self.sum) / area;
        let variance = rect(&self.sum_sq) / area - mean * mean;
        (mean, variance.max(0.0).sqrt())
    }
}
