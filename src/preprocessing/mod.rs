//! Image preprocessing for OCR
//!
//! Pure image-to-image transforms; nothing here touches the recognition
//! engine. Each transform takes the caller's image by reference and returns
//! a new one.

pub mod pipeline;
pub mod steps;

pub use pipeline::{binarize, enhance, upscale};
