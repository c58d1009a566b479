//! OCR engine adapter
//!
//! The recognition engine itself is an external tesseract process reached
//! through rusty-tesseract. Everything above this module talks to the
//! `RecognitionEngine` trait, which exposes the two call shapes the rest of
//! the system needs: plain recognized text, and per-token text with
//! confidence.

use crate::error::OcrError;
use image::DynamicImage;
use rusty_tesseract::{Args, Image};
use std::collections::HashMap;

/// Parameters for a single recognition call.
#[derive(Debug, Clone, Default)]
pub struct EngineParams {
    /// Page segmentation mode (tesseract `--psm`).
    pub psm: Option<i32>,
    /// Engine operating mode (tesseract `--oem`).
    pub oem: Option<i32>,
    /// Restrict recognition to these characters.
    pub char_whitelist: Option<String>,
    /// Source resolution hint (tesseract `--dpi`).
    pub dpi: Option<i32>,
}

/// One recognized token region with its engine-native confidence.
///
/// Confidence is on the engine's 0-100 scale; structural rows the engine
/// emits without a score carry a sentinel value of 0 or below.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub confidence: f32,
}

/// Narrow call contract against the external recognition engine.
pub trait RecognitionEngine: Send + Sync {
    /// Recognize the image as plain text, trimmed of surrounding whitespace.
    fn recognize_text(
        &self,
        image: &DynamicImage,
        params: &EngineParams,
    ) -> Result<String, OcrError>;

    /// Recognize the image into token regions with per-token confidence.
    fn recognize_tokens(
        &self,
        image: &DynamicImage,
        params: &EngineParams,
    ) -> Result<Vec<Token>, OcrError>;
}

/// Engine backed by the system `tesseract` binary.
pub struct TesseractEngine {
    language: String,
}

impl TesseractEngine {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }
}

impl RecognitionEngine for TesseractEngine {
    fn recognize_text(
        &self,
        image: &DynamicImage,
        params: &EngineParams,
    ) -> Result<String, OcrError> {
        let tess_image = Image::from_dynamic_image(image)
            .map_err(|e| OcrError::Engine(format!("failed to hand image to tesseract: {}", e)))?;

        let args = build_args(&self.language, params);
        let text = rusty_tesseract::image_to_string(&tess_image, &args)
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        Ok(text.trim().to_string())
    }

    fn recognize_tokens(
        &self,
        image: &DynamicImage,
        params: &EngineParams,
    ) -> Result<Vec<Token>, OcrError> {
        let tess_image = Image::from_dynamic_image(image)
            .map_err(|e| OcrError::Engine(format!("failed to hand image to tesseract: {}", e)))?;

        let args = build_args(&self.language, params);
        let output = rusty_tesseract::image_to_data(&tess_image, &args)
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        Ok(output
            .data
            .into_iter()
            .map(|record| Token {
                text: record.text,
                confidence: record.conf,
            })
            .collect())
    }
}

fn build_args(language: &str, params: &EngineParams) -> Args {
    let mut config_variables = HashMap::new();
    if let Some(whitelist) = &params.char_whitelist {
        config_variables.insert("tessedit_char_whitelist".to_string(), whitelist.clone());
    }

    Args {
        lang: language.to_string(),
        config_variables,
        dpi: params.dpi,
        psm: params.psm,
        oem: params.oem,
    }
}
