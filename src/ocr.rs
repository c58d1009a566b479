//! Multi-strategy text extraction
//!
//! One decoded image is pushed through several independent preprocessing
//! pipelines, the recognition engine runs on each variant, and the longest
//! non-empty output wins. A strategy failing only costs that strategy;
//! extraction as a whole fails only when every strategy does.

use crate::engine::{EngineParams, RecognitionEngine, TesseractEngine, Token};
use crate::error::OcrError;
use crate::preprocessing;
use image::DynamicImage;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Page segmentation: assume one uniform block of text.
const PSM_SINGLE_BLOCK: i32 = 6;
/// Page segmentation: treat the image as a single word.
const PSM_SINGLE_WORD: i32 = 8;
/// Engine operating mode: default (legacy + LSTM).
const OEM_DEFAULT: i32 = 3;
/// Upscale factor used by the scaled strategy.
const SCALE_FACTOR: u32 = 2;
/// Resolution hint passed alongside the upscaled variant.
const SCALED_DPI: i32 = 300;
/// Character set the enhanced strategy restricts recognition to.
const ENHANCED_WHITELIST: &str =
    r##"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 .,!?;:'"()[]{}@#$%&*+-=/_"##;

/// Tokens scoring below this count as low-confidence words. Distinct from
/// the CLI's quality-tier thresholds.
const LOW_CONFIDENCE_CUTOFF: f32 = 80.0;

/// A fixed pairing of a preprocessing transform with engine parameters.
struct Strategy {
    name: &'static str,
    prepare: fn(&DynamicImage) -> Result<DynamicImage, OcrError>,
    params: EngineParams,
}

impl Strategy {
    fn run(&self, image: &DynamicImage, engine: &dyn RecognitionEngine) -> Result<String, OcrError> {
        let prepared = (self.prepare)(image)?;
        engine.recognize_text(&prepared, &self.params)
    }
}

fn prepare_scaled(image: &DynamicImage) -> Result<DynamicImage, OcrError> {
    let upscaled = preprocessing::upscale(image, SCALE_FACTOR)?;
    preprocessing::enhance(&upscaled)
}

/// The fixed strategy set, in tie-break order.
fn strategies() -> [Strategy; 4] {
    [
        Strategy {
            name: "enhanced",
            prepare: preprocessing::enhance,
            params: EngineParams {
                psm: Some(PSM_SINGLE_BLOCK),
                oem: Some(OEM_DEFAULT),
                char_whitelist: Some(ENHANCED_WHITELIST.to_string()),
                dpi: None,
            },
        },
        Strategy {
            name: "preprocessed",
            prepare: preprocessing::binarize,
            params: EngineParams {
                psm: Some(PSM_SINGLE_BLOCK),
                oem: Some(OEM_DEFAULT),
                char_whitelist: None,
                dpi: None,
            },
        },
        Strategy {
            name: "scaled",
            prepare: prepare_scaled,
            params: EngineParams {
                psm: Some(PSM_SINGLE_BLOCK),
                oem: Some(OEM_DEFAULT),
                char_whitelist: None,
                dpi: Some(SCALED_DPI),
            },
        },
        Strategy {
            name: "single_word",
            prepare: preprocessing::enhance,
            params: EngineParams {
                psm: Some(PSM_SINGLE_WORD),
                oem: Some(OEM_DEFAULT),
                char_whitelist: None,
                dpi: None,
            },
        },
    ]
}

/// OCR quality metrics for one image, or the reason they are unavailable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfidenceReport {
    Scored {
        average_confidence: f32,
        word_count: usize,
        low_confidence_words: usize,
    },
    Failed {
        error: String,
    },
}

/// Runs the strategy ensemble and the confidence reporter against one
/// recognition engine.
pub struct OcrProcessor {
    engine: Arc<dyn RecognitionEngine>,
}

impl OcrProcessor {
    pub fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        Self { engine }
    }

    /// Processor backed by the system tesseract binary.
    pub fn with_tesseract(language: &str) -> Self {
        Self::new(Arc::new(TesseractEngine::new(language)))
    }

    /// Extract text from an image file.
    ///
    /// Returns an empty string when the strategies ran but found no text;
    /// fails only on an undecodable input or when every strategy errors.
    pub fn extract_text(&self, path: &Path) -> Result<String, OcrError> {
        let image = image::open(path).map_err(|e| OcrError::Decode(e.to_string()))?;
        self.extract_from_image(&image)
    }

    /// Extract text from an already-decoded image.
    pub fn extract_from_image(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let strategies = strategies();
        let mut successes: Vec<(&'static str, String)> = Vec::new();
        let mut failures = 0usize;
        let mut last_failure: Option<OcrError> = None;

        for strategy in &strategies {
            tracing::debug!(strategy = strategy.name, "running extraction strategy");
            match strategy.run(image, self.engine.as_ref()) {
                Ok(text) => {
                    let text = text.trim().to_string();
                    if text.is_empty() {
                        tracing::debug!(strategy = strategy.name, "strategy produced no text");
                    } else {
                        tracing::debug!(
                            strategy = strategy.name,
                            chars = text.chars().count(),
                            "strategy succeeded"
                        );
                        successes.push((strategy.name, text));
                    }
                }
                Err(err) => {
                    tracing::warn!(strategy = strategy.name, error = %err, "strategy failed");
                    failures += 1;
                    last_failure = Some(err);
                }
            }
        }

        if failures == strategies.len() {
            let cause = last_failure
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(OcrError::Extraction(format!(
                "all {} extraction strategies failed (last error: {})",
                failures, cause
            )));
        }

        // First strict maximum by character count keeps the earliest
        // declared strategy on ties.
        let mut winner: Option<&(&'static str, String)> = None;
        for candidate in &successes {
            let is_longer = winner
                .map(|(_, text)| candidate.1.chars().count() > text.chars().count())
                .unwrap_or(true);
            if is_longer {
                winner = Some(candidate);
            }
        }

        match winner {
            Some((name, text)) => {
                tracing::info!(
                    strategy = name,
                    chars = text.chars().count(),
                    "selected extraction result"
                );
                Ok(text.clone())
            }
            None => {
                tracing::debug!("no strategy detected any text");
                Ok(String::new())
            }
        }
    }

    /// Confidence metrics for an image file. Advisory: never fails, any
    /// problem comes back as an error-marked report.
    pub fn confidence(&self, path: &Path) -> ConfidenceReport {
        match image::open(path) {
            Ok(image) => self.confidence_for_image(&image),
            Err(err) => ConfidenceReport::Failed {
                error: format!("Failed to decode image: {}", err),
            },
        }
    }

    /// Confidence metrics for an already-decoded image.
    pub fn confidence_for_image(&self, image: &DynamicImage) -> ConfidenceReport {
        let enhanced = match preprocessing::enhance(image) {
            Ok(img) => img,
            Err(err) => {
                return ConfidenceReport::Failed {
                    error: err.to_string(),
                }
            }
        };

        let tokens = match self
            .engine
            .recognize_tokens(&enhanced, &EngineParams::default())
        {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::warn!(error = %err, "confidence scoring failed");
                return ConfidenceReport::Failed {
                    error: err.to_string(),
                };
            }
        };

        Self::summarize_tokens(&tokens)
    }

    fn summarize_tokens(tokens: &[Token]) -> ConfidenceReport {
        // The engine emits conf <= 0 for rows it assigned no confidence to
        // (structural rows, whitespace regions); those never enter the mean.
        let scored: Vec<f32> = tokens
            .iter()
            .filter(|t| t.confidence > 0.0)
            .map(|t| t.confidence)
            .collect();

        let average_confidence = if scored.is_empty() {
            0.0
        } else {
            scored.iter().sum::<f32>() / scored.len() as f32
        };

        let word_count = tokens.iter().filter(|t| !t.text.trim().is_empty()).count();
        let low_confidence_words = scored
            .iter()
            .filter(|&&c| c < LOW_CONFIDENCE_CUTOFF)
            .count();

        ConfidenceReport::Scored {
            average_confidence,
            word_count,
            low_confidence_words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Engine stub that replays scripted outcomes in call order.
    struct ScriptedEngine {
        texts: Mutex<VecDeque<Result<String, OcrError>>>,
        tokens: Mutex<Option<Result<Vec<Token>, OcrError>>>,
    }

    impl ScriptedEngine {
        fn with_texts(outcomes: Vec<Result<String, OcrError>>) -> Arc<Self> {
            Arc::new(Self {
                texts: Mutex::new(outcomes.into()),
                tokens: Mutex::new(None),
            })
        }

        fn with_tokens(outcome: Result<Vec<Token>, OcrError>) -> Arc<Self> {
            Arc::new(Self {
                texts: Mutex::new(VecDeque::new()),
                tokens: Mutex::new(Some(outcome)),
            })
        }
    }

    impl RecognitionEngine for ScriptedEngine {
        fn recognize_text(
            &self,
            _image: &DynamicImage,
            _params: &EngineParams,
        ) -> Result<String, OcrError> {
            self.texts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }

        fn recognize_tokens(
            &self,
            _image: &DynamicImage,
            _params: &EngineParams,
        ) -> Result<Vec<Token>, OcrError> {
            self.tokens
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn test_image() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(40, 20, |x, y| {
            if (8..12).contains(&y) && (5..35).contains(&x) {
                Luma([30])
            } else {
                Luma([220])
            }
        }))
    }

    fn token(text: &str, confidence: f32) -> Token {
        Token {
            text: text.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_extract_picks_longest_result() {
        let engine = ScriptedEngine::with_texts(vec![
            Ok("short".to_string()),
            Ok("a much longer result".to_string()),
            Ok("mid length".to_string()),
            Ok("tiny".to_string()),
        ]);

        let result = OcrProcessor::new(engine)
            .extract_from_image(&test_image())
            .unwrap();

        assert_eq!(result, "a much longer result");
    }

    #[test]
    fn test_extract_measures_length_in_characters() {
        // Four chars beats three, even when the three take six bytes.
        let engine = ScriptedEngine::with_texts(vec![
            Ok("abcd".to_string()),
            Ok("ééé".to_string()),
            Ok(String::new()),
            Ok(String::new()),
        ]);

        let result = OcrProcessor::new(engine)
            .extract_from_image(&test_image())
            .unwrap();

        assert_eq!(result, "abcd");
    }

    #[test]
    fn test_extract_ties_go_to_earliest_strategy() {
        let engine = ScriptedEngine::with_texts(vec![
            Ok("abcd".to_string()),
            Ok("wxyz".to_string()),
            Ok("qrst".to_string()),
            Ok("mnop".to_string()),
        ]);

        let result = OcrProcessor::new(engine)
            .extract_from_image(&test_image())
            .unwrap();

        assert_eq!(result, "abcd");
    }

    #[test]
    fn test_extract_returns_empty_when_no_text_found() {
        let engine = ScriptedEngine::with_texts(vec![
            Ok(String::new()),
            Ok("   \n\t ".to_string()),
            Ok(String::new()),
            Ok(String::new()),
        ]);

        let result = OcrProcessor::new(engine)
            .extract_from_image(&test_image())
            .unwrap();

        assert_eq!(result, "");
    }

    #[test]
    fn test_extract_tolerates_partial_failure() {
        let engine = ScriptedEngine::with_texts(vec![
            Err(OcrError::Engine("engine crashed".to_string())),
            Ok("recovered text".to_string()),
            Err(OcrError::Engine("engine crashed again".to_string())),
            Ok("short".to_string()),
        ]);

        let result = OcrProcessor::new(engine)
            .extract_from_image(&test_image())
            .unwrap();

        assert_eq!(result, "recovered text");
    }

    #[test]
    fn test_extract_fails_when_every_strategy_fails() {
        let engine = ScriptedEngine::with_texts(vec![
            Err(OcrError::Engine("down".to_string())),
            Err(OcrError::Engine("down".to_string())),
            Err(OcrError::Engine("down".to_string())),
            Err(OcrError::Engine("still down".to_string())),
        ]);

        let result = OcrProcessor::new(engine).extract_from_image(&test_image());

        assert!(matches!(result, Err(OcrError::Extraction(_))));
    }

    #[test]
    fn test_extract_propagates_decode_failure() {
        let engine = ScriptedEngine::with_texts(vec![]);

        let result =
            OcrProcessor::new(engine).extract_text(Path::new("/nonexistent/missing.png"));

        assert!(matches!(result, Err(OcrError::Decode(_))));
    }

    #[test]
    fn test_confidence_math() {
        let engine = ScriptedEngine::with_tokens(Ok(vec![
            token("Hello", 95.0),
            token("World", 87.0),
            token("Test", 92.0),
            token("Text", 78.0),
            token("", 0.0),
            token("OCR", 88.0),
        ]));

        let report = OcrProcessor::new(engine).confidence_for_image(&test_image());

        assert_eq!(
            report,
            ConfidenceReport::Scored {
                average_confidence: 88.0,
                word_count: 5,
                low_confidence_words: 1,
            }
        );
    }

    #[test]
    fn test_confidence_with_no_scored_tokens() {
        let engine = ScriptedEngine::with_tokens(Ok(vec![token("", -1.0), token("", 0.0)]));

        let report = OcrProcessor::new(engine).confidence_for_image(&test_image());

        assert_eq!(
            report,
            ConfidenceReport::Scored {
                average_confidence: 0.0,
                word_count: 0,
                low_confidence_words: 0,
            }
        );
    }

    #[test]
    fn test_confidence_degrades_on_engine_failure() {
        let engine =
            ScriptedEngine::with_tokens(Err(OcrError::Engine("no tesseract".to_string())));

        let report = OcrProcessor::new(engine).confidence_for_image(&test_image());

        assert!(matches!(report, ConfidenceReport::Failed { .. }));
    }

    #[test]
    fn test_confidence_degrades_on_unreadable_file() {
        let engine = ScriptedEngine::with_tokens(Ok(vec![]));

        let report = OcrProcessor::new(engine).confidence(Path::new("/nonexistent/missing.png"));

        assert!(matches!(report, ConfidenceReport::Failed { .. }));
    }

    #[test]
    fn test_confidence_report_serializes_to_stable_shapes() {
        let scored = ConfidenceReport::Scored {
            average_confidence: 85.5,
            word_count: 4,
            low_confidence_words: 0,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["average_confidence"], 85.5);
        assert_eq!(json["word_count"], 4);

        let failed = ConfidenceReport::Failed {
            error: "engine unavailable".to_string(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["error"], "engine unavailable");
    }
}
