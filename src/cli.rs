use crate::ocr::{ConfidenceReport, OcrProcessor};
use crate::ExtractArgs;
use anyhow::{bail, Context};
use std::fs;

/// Average confidence at or above this prints as High quality.
const QUALITY_HIGH: f32 = 80.0;
/// Average confidence at or above this (but below High) prints as Medium.
const QUALITY_MEDIUM: f32 = 60.0;

/// Run the extract subcommand.
pub fn run(args: ExtractArgs) -> anyhow::Result<()> {
    if !args.image_path.is_file() {
        bail!("image file '{}' not found", args.image_path.display());
    }

    if args.verbose {
        println!("Processing image: {}", args.image_path.display());
    }

    let processor = OcrProcessor::with_tesseract(&args.language);

    let text = processor
        .extract_text(&args.image_path)
        .with_context(|| format!("failed to process image '{}'", args.image_path.display()))?;

    if args.verbose {
        println!(
            "Text extraction completed. Found {} characters.",
            text.chars().count()
        );
    }

    if args.confidence || args.verbose {
        print_quality(&processor.confidence(&args.image_path));
    }

    if let Some(output) = &args.output {
        fs::write(output, &text)
            .with_context(|| format!("failed to save text to '{}'", output.display()))?;
        println!("Text saved to: {}", output.display());
    } else {
        if args.verbose || args.confidence {
            println!("\nExtracted text:");
            println!("{}", "-".repeat(40));
        }
        println!("{}", text);
    }

    Ok(())
}

/// Print the quality block for a scored report; error-marked reports are
/// advisory only and print nothing.
fn print_quality(report: &ConfidenceReport) {
    let ConfidenceReport::Scored {
        average_confidence,
        word_count,
        low_confidence_words,
    } = report
    else {
        return;
    };

    println!("\nOCR Quality Information:");
    println!("   Average confidence: {:.1}%", average_confidence);
    println!("   Words detected: {}", word_count);
    if *low_confidence_words > 0 {
        println!("   Low confidence words: {}", low_confidence_words);
    }
    println!("   Quality: {}", quality_label(*average_confidence));
}

fn quality_label(average: f32) -> &'static str {
    if average >= QUALITY_HIGH {
        "High"
    } else if average >= QUALITY_MEDIUM {
        "Medium"
    } else {
        "Low - consider improving image quality"
    }
}
