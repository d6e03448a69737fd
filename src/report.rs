//! Per-image analysis report and its JSON output.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::detection::Detection;
use crate::image_input::ImageSource;
use crate::scene::SceneDescriptors;
use crate::scoring::ScoreBreakdown;

/// Confidence reported for an image with no detections at all.
const DEFAULT_OVERALL_CONFIDENCE: f64 = 0.85;

/// The full result of analyzing one image. Everything a caller needs to
/// audit the score is here; `breakdown` reconstructs `cleanliness_score`
/// exactly (before the 2-decimal display rounding).
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub cleanliness_score: f64,
    pub category: &'static str,
    pub overall_confidence: f64,
    pub detections: Vec<Detection>,
    pub scene: SceneDescriptors,
    pub breakdown: ScoreBreakdown,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_path: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    pub shoreline_version: &'static str,
}

/// Round for display only; the unrounded value stays in the breakdown.
pub fn round_display(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean detection confidence, with a fixed default when nothing was
/// detected.
pub fn overall_confidence(detections: &[Detection]) -> f64 {
    if detections.is_empty() {
        return DEFAULT_OVERALL_CONFIDENCE;
    }
    let mean =
        detections.iter().map(|d| d.confidence).sum::<f64>() / detections.len() as f64;
    (mean * 1000.0).round() / 1000.0
}

fn output_base(source: &ImageSource, output_dir: Option<&str>) -> PathBuf {
    match (source, output_dir) {
        (_, Some(dir)) => PathBuf::from(dir),
        (ImageSource::Path(path), None) => {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        }
        (ImageSource::Url(_), None) => PathBuf::from("."),
    }
}

/// Report path: `<stem>_analysis.json` next to the input, or a clean
/// `<stem>.json` inside `--output-dir`.
pub fn report_path(source: &ImageSource, output_dir: Option<&str>) -> PathBuf {
    let stem = source.stem();
    let filename = if output_dir.is_some() {
        format!("{stem}.json")
    } else {
        format!("{stem}_analysis.json")
    };
    output_base(source, output_dir).join(filename)
}

/// Annotated-image path: `<stem>_annotated.<ext>`, or `<stem>.<ext>` inside
/// `--output-dir`.
pub fn annotated_path(source: &ImageSource, output_dir: Option<&str>) -> PathBuf {
    let stem = source.stem();
    let ext = source.output_extension();
    let filename = if output_dir.is_some() {
        format!("{stem}.{ext}")
    } else {
        format!("{stem}_annotated.{ext}")
    };
    output_base(source, output_dir).join(filename)
}

pub fn write_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(confidence: f64) -> Detection {
        Detection {
            category: "cans_bottles".to_string(),
            confidence,
            severity: 5,
            description: "Cans and glass bottles".to_string(),
            region: None,
        }
    }

    #[test]
    fn test_overall_confidence_mean() {
        let detections = vec![detection(0.6), detection(0.8)];
        assert!((overall_confidence(&detections) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_overall_confidence_default_when_empty() {
        assert_eq!(overall_confidence(&[]), DEFAULT_OVERALL_CONFIDENCE);
    }

    #[test]
    fn test_round_display_two_decimals() {
        assert_eq!(round_display(77.3456), 77.35);
        assert_eq!(round_display(100.0), 100.0);
    }

    #[test]
    fn test_report_path_next_to_input() {
        let source = ImageSource::Path(PathBuf::from("/photos/cove.jpg"));
        assert_eq!(
            report_path(&source, None),
            PathBuf::from("/photos/cove_analysis.json")
        );
    }

    #[test]
    fn test_report_path_in_output_dir() {
        let source = ImageSource::Path(PathBuf::from("/photos/cove.jpg"));
        assert_eq!(
            report_path(&source, Some("/out")),
            PathBuf::from("/out/cove.json")
        );
    }

    #[test]
    fn test_annotated_path_keeps_png() {
        let source = ImageSource::Path(PathBuf::from("/photos/cove.png"));
        assert_eq!(
            annotated_path(&source, None),
            PathBuf::from("/photos/cove_annotated.png")
        );
    }
}
