//! The per-image analysis pipeline and batch driver.
//!
//! Everything is built fresh per image and discarded after the report is
//! written; no state survives between images.

use anyhow::Result;
use chrono::Utc;
use image::DynamicImage;
use log::{info, warn};
use std::time::Instant;

use crate::annotate::{render_annotations, save_annotated};
use crate::category_detection::detect_categories;
use crate::config::{AnalysisConfig, AnnotationConfig};
use crate::image_input::{collect_sources, load_image, ImageSource};
use crate::recommendation::recommend;
use crate::report::{
    annotated_path, overall_confidence, report_path, round_display, write_report, AnalysisReport,
};
use crate::scene::describe_scene;
use crate::scoring::{categorize, score_cleanliness};
use crate::similarity::SimilarityOracle;
use crate::taxonomy::litter_taxonomy;

/// Analyze one already-loaded image: scene descriptors, category detection,
/// scoring, recommendation. Pure with respect to the filesystem; the batch
/// driver handles outputs.
pub fn analyze_image(
    oracle: &dyn SimilarityOracle,
    image: &DynamicImage,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let taxonomy = litter_taxonomy();

    let scene = describe_scene(oracle, image)?;
    let detections = detect_categories(oracle, image, taxonomy, &config.detection);
    let (score, breakdown) = score_cleanliness(&detections, &scene, &config.scoring);
    let category = categorize(score);

    let recommendation = recommend(
        config.recommend_url.as_deref(),
        score,
        category,
        &detections,
        &scene,
        &breakdown,
    );

    Ok(AnalysisReport {
        cleanliness_score: round_display(score),
        category,
        overall_confidence: overall_confidence(&detections),
        detections,
        scene,
        breakdown,
        recommendation,
        annotated_path: None,
        analyzed_at: Utc::now(),
        shoreline_version: env!("CARGO_PKG_VERSION"),
    })
}

fn analyze_source(
    oracle: &dyn SimilarityOracle,
    source: &ImageSource,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let image = load_image(source)?;
    let mut report = analyze_image(oracle, &image, config)?;

    if config.annotate {
        let output = annotated_path(source, config.base.output_dir.as_deref());
        let annotated = render_annotations(&image, &report.detections, litter_taxonomy());
        save_annotated(&annotated, &output)?;
        report.annotated_path = Some(output.display().to_string());
    }

    let output = report_path(source, config.base.output_dir.as_deref());
    write_report(&report, &output)?;

    Ok(report)
}

/// Analyze every input source. In strict mode the first failure aborts the
/// batch; in permissive mode failures are logged and the rest continue.
/// Returns the number of successfully analyzed images.
pub fn run_analysis(config: &AnalysisConfig, oracle: &dyn SimilarityOracle) -> Result<usize> {
    let start = Instant::now();
    let sources = collect_sources(&config.base.sources, config.base.strict)?;

    if sources.is_empty() {
        warn!("No valid images found to analyze");
        return Ok(0);
    }

    info!("Found {} image(s) to analyze", sources.len());

    let mut successful = 0;
    let mut failed = 0;

    for (index, source) in sources.iter().enumerate() {
        match analyze_source(oracle, source, config) {
            Ok(report) => {
                successful += 1;
                info!(
                    "Analyzed {} ({}/{}): score {:.2} ({}), {} detection(s)",
                    source,
                    index + 1,
                    sources.len(),
                    report.cleanliness_score,
                    report.category,
                    report.detections.len()
                );
            }
            Err(e) => {
                failed += 1;
                if config.base.strict {
                    return Err(e);
                }
                warn!(
                    "Failed to analyze {} ({}/{}): {e}",
                    source,
                    index + 1,
                    sources.len()
                );
            }
        }
    }

    if successful > 0 {
        info!(
            "Analyzed {} image(s) in {:.1}s",
            successful,
            start.elapsed().as_secs_f64()
        );
    }
    if failed > 0 {
        warn!("{failed} of {} images failed to analyze", sources.len());
    }

    Ok(successful)
}

/// Annotation-only pipeline: detect and draw, no scoring or report.
pub fn run_annotation(config: &AnnotationConfig, oracle: &dyn SimilarityOracle) -> Result<usize> {
    let sources = collect_sources(&config.base.sources, config.base.strict)?;

    if sources.is_empty() {
        warn!("No valid images found to annotate");
        return Ok(0);
    }

    let taxonomy = litter_taxonomy();
    let mut successful = 0;

    for source in &sources {
        let result = load_image(source).and_then(|image| {
            let detections = detect_categories(oracle, &image, taxonomy, &config.detection);
            let output = annotated_path(source, config.base.output_dir.as_deref());
            let annotated = render_annotations(&image, &detections, taxonomy);
            save_annotated(&annotated, &output)?;
            info!(
                "Annotated {} with {} detection(s) -> {}",
                source,
                detections.len(),
                output.display()
            );
            Ok(())
        });

        match result {
            Ok(()) => successful += 1,
            Err(e) => {
                if config.base.strict {
                    return Err(e);
                }
                warn!("Failed to annotate {source}: {e}");
            }
        }
    }

    Ok(successful)
}
