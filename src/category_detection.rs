//! Drives the similarity oracle across the litter taxonomy and emits
//! localized detections.

use image::DynamicImage;
use log::{debug, warn};

use crate::config::DetectionParams;
use crate::detection::Detection;
use crate::region_extraction::extract_regions;
use crate::similarity::SimilarityOracle;
use crate::suppression::suppress_overlaps;
use crate::taxonomy::LitterCategory;

/// Run every taxonomy category against the oracle and collect detections.
///
/// Per category, phrase variants are tried in order and the FIRST variant
/// whose confidence strictly exceeds the severity-adjusted bar is accepted;
/// remaining variants are not tested. This deliberately favors recall over
/// precision per category.
///
/// Oracle failures degrade locally: a failed confidence call skips the
/// category, a failed grid call keeps the detection without a region.
/// Neither aborts the overall analysis.
pub fn detect_categories(
    oracle: &dyn SimilarityOracle,
    image: &DynamicImage,
    taxonomy: &[LitterCategory],
    params: &DetectionParams,
) -> Vec<Detection> {
    let mut detections = Vec::new();

    'category: for category in taxonomy {
        let threshold = params.effective_threshold(category.severity);

        let mut accepted: Option<(&str, f64)> = None;
        for &phrase in category.phrases {
            match oracle.score(image, phrase) {
                Ok(confidence) => {
                    if confidence > threshold {
                        // First qualifying variant wins.
                        accepted = Some((phrase, confidence));
                        break;
                    }
                    debug!(
                        "{}: '{}' scored {:.3}, bar {:.3}",
                        category.name, phrase, confidence, threshold
                    );
                }
                Err(e) => {
                    warn!(
                        "Skipping category {}: confidence check failed: {e}",
                        category.name
                    );
                    continue 'category;
                }
            }
        }

        let Some((phrase, confidence)) = accepted else {
            continue;
        };

        let regions = match oracle.grid(image, phrase) {
            Ok(grid) => {
                let candidates =
                    extract_regions(&grid, params.grid_threshold, params.min_region_size);
                suppress_overlaps(candidates, params.iou_threshold)
            }
            Err(e) => {
                warn!(
                    "{}: localization failed ({e}); keeping scene-level detection",
                    category.name
                );
                Vec::new()
            }
        };

        if regions.is_empty() {
            // Present per the oracle, but no localizable area survived.
            detections.push(Detection {
                category: category.name.to_string(),
                confidence,
                severity: category.severity,
                description: category.description.to_string(),
                region: None,
            });
        } else {
            debug!(
                "{}: {} region(s) after suppression",
                category.name,
                regions.len()
            );
            for region in regions {
                detections.push(Detection {
                    category: category.name.to_string(),
                    confidence,
                    severity: category.severity,
                    description: category.description.to_string(),
                    region: Some(region),
                });
            }
        }
    }

    detections
}
