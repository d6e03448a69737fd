//! Composite cleanliness scoring.
//!
//! A pure function of the detection list and the scene descriptors: no
//! state, no I/O, order-independent over detections. The breakdown exposes
//! every intermediate term so a caller can reconstruct the final number.

use serde::Serialize;

use crate::config::ScoringParams;
use crate::detection::Detection;
use crate::scene::SceneDescriptors;

/// Named intermediates of the scoring formula. Combining them per the
/// documented formula reproduces `final_score` exactly:
/// `clamp(base_score - total_penalty + natural_bonus, 0, 100)`.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub object_count: usize,
    pub total_weighted_severity: f64,
    pub avg_weighted_severity: f64,
    pub avg_confidence: f64,
    pub density_penalty: f64,
    pub severity_penalty: f64,
    pub size_multiplier: f64,
    pub total_penalty: f64,
    pub natural_bonus: f64,
    pub final_score: f64,
}

/// Score a detection list against the scene, returning the clamped score
/// and its full breakdown.
///
/// With no detections the penalty terms are all zero and the score is the
/// base plus the natural bonus, clamped to [0,100]. Otherwise the penalty
/// combines a logarithmic density term with a severity term that
/// accelerates once the average weighted severity passes the pivot, scaled
/// by average confidence and the beach-size multiplier.
pub fn score_cleanliness(
    detections: &[Detection],
    scene: &SceneDescriptors,
    params: &ScoringParams,
) -> (f64, ScoreBreakdown) {
    let count = detections.len();
    let size_multiplier = params.size_multiplier(scene.estimated_size);

    let mut total_weighted_severity = 0.0;
    let mut avg_weighted_severity = 0.0;
    let mut avg_confidence = 0.0;
    let mut density_penalty = 0.0;
    let mut severity_penalty = 0.0;
    let mut total_penalty = 0.0;

    if count > 0 {
        total_weighted_severity = detections
            .iter()
            .map(|d| d.severity as f64 * d.confidence)
            .sum();
        avg_weighted_severity = total_weighted_severity / count as f64;
        avg_confidence =
            detections.iter().map(|d| d.confidence).sum::<f64>() / count as f64;

        density_penalty = params.density_coefficient * (1.0 + count as f64).ln();
        severity_penalty = avg_weighted_severity
            * (1.0
                + ((avg_weighted_severity - params.severity_pivot) / params.severity_spread)
                    .exp());
        total_penalty = (density_penalty + severity_penalty) * avg_confidence * size_multiplier;
    }

    let natural_bonus = scene.natural_ratio * params.natural_bonus_cap;
    let final_score = (params.base_score - total_penalty + natural_bonus).clamp(0.0, 100.0);

    let breakdown = ScoreBreakdown {
        base_score: params.base_score,
        object_count: count,
        total_weighted_severity,
        avg_weighted_severity,
        avg_confidence,
        density_penalty,
        severity_penalty,
        size_multiplier,
        total_penalty,
        natural_bonus,
        final_score,
    };

    (final_score, breakdown)
}

/// Map a clamped cleanliness score to its qualitative band. Bands are
/// half-open; a boundary score belongs to the higher band.
pub fn categorize(score: f64) -> &'static str {
    if score >= 95.0 {
        "Pristine"
    } else if score >= 85.0 {
        "Very Clean"
    } else if score >= 70.0 {
        "Clean"
    } else if score >= 55.0 {
        "Moderately Clean"
    } else if score >= 40.0 {
        "Needs Attention"
    } else if score >= 20.0 {
        "Poor"
    } else {
        "Heavily Polluted"
    }
}
