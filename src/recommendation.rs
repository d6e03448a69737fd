//! Cleanup guidance text, from a remote service when configured with a
//! built-in composer as the fallback. This path never fails an analysis.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::detection::Detection;
use crate::scene::{BeachSize, SceneDescriptors};
use crate::scoring::ScoreBreakdown;

#[derive(Serialize)]
struct RecommendationRequest<'a> {
    cleanliness_score: f64,
    category: &'a str,
    detections: &'a [Detection],
    scene: &'a SceneDescriptors,
    breakdown: &'a ScoreBreakdown,
}

#[derive(Deserialize)]
struct RecommendationResponse {
    recommendation: String,
}

/// Produce guidance text for an analysis result.
///
/// When `remote_url` is set, the full analysis context is POSTed there and
/// the returned text used; any transport, status, or decode failure falls
/// back to the built-in composer with a logged warning.
pub fn recommend(
    remote_url: Option<&str>,
    score: f64,
    category: &str,
    detections: &[Detection],
    scene: &SceneDescriptors,
    breakdown: &ScoreBreakdown,
) -> String {
    if let Some(url) = remote_url {
        match fetch_remote(url, score, category, detections, scene, breakdown) {
            Ok(text) if !text.trim().is_empty() => return text,
            Ok(_) => {
                warn!("Recommendation service returned empty text; using built-in guidance")
            }
            Err(e) => warn!("Recommendation service unavailable ({e}); using built-in guidance"),
        }
    }
    compose_builtin(score, detections, scene)
}

fn fetch_remote(
    url: &str,
    score: f64,
    category: &str,
    detections: &[Detection],
    scene: &SceneDescriptors,
    breakdown: &ScoreBreakdown,
) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client for recommendation service")?;

    let request = RecommendationRequest {
        cleanliness_score: score,
        category,
        detections,
        scene,
        breakdown,
    };

    let response: RecommendationResponse = client
        .post(url)
        .json(&request)
        .send()
        .context("Recommendation request failed")?
        .error_for_status()
        .context("Recommendation service returned an error status")?
        .json()
        .context("Malformed recommendation response")?;

    Ok(response.recommendation)
}

/// Rule-based guidance: a score-band message plus hazard-, plastic-, and
/// size-specific appendices.
fn compose_builtin(score: f64, detections: &[Detection], scene: &SceneDescriptors) -> String {
    let mut parts: Vec<&str> = Vec::new();

    parts.push(if score >= 90.0 {
        "Excellent maintenance. Continue current practices."
    } else if score >= 80.0 {
        "Very good condition. Minor preventive measures recommended."
    } else if score >= 70.0 {
        "Good condition. Regular monitoring and occasional cleanup needed."
    } else if score >= 60.0 {
        "Moderate condition. Increase cleanup frequency."
    } else if score >= 45.0 {
        "Needs attention. Implement regular cleanup schedule."
    } else {
        "Poor condition. Immediate intervention required."
    });

    if detections.iter().any(|d| d.severity >= 8) {
        parts.push(
            "High-priority items detected: immediate removal of hazardous debris required.",
        );
    }

    let plastic_count = detections
        .iter()
        .filter(|d| d.category.contains("plastic"))
        .count();
    if plastic_count > 2 {
        parts.push(
            "High plastic pollution detected. Consider a plastic-specific cleanup campaign.",
        );
    }

    match scene.estimated_size {
        BeachSize::Large => parts.push(
            "Large beach area: coordinate with local authorities for systematic cleanup.",
        ),
        BeachSize::Small => {
            parts.push("Small beach area: community-based cleanup efforts would be effective.")
        }
        BeachSize::Medium => {}
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(category: &str, severity: u8) -> Detection {
        Detection {
            category: category.to_string(),
            confidence: 0.5,
            severity,
            description: String::new(),
            region: None,
        }
    }

    fn scene(size: BeachSize) -> SceneDescriptors {
        SceneDescriptors {
            estimated_size: size,
            natural_ratio: 0.5,
        }
    }

    #[test]
    fn test_builtin_clean_beach_message() {
        let text = compose_builtin(95.0, &[], &scene(BeachSize::Medium));
        assert_eq!(text, "Excellent maintenance. Continue current practices.");
    }

    #[test]
    fn test_builtin_flags_hazardous_items() {
        let detections = vec![detection("fishing_debris", 8)];
        let text = compose_builtin(50.0, &detections, &scene(BeachSize::Medium));
        assert!(text.contains("hazardous debris"));
    }

    #[test]
    fn test_builtin_flags_plastic_pollution() {
        let detections = vec![
            detection("plastic_bottles", 6),
            detection("plastic_bags", 7),
            detection("microplastics", 6),
        ];
        let text = compose_builtin(60.0, &detections, &scene(BeachSize::Medium));
        assert!(text.contains("plastic-specific cleanup campaign"));
    }

    #[test]
    fn test_builtin_size_specific_guidance() {
        let large = compose_builtin(70.0, &[], &scene(BeachSize::Large));
        assert!(large.contains("local authorities"));

        let small = compose_builtin(70.0, &[], &scene(BeachSize::Small));
        assert!(small.contains("community-based"));

        let medium = compose_builtin(70.0, &[], &scene(BeachSize::Medium));
        assert!(!medium.contains("local authorities") && !medium.contains("community-based"));
    }

    #[test]
    fn test_recommend_without_remote_never_fails() {
        let text = recommend(None, 30.0, "Poor", &[], &scene(BeachSize::Medium), &dummy_breakdown());
        assert!(text.contains("Immediate intervention"));
    }

    fn dummy_breakdown() -> ScoreBreakdown {
        ScoreBreakdown {
            base_score: 100.0,
            object_count: 0,
            total_weighted_severity: 0.0,
            avg_weighted_severity: 0.0,
            avg_confidence: 0.0,
            density_penalty: 0.0,
            severity_penalty: 0.0,
            size_multiplier: 1.0,
            total_penalty: 0.0,
            natural_bonus: 0.0,
            final_score: 30.0,
        }
    }
}
