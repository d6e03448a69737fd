//! Scene-level descriptors: beach size estimate and the natural-vs-artificial
//! ratio. Computed once per image from dedicated oracle phrase panels and
//! consumed read-only by the scorer.

use anyhow::Result;
use image::DynamicImage;
use serde::Serialize;

use crate::similarity::SimilarityOracle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BeachSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneDescriptors {
    pub estimated_size: BeachSize,
    pub natural_ratio: f64,
}

const SIZE_PHRASES: [&str; 3] = [
    "wide expansive beach with lots of sand",
    "narrow beach strip",
    "small beach cove",
];

const NATURAL_PHRASES: [&str; 4] = [
    "natural driftwood logs on the beach",
    "natural seaweed and kelp",
    "natural rocks and pebbles",
    "natural shells and coral",
];

const ARTIFICIAL_PHRASES: [&str; 4] = [
    "construction debris and concrete",
    "artificial plastic debris",
    "metal and industrial waste",
    "processed wood and lumber scraps",
];

/// Classify a size panel: wide weighs 3, narrow 2, cove 1, normalized over
/// the panel total so the weighted score lands in [1,3].
fn size_from_panel(wide: f64, narrow: f64, cove: f64) -> BeachSize {
    let total = wide + narrow + cove;
    if total <= 0.0 {
        return BeachSize::Medium;
    }
    let weighted = (3.0 * wide + 2.0 * narrow + cove) / total;
    if weighted > 2.5 {
        BeachSize::Large
    } else if weighted > 1.5 {
        BeachSize::Medium
    } else {
        BeachSize::Small
    }
}

fn natural_ratio(natural: f64, artificial: f64) -> f64 {
    let total = natural + artificial;
    if total > 0.0 {
        natural / total
    } else {
        0.5
    }
}

/// Query the oracle panels and build the scene descriptors.
///
/// Unlike per-category detection there is no graceful degradation here: the
/// scorer treats descriptors as already-validated input, so a panel failure
/// fails the analysis of this image.
pub fn describe_scene(
    oracle: &dyn SimilarityOracle,
    image: &DynamicImage,
) -> Result<SceneDescriptors> {
    let wide = oracle.score(image, SIZE_PHRASES[0])?;
    let narrow = oracle.score(image, SIZE_PHRASES[1])?;
    let cove = oracle.score(image, SIZE_PHRASES[2])?;

    let mut natural = 0.0;
    for phrase in NATURAL_PHRASES {
        natural += oracle.score(image, phrase)?;
    }
    let mut artificial = 0.0;
    for phrase in ARTIFICIAL_PHRASES {
        artificial += oracle.score(image, phrase)?;
    }

    Ok(SceneDescriptors {
        estimated_size: size_from_panel(wide, narrow, cove),
        natural_ratio: natural_ratio(natural, artificial),
    })
}
