//! Similarity oracle interface and the HTTP adapter for a remote
//! vision-language embedding service.
//!
//! The engine never talks to a model directly; everything goes through the
//! `SimilarityOracle` trait so the backing service can be swapped without
//! touching detection or scoring code.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::DynamicImage;
use ndarray::Array2;
use serde::Deserialize;
use std::io::Cursor;
use std::time::Duration;

/// Per-pixel similarity surface for one (image, phrase) pair.
/// Rows index y, columns index x; dimensions match the analyzed image.
pub type SimilarityGrid = Array2<f32>;

/// Scores how well an image matches a short text phrase.
///
/// Failures surface as errors, never as silent zeros; callers decide how to
/// degrade.
pub trait SimilarityOracle {
    /// Scalar confidence in [0,1] that the phrase matches the image.
    fn score(&self, image: &DynamicImage, phrase: &str) -> Result<f64>;

    /// Image-sized similarity grid for the phrase.
    fn grid(&self, image: &DynamicImage, phrase: &str) -> Result<SimilarityGrid>;
}

/// Oracle backed by a remote embedding sidecar speaking a small JSON
/// protocol: POST `/score` and `/grid` with a base64 JPEG and a phrase.
pub struct RemoteOracle {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ScoreResponse {
    confidence: f64,
}

#[derive(Deserialize)]
struct GridResponse {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl RemoteOracle {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client for similarity oracle")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn encode_image(image: &DynamicImage) -> Result<String> {
        let mut buffer = Cursor::new(Vec::new());
        // JPEG keeps request bodies small; the oracle re-decodes anyway.
        image
            .to_rgb8()
            .write_to(&mut buffer, image::ImageFormat::Jpeg)
            .context("Failed to encode image for oracle request")?;
        Ok(BASE64.encode(buffer.get_ref()))
    }

    fn post(
        &self,
        endpoint: &str,
        image: &DynamicImage,
        phrase: &str,
    ) -> Result<reqwest::blocking::Response> {
        let body = serde_json::json!({
            "image_base64": Self::encode_image(image)?,
            "phrase": phrase,
        });

        let response = self
            .client
            .post(format!("{}/{endpoint}", self.base_url))
            .json(&body)
            .send()
            .with_context(|| format!("Oracle request to /{endpoint} failed"))?;

        response
            .error_for_status()
            .with_context(|| format!("Oracle /{endpoint} returned an error status"))
    }
}

impl SimilarityOracle for RemoteOracle {
    fn score(&self, image: &DynamicImage, phrase: &str) -> Result<f64> {
        let parsed: ScoreResponse = self
            .post("score", image, phrase)?
            .json()
            .context("Malformed oracle score response")?;

        if !(0.0..=1.0).contains(&parsed.confidence) {
            anyhow::bail!(
                "Oracle confidence {} is outside [0,1]",
                parsed.confidence
            );
        }
        Ok(parsed.confidence)
    }

    fn grid(&self, image: &DynamicImage, phrase: &str) -> Result<SimilarityGrid> {
        let parsed: GridResponse = self
            .post("grid", image, phrase)?
            .json()
            .context("Malformed oracle grid response")?;

        if parsed.values.len() != parsed.width * parsed.height {
            anyhow::bail!(
                "Oracle grid has {} values for claimed {}x{}",
                parsed.values.len(),
                parsed.width,
                parsed.height
            );
        }
        if (parsed.width as u32, parsed.height as u32) != (image.width(), image.height()) {
            anyhow::bail!(
                "Oracle grid is {}x{} but the image is {}x{}",
                parsed.width,
                parsed.height,
                image.width(),
                image.height()
            );
        }

        Array2::from_shape_vec((parsed.height, parsed.width), parsed.values)
            .context("Oracle grid dimensions are inconsistent")
    }
}
