//! Input collection and validation.
//!
//! Sources can be local files, directories (non-recursive), glob patterns,
//! or http(s) URLs. Decoded images are validated before any detection work:
//! undersized inputs are rejected, oversized ones downscaled.

use anyhow::{Context, Result};
use image::DynamicImage;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIN_DIMENSION: u32 = 100;
const MAX_DIMENSION: u32 = 4000;
const RESIZE_TARGET: u32 = 2000;
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// A single resolved input: either a local path or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Url(String),
}

impl ImageSource {
    /// Filename stem used for output naming.
    pub fn stem(&self) -> String {
        match self {
            ImageSource::Path(path) => path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output")
                .to_string(),
            ImageSource::Url(url) => {
                let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or("remote");
                let stem = last.split('.').next().unwrap_or("remote");
                if stem.is_empty() {
                    "remote".to_string()
                } else {
                    stem.to_string()
                }
            }
        }
    }

    /// Extension of the source file, defaulting to jpg. PNG inputs keep PNG
    /// outputs to preserve transparency.
    pub fn output_extension(&self) -> &'static str {
        let ext = match self {
            ImageSource::Path(path) => path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase()),
            ImageSource::Url(url) => url.rsplit('.').next().map(|e| e.to_lowercase()),
        };
        match ext.as_deref() {
            Some("png") => "png",
            _ => "jpg",
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(path) => write!(f, "{}", path.display()),
            ImageSource::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Check if a file is a supported image format
/// Supports: jpg, jpeg, png, webp, bmp, tiff, tif
pub fn is_supported_image_file(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        let ext_lower = ext.to_string_lossy().to_lowercase();
        matches!(
            ext_lower.as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp" | "tiff" | "tif"
        )
    } else {
        false
    }
}

/// Find all image files in a directory (non-recursive)
fn find_images_in_directory(dir_path: &Path) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();

    for entry in fs::read_dir(dir_path)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() && is_supported_image_file(&path) {
            image_files.push(path);
        }
    }

    // Sort for consistent ordering
    image_files.sort();
    Ok(image_files)
}

/// Resolve CLI sources into concrete inputs.
///
/// In strict mode an unusable source is an error; in permissive mode it is
/// logged and skipped.
pub fn collect_sources(sources: &[String], strict: bool) -> Result<Vec<ImageSource>> {
    let mut resolved = Vec::new();

    for source in sources {
        if source.starts_with("http://") || source.starts_with("https://") {
            resolved.push(ImageSource::Url(source.clone()));
            continue;
        }

        let source_path = Path::new(source);

        if source_path.is_file() {
            if is_supported_image_file(source_path) {
                resolved.push(ImageSource::Path(source_path.to_path_buf()));
            } else if strict {
                return Err(anyhow::anyhow!(
                    "File is not a supported image format: {}",
                    source_path.display()
                ));
            } else {
                log::warn!("Skipping unsupported file: {}", source_path.display());
            }
        } else if source_path.is_dir() {
            let dir_images = find_images_in_directory(source_path)?;
            resolved.extend(dir_images.into_iter().map(ImageSource::Path));
        } else if !source.contains('*') && !source.contains('?') && !source.contains('[') {
            // A plain path that doesn't exist
            if strict {
                return Err(anyhow::anyhow!("File does not exist: {source}"));
            }
            log::warn!("File does not exist: {source}");
        } else {
            // Glob pattern
            let mut matched = false;
            for entry in glob::glob(source)
                .with_context(|| format!("Invalid glob pattern: {source}"))?
            {
                let path = entry?;
                if path.is_file() && is_supported_image_file(&path) {
                    resolved.push(ImageSource::Path(path));
                    matched = true;
                }
            }
            if !matched {
                if strict {
                    return Err(anyhow::anyhow!("Glob pattern matched no images: {source}"));
                }
                log::warn!("Glob pattern matched no images: {source}");
            }
        }
    }

    Ok(resolved)
}

/// Load and validate one input. Input errors here reject the request before
/// any detection work happens.
pub fn load_image(source: &ImageSource) -> Result<DynamicImage> {
    let img = match source {
        ImageSource::Path(path) => image::open(path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?,
        ImageSource::Url(url) => fetch_image(url)?,
    };
    validate_dimensions(img)
}

fn fetch_image(url: &str) -> Result<DynamicImage> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client for image download")?;

    let bytes = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to download image: {url}"))?
        .error_for_status()
        .with_context(|| format!("Image download returned an error status: {url}"))?
        .bytes()
        .context("Failed to read image download body")?;

    image::load_from_memory(&bytes).with_context(|| format!("Invalid image data from {url}"))
}

/// Reject images too small to analyze; downscale very large ones so grid
/// work stays bounded.
fn validate_dimensions(img: DynamicImage) -> Result<DynamicImage> {
    let (width, height) = (img.width(), img.height());

    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        anyhow::bail!("Image too small for analysis: {width}x{height}");
    }

    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        log::debug!("Downscaling {width}x{height} image to fit {RESIZE_TARGET}px");
        Ok(img.thumbnail(RESIZE_TARGET, RESIZE_TARGET))
    } else {
        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_image_formats() {
        assert!(is_supported_image_file(Path::new("beach.jpg")));
        assert!(is_supported_image_file(Path::new("beach.JPEG")));
        assert!(is_supported_image_file(Path::new("beach.png")));
        assert!(is_supported_image_file(Path::new("beach.webp")));
        assert!(!is_supported_image_file(Path::new("beach.txt")));
        assert!(!is_supported_image_file(Path::new("beach")));
    }

    #[test]
    fn test_url_sources_pass_through() {
        let sources = vec!["https://example.com/photos/cove.jpg".to_string()];
        let resolved = collect_sources(&sources, true).unwrap();
        assert_eq!(
            resolved,
            vec![ImageSource::Url("https://example.com/photos/cove.jpg".to_string())]
        );
    }

    #[test]
    fn test_missing_file_errors_in_strict_mode() {
        let sources = vec!["definitely_not_here.jpg".to_string()];
        assert!(collect_sources(&sources, true).is_err());
        assert!(collect_sources(&sources, false).unwrap().is_empty());
    }

    #[test]
    fn test_source_stem() {
        assert_eq!(
            ImageSource::Path(PathBuf::from("/data/cove_1.jpg")).stem(),
            "cove_1"
        );
        assert_eq!(
            ImageSource::Url("https://example.com/photos/cove.jpg".to_string()).stem(),
            "cove"
        );
        assert_eq!(
            ImageSource::Url("https://example.com/snapshot".to_string()).stem(),
            "snapshot"
        );
    }

    #[test]
    fn test_undersized_image_rejected() {
        let img = DynamicImage::new_rgb8(80, 600);
        assert!(validate_dimensions(img).is_err());
    }

    #[test]
    fn test_oversized_image_downscaled() {
        let img = DynamicImage::new_rgb8(4200, 2100);
        let resized = validate_dimensions(img).unwrap();
        assert!(resized.width() <= RESIZE_TARGET && resized.height() <= RESIZE_TARGET);
    }

    #[test]
    fn test_normal_image_untouched() {
        let img = DynamicImage::new_rgb8(1600, 900);
        let validated = validate_dimensions(img).unwrap();
        assert_eq!((validated.width(), validated.height()), (1600, 900));
    }
}
