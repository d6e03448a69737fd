//! Configuration layer separating CLI arguments from internal engine
//! parameters.
//!
//! CLI structs own argument parsing, help text, and validation; the internal
//! configs own processing parameters. Engine constants (acceptance
//! thresholds, scoring coefficients) live in immutable parameter structs
//! built once at startup and passed explicitly.

use clap::Parser;
use clap_verbosity_flag::Verbosity;
use serde::Serialize;

use crate::scene::BeachSize;

/// Parse probability value (must be between 0.0 and 1.0)
pub fn parse_probability(s: &str) -> Result<f32, String> {
    let val = s
        .parse::<f32>()
        .map_err(|_| format!("Invalid number: '{s}'"))?;
    if !(0.0..=1.0).contains(&val) {
        return Err(format!("Must be between 0.0 and 1.0, got {val}"));
    }
    Ok(val)
}

/// Global CLI arguments that apply to all shoreline commands
#[derive(Parser, Debug, Clone)]
pub struct GlobalArgs {
    /// Global output directory (overrides default placement next to input)
    #[arg(long, global = true)]
    pub output_dir: Option<String>,

    /// Verbosity level (-q/--quiet, -v/-vv/-vvv/-vvvv for info/debug/trace)
    #[command(flatten)]
    pub verbosity: Verbosity,

    /// Warn instead of erroring when an input cannot be processed
    #[arg(long, global = true)]
    pub permissive: bool,

    /// Disable colored output (also respects NO_COLOR and SHORELINE_NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// CLI command for the full cleanliness analysis
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeCommand {
    /// Image files, directories, glob patterns, or http(s) URLs
    #[arg(value_name = "IMAGES_DIRS_OR_URLS", required = true)]
    pub sources: Vec<String>,

    /// Base URL of the similarity oracle service (or SHORELINE_ORACLE_URL)
    #[arg(long)]
    pub oracle_url: Option<String>,

    /// Recommendation service endpoint (or SHORELINE_RECOMMEND_URL).
    /// Falls back to built-in guidance when unset or unreachable.
    #[arg(long)]
    pub recommend_url: Option<String>,

    /// Save an annotated copy of each image with detection boxes drawn
    #[arg(long)]
    pub annotate: bool,

    /// Similarity-grid activation threshold for localization (0.0-1.0)
    #[arg(long, default_value = "0.4", value_parser = parse_probability)]
    pub grid_threshold: f32,

    /// IoU threshold for overlap suppression (0.0-1.0)
    #[arg(long, default_value = "0.5", value_parser = parse_probability)]
    pub iou_threshold: f32,
}

/// CLI command producing only annotated images, no scoring
#[derive(Parser, Debug, Clone)]
pub struct AnnotateCommand {
    /// Image files, directories, glob patterns, or http(s) URLs
    #[arg(value_name = "IMAGES_DIRS_OR_URLS", required = true)]
    pub sources: Vec<String>,

    /// Base URL of the similarity oracle service (or SHORELINE_ORACLE_URL)
    #[arg(long)]
    pub oracle_url: Option<String>,

    /// Similarity-grid activation threshold for localization (0.0-1.0)
    #[arg(long, default_value = "0.4", value_parser = parse_probability)]
    pub grid_threshold: f32,

    /// IoU threshold for overlap suppression (0.0-1.0)
    #[arg(long, default_value = "0.5", value_parser = parse_probability)]
    pub iou_threshold: f32,
}

/// Base configuration common to all commands
#[derive(Debug, Clone, Serialize)]
pub struct BaseConfig {
    /// Input sources (files, directories, globs, or URLs)
    pub sources: Vec<String>,
    /// Optional output directory override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Fail on the first bad input instead of warning and continuing.
    /// Opposite of `--permissive`.
    pub strict: bool,
}

impl From<GlobalArgs> for BaseConfig {
    fn from(global: GlobalArgs) -> Self {
        Self {
            sources: Vec::new(), // Sources come from the command, not global args
            output_dir: global.output_dir,
            strict: !global.permissive,
        }
    }
}

/// Detection-side engine constants.
///
/// The acceptance bar drops with severity so rare-but-dangerous categories
/// (chemical containers, fishing gear) are not filtered by the same
/// threshold as common benign litter.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DetectionParams {
    pub confidence_base: f64,
    pub confidence_floor: f64,
    pub severity_slope: f64,
    pub severity_midpoint: f64,
    /// Activation threshold when binarizing a similarity grid.
    pub grid_threshold: f32,
    /// Minimum bounding-rectangle side length, in pixels.
    pub min_region_size: u32,
    /// IoU above which overlapping candidate regions are suppressed.
    pub iou_threshold: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            confidence_base: 0.15,
            confidence_floor: 0.05,
            severity_slope: 0.01,
            severity_midpoint: 5.0,
            grid_threshold: 0.4,
            min_region_size: 20,
            iou_threshold: 0.5,
        }
    }
}

impl DetectionParams {
    /// Category acceptance bar: `max(floor, base - slope * (severity - midpoint))`.
    /// A confidence must strictly exceed this to accept the category.
    pub fn effective_threshold(&self, severity: u8) -> f64 {
        let adjusted = self.confidence_base
            - self.severity_slope * (severity as f64 - self.severity_midpoint);
        adjusted.max(self.confidence_floor)
    }
}

/// Scoring-side engine constants.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoringParams {
    pub base_score: f64,
    pub density_coefficient: f64,
    pub severity_pivot: f64,
    pub severity_spread: f64,
    pub natural_bonus_cap: f64,
    pub small_beach_multiplier: f64,
    pub medium_beach_multiplier: f64,
    pub large_beach_multiplier: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            base_score: 100.0,
            density_coefficient: 5.0,
            severity_pivot: 7.0,
            severity_spread: 2.0,
            natural_bonus_cap: 10.0,
            small_beach_multiplier: 1.1,
            medium_beach_multiplier: 1.0,
            large_beach_multiplier: 0.9,
        }
    }
}

impl ScoringParams {
    /// Larger beaches tolerate more absolute litter before the same penalty
    /// applies.
    pub fn size_multiplier(&self, size: BeachSize) -> f64 {
        match size {
            BeachSize::Small => self.small_beach_multiplier,
            BeachSize::Medium => self.medium_beach_multiplier,
            BeachSize::Large => self.large_beach_multiplier,
        }
    }
}

/// Internal configuration for the analyze command
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisConfig {
    #[serde(skip)]
    pub base: BaseConfig,
    pub oracle_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommend_url: Option<String>,
    pub annotate: bool,
    pub detection: DetectionParams,
    pub scoring: ScoringParams,
}

/// Internal configuration for the annotate command
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationConfig {
    #[serde(skip)]
    pub base: BaseConfig,
    pub oracle_url: String,
    pub detection: DetectionParams,
}

fn resolve_oracle_url(cli_value: Option<String>) -> Result<String, String> {
    cli_value
        .or_else(|| std::env::var("SHORELINE_ORACLE_URL").ok())
        .ok_or_else(|| {
            "No similarity oracle configured. Pass --oracle-url or set SHORELINE_ORACLE_URL."
                .to_string()
        })
}

impl AnalysisConfig {
    /// Create configuration from global args and command-specific args
    pub fn from_args(global: GlobalArgs, cmd: AnalyzeCommand) -> Result<Self, String> {
        let mut base: BaseConfig = global.into();
        base.sources = cmd.sources;

        let oracle_url = resolve_oracle_url(cmd.oracle_url)?;
        let recommend_url = cmd
            .recommend_url
            .or_else(|| std::env::var("SHORELINE_RECOMMEND_URL").ok());

        Ok(Self {
            base,
            oracle_url,
            recommend_url,
            annotate: cmd.annotate,
            detection: DetectionParams {
                grid_threshold: cmd.grid_threshold,
                iou_threshold: cmd.iou_threshold,
                ..Default::default()
            },
            scoring: ScoringParams::default(),
        })
    }
}

impl AnnotationConfig {
    /// Create configuration from global args and command-specific args
    pub fn from_args(global: GlobalArgs, cmd: AnnotateCommand) -> Result<Self, String> {
        let mut base: BaseConfig = global.into();
        base.sources = cmd.sources;

        Ok(Self {
            base,
            oracle_url: resolve_oracle_url(cmd.oracle_url)?,
            detection: DetectionParams {
                grid_threshold: cmd.grid_threshold,
                iou_threshold: cmd.iou_threshold,
                ..Default::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_args() -> GlobalArgs {
        GlobalArgs {
            output_dir: None,
            verbosity: Verbosity::new(0, 0),
            permissive: false,
            no_color: false,
        }
    }

    #[test]
    fn test_global_args_conversion() {
        let global = GlobalArgs {
            output_dir: Some("/tmp".to_string()),
            verbosity: Verbosity::new(2, 0),
            permissive: true,
            no_color: false,
        };

        let config: BaseConfig = global.into();

        assert_eq!(config.sources, Vec::<String>::new());
        assert_eq!(config.output_dir, Some("/tmp".to_string()));
        assert!(!config.strict); // permissive=true -> strict=false
    }

    #[test]
    fn test_analyze_command_conversion() {
        let cmd = AnalyzeCommand {
            sources: vec!["beach.jpg".to_string()],
            oracle_url: Some("http://localhost:8000".to_string()),
            recommend_url: None,
            annotate: true,
            grid_threshold: 0.3,
            iou_threshold: 0.6,
        };

        let config = AnalysisConfig::from_args(global_args(), cmd).unwrap();

        assert_eq!(config.base.sources, vec!["beach.jpg"]);
        assert!(config.base.strict); // permissive=false -> strict=true
        assert_eq!(config.oracle_url, "http://localhost:8000");
        assert!(config.annotate);
        assert_eq!(config.detection.grid_threshold, 0.3);
        assert_eq!(config.detection.iou_threshold, 0.6);
        // Non-CLI parameters stay at their defaults
        assert_eq!(config.detection.min_region_size, 20);
        assert_eq!(config.scoring.base_score, 100.0);
    }

    #[test]
    fn test_analyze_command_requires_oracle() {
        // Guard against an ambient SHORELINE_ORACLE_URL leaking into the test
        if std::env::var("SHORELINE_ORACLE_URL").is_ok() {
            return;
        }
        let cmd = AnalyzeCommand {
            sources: vec!["beach.jpg".to_string()],
            oracle_url: None,
            recommend_url: None,
            annotate: false,
            grid_threshold: 0.4,
            iou_threshold: 0.5,
        };

        let result = AnalysisConfig::from_args(global_args(), cmd);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("oracle"));
    }

    #[test]
    fn test_detection_params_defaults() {
        let params = DetectionParams::default();

        assert_eq!(params.confidence_base, 0.15);
        assert_eq!(params.confidence_floor, 0.05);
        assert_eq!(params.severity_slope, 0.01);
        assert_eq!(params.severity_midpoint, 5.0);
        assert_eq!(params.grid_threshold, 0.4);
        assert_eq!(params.min_region_size, 20);
        assert_eq!(params.iou_threshold, 0.5);
    }

    #[test]
    fn test_effective_threshold_drops_with_severity() {
        let params = DetectionParams::default();

        // severity 5 sits at the midpoint: bar equals the base
        assert!((params.effective_threshold(5) - 0.15).abs() < 1e-9);
        // severity 10: 0.15 - 0.01 * 5 = 0.10
        assert!((params.effective_threshold(10) - 0.10).abs() < 1e-9);
        // severity 1: 0.15 + 0.01 * 4 = 0.19
        assert!((params.effective_threshold(1) - 0.19).abs() < 1e-9);
    }

    #[test]
    fn test_effective_threshold_floor() {
        let params = DetectionParams {
            severity_slope: 0.05,
            ..Default::default()
        };
        // 0.15 - 0.05 * 5 = -0.10, clamped up to the floor
        assert_eq!(params.effective_threshold(10), params.confidence_floor);
    }

    #[test]
    fn test_scoring_params_defaults() {
        let params = ScoringParams::default();

        assert_eq!(params.base_score, 100.0);
        assert_eq!(params.density_coefficient, 5.0);
        assert_eq!(params.severity_pivot, 7.0);
        assert_eq!(params.severity_spread, 2.0);
        assert_eq!(params.natural_bonus_cap, 10.0);
        assert_eq!(params.size_multiplier(BeachSize::Small), 1.1);
        assert_eq!(params.size_multiplier(BeachSize::Medium), 1.0);
        assert_eq!(params.size_multiplier(BeachSize::Large), 0.9);
    }

    #[test]
    fn test_parse_probability() {
        assert_eq!(parse_probability("0.0"), Ok(0.0));
        assert_eq!(parse_probability("0.5"), Ok(0.5));
        assert_eq!(parse_probability("1.0"), Ok(1.0));

        assert!(parse_probability("-0.5").is_err());
        assert!(parse_probability("2.0").is_err());
        assert!(parse_probability("invalid").is_err());
    }
}
