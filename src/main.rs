use clap::Parser;
use env_logger::Builder;
use env_logger::Env;
use log::{error, info, Level};
use std::io::Write;

use shoreline::analysis::{run_analysis, run_annotation};
use shoreline::color_utils::{colors, init_color_config};
use shoreline::config::{
    AnalysisConfig, AnalyzeCommand, AnnotateCommand, AnnotationConfig, GlobalArgs, ScoringParams,
};
use shoreline::similarity::RemoteOracle;
use shoreline::taxonomy::litter_taxonomy;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Score beach cleanliness from photographs
    Analyze(AnalyzeCommand),

    /// Draw detection boxes on images without scoring
    Annotate(AnnotateCommand),

    /// Print the litter taxonomy and scoring constants as JSON
    Categories,

    /// Show version information
    Version,
}

#[derive(Parser)]
#[command(name = "shoreline")]
#[command(about = "Beach cleanliness analysis toolkit")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn get_log_level_from_verbosity(
    verbosity: &clap_verbosity_flag::Verbosity<clap_verbosity_flag::ErrorLevel>,
) -> log::LevelFilter {
    let base_level = verbosity.log_level_filter();
    let adjusted_level = match base_level {
        log::LevelFilter::Off => log::LevelFilter::Off, // -qq -> OFF
        log::LevelFilter::Error => log::LevelFilter::Warn, // default -> WARN
        log::LevelFilter::Warn => log::LevelFilter::Info, // -v -> INFO
        log::LevelFilter::Info => log::LevelFilter::Debug, // -vv -> DEBUG
        log::LevelFilter::Debug => log::LevelFilter::Trace, // -vvv -> TRACE
        log::LevelFilter::Trace => log::LevelFilter::Trace, // -vvvv -> TRACE (max)
    };

    if verbosity.is_silent() {
        log::LevelFilter::Error // -q -> ERROR
    } else {
        adjusted_level
    }
}

fn init_logger(cli: &Cli) {
    // If the user didn't pass -v/-q and RUST_LOG is set, honor the env var.
    let use_env = !cli.global.verbosity.is_present() && std::env::var_os("RUST_LOG").is_some();

    let mut logger = if use_env {
        Builder::from_env(Env::default())
    } else {
        let mut b = Builder::new();
        b.filter_level(get_log_level_from_verbosity(&cli.global.verbosity));
        b
    };

    logger
        .format(|buf, record| {
            let level_str = match record.level() {
                Level::Error => colors::error_level("ERROR"),
                Level::Warn => colors::warning_level("WARN"),
                Level::Info => colors::info_level("INFO"),
                Level::Debug => colors::debug_level("DEBUG"),
                Level::Trace => colors::trace_level("TRACE"),
            };
            writeln!(buf, "[{}] {}", level_str, record.args())
        })
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_color_config(cli.global.no_color);
    init_logger(&cli);

    match &cli.command {
        Some(Commands::Analyze(analyze_cmd)) => {
            let sources_desc = if analyze_cmd.sources.len() == 1 {
                analyze_cmd.sources[0].clone()
            } else {
                format!("{} inputs", analyze_cmd.sources.len())
            };

            info!(
                "Cleanliness analysis: {} | grid threshold: {} | IoU: {}",
                sources_desc, analyze_cmd.grid_threshold, analyze_cmd.iou_threshold
            );

            let config = match AnalysisConfig::from_args(cli.global.clone(), analyze_cmd.clone()) {
                Ok(config) => config,
                Err(e) => {
                    error!("{e}");
                    std::process::exit(2);
                }
            };

            let oracle = match RemoteOracle::new(&config.oracle_url) {
                Ok(oracle) => oracle,
                Err(e) => {
                    error!("{e}");
                    std::process::exit(2);
                }
            };

            if let Err(e) = run_analysis(&config, &oracle) {
                error!("Analysis failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Annotate(annotate_cmd)) => {
            let config = match AnnotationConfig::from_args(cli.global.clone(), annotate_cmd.clone())
            {
                Ok(config) => config,
                Err(e) => {
                    error!("{e}");
                    std::process::exit(2);
                }
            };

            let oracle = match RemoteOracle::new(&config.oracle_url) {
                Ok(oracle) => oracle,
                Err(e) => {
                    error!("{e}");
                    std::process::exit(2);
                }
            };

            if let Err(e) = run_annotation(&config, &oracle) {
                error!("Annotation failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Categories) => {
            let metadata = serde_json::json!({
                "trash_categories": litter_taxonomy(),
                "scoring": ScoringParams::default(),
            });
            match serde_json::to_string_pretty(&metadata) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    error!("Failed to serialize categories: {e}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Version) => {
            println!("shoreline v{}", env!("CARGO_PKG_VERSION"));
            println!("Repository: {}", env!("CARGO_PKG_REPOSITORY"));
        }
        None => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            cmd.print_help().unwrap();
        }
    }
}
