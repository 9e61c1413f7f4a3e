//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging and loads `.env`
//! - parses CLI arguments into a `RunConfig`
//! - runs the analysis pipeline
//! - prints the summary and writes the JSON export

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{AnalysisArgs, Command};
use crate::domain::{DataSource, MarketConfig, OptionConfig, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `carry` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let config = match cli.command {
        Command::Run(args) => run_config(
            &args.analysis,
            DataSource::Csv {
                domestic: args.domestic,
                foreign: args.foreign,
            },
        ),
        Command::Demo(args) => run_config(
            &args.analysis,
            DataSource::Synthetic {
                seed: args.seed,
                noise: args.noise,
            },
        ),
    };

    let out = pipeline::run_analysis(&config)?;
    println!("{}", crate::report::format_run_summary(&out.summary));

    if let Some(path) = &config.output {
        crate::io::write_summary_json(path, &out.summary)?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so stdout carries only the report.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run_config(args: &AnalysisArgs, source: DataSource) -> RunConfig {
    RunConfig {
        asof_date: args
            .asof
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        source,
        domestic: MarketConfig {
            label: args.domestic_label.clone(),
            inflation: args.infl_domestic,
        },
        foreign: MarketConfig {
            label: args.foreign_label.clone(),
            inflation: args.infl_foreign,
        },
        target_tenor: args.target_tenor,
        option: OptionConfig {
            expiry: args.expiry,
            volatility: args.vol,
            strike: args.strike,
            rate: args.rate,
        },
        max_iterations: args.max_iter,
        output: (!args.no_export).then(|| args.output.clone()),
    }
}

/// Rewrite argv so a bare `carry` (or `carry --flags`) means `carry run`.
///
/// Rules:
/// - `carry`                       -> `carry run`
/// - `carry --vol 0.2 ...`         -> `carry run --vol 0.2 ...`
/// - `carry --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if matches!(arg1.as_str(), "run" | "demo") {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_run() {
        assert_eq!(rewrite_args(argv(&["carry"])), argv(&["carry", "run"]));
        assert_eq!(
            rewrite_args(argv(&["carry", "--vol", "0.2"])),
            argv(&["carry", "run", "--vol", "0.2"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["carry", "demo"])), argv(&["carry", "demo"]));
        assert_eq!(rewrite_args(argv(&["carry", "--help"])), argv(&["carry", "--help"]));
    }

    #[test]
    fn config_from_args() {
        let cli = Cli::parse_from(["carry", "demo", "--asof", "2026-01-20", "--no-export", "--max-iter", "50"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        let cfg = run_config(&args.analysis, DataSource::Synthetic { seed: args.seed, noise: args.noise });
        assert_eq!(cfg.asof_date, chrono::NaiveDate::from_ymd_opt(2026, 1, 20).unwrap());
        assert_eq!(cfg.max_iterations, 50);
        assert!(cfg.output.is_none());
        assert_eq!(cfg.foreign.label, "BR");
        assert_eq!(cfg.foreign.inflation, 0.055);
    }
}
