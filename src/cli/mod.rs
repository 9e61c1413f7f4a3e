//! Command-line parsing for the carry analyzer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! modeling/math code. Every flag can also be set through a `CARRY_*`
//! environment variable (a `.env` file is honoured).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "carry", version, about = "Sovereign NSS curves, real carry and Black-76 bond options")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit both curves from CSV files and report carry and option prices.
    Run(RunArgs),
    /// Run the same analysis on synthetic NSS curves.
    Demo(DemoArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Domestic curve CSV (`maturity,yield`).
    #[arg(long, env = "CARRY_DOMESTIC", default_value = "data/yields_us.csv")]
    pub domestic: PathBuf,

    /// Foreign curve CSV (`maturity,yield`).
    #[arg(long, env = "CARRY_FOREIGN", default_value = "data/yields_br.csv")]
    pub foreign: PathBuf,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Random seed for the synthetic noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Noise standard deviation in decimal yield (0.0005 = 5bp).
    #[arg(long, default_value_t = 0.0005)]
    pub noise: f64,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/// Options shared by every analysis command.
#[derive(Debug, Args, Clone)]
pub struct AnalysisArgs {
    /// Label for the domestic market.
    #[arg(long, env = "CARRY_DOMESTIC_LABEL", default_value = "US")]
    pub domestic_label: String,

    /// Label for the foreign market.
    #[arg(long, env = "CARRY_FOREIGN_LABEL", default_value = "BR")]
    pub foreign_label: String,

    /// Analysis date (YYYY-MM-DD); defaults to today.
    #[arg(long, env = "CARRY_ASOF")]
    pub asof: Option<NaiveDate>,

    /// Domestic inflation assumption (decimal).
    #[arg(long, env = "CARRY_INFL_DOMESTIC", default_value_t = 0.025)]
    pub infl_domestic: f64,

    /// Foreign inflation assumption (decimal).
    #[arg(long, env = "CARRY_INFL_FOREIGN", default_value_t = 0.055)]
    pub infl_foreign: f64,

    /// Tenor (years) for the real carry and the option underlying.
    #[arg(long, env = "CARRY_TARGET_TENOR", default_value_t = 10.0)]
    pub target_tenor: f64,

    /// Option expiry in years.
    #[arg(long, env = "CARRY_EXPIRY", default_value_t = 1.0)]
    pub expiry: f64,

    /// Flat Black volatility.
    #[arg(long, env = "CARRY_VOL", default_value_t = 0.15)]
    pub vol: f64,

    /// Option strike; defaults to the forward (ATM).
    #[arg(long, env = "CARRY_STRIKE")]
    pub strike: Option<f64>,

    /// Discount rate; defaults to the forward.
    #[arg(long, env = "CARRY_RATE")]
    pub rate: Option<f64>,

    /// Optimizer iteration cap per curve.
    #[arg(long = "max-iter", env = "CARRY_MAX_ITER", default_value_t = 2000)]
    pub max_iter: usize,

    /// Summary JSON path.
    #[arg(long, env = "CARRY_OUTPUT", default_value = "results/summary.json")]
    pub output: PathBuf,

    /// Do not write the summary JSON.
    #[arg(long)]
    pub no_export: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let cli = Cli::parse_from(["carry", "run"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.analysis.target_tenor, 10.0);
        assert_eq!(args.analysis.vol, 0.15);
        assert!(args.analysis.strike.is_none());
    }

    #[test]
    fn demo_parses_overrides() {
        let cli = Cli::parse_from([
            "carry", "demo", "--seed", "7", "--strike", "0.12", "--asof", "2026-01-20", "--no-export",
        ]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.seed, 7);
        assert_eq!(args.analysis.strike, Some(0.12));
        assert_eq!(args.analysis.asof, NaiveDate::from_ymd_opt(2026, 1, 20));
        assert!(args.analysis.no_export);
    }
}
