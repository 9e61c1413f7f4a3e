//! Export the run summary to JSON.

use std::fs::{self, File};
use std::path::Path;

use tracing::info;

use crate::domain::RunSummary;
use crate::error::AppError;

/// Write the summary as pretty-printed JSON, creating parent directories.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Io(format!("Failed to create directory '{}': {e}", parent.display()))
        })?;
    }

    let file = File::create(path)
        .map_err(|e| AppError::Io(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::Parse(format!("Failed to write summary JSON: {e}")))?;

    info!(path = %path.display(), "wrote summary");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::analyze;
    use crate::app::run_config;
    use crate::cli::{Cli, Command};
    use crate::data::sample_markets;
    use crate::domain::DataSource;
    use clap::Parser;

    fn read_summary_json(path: &Path) -> RunSummary {
        let file = File::open(path).unwrap();
        serde_json::from_reader(file).unwrap()
    }

    fn demo_summary() -> RunSummary {
        let cli = Cli::parse_from(["carry", "demo", "--asof", "2026-01-20"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        let cfg = run_config(&args.analysis, DataSource::Synthetic { seed: 5, noise: 0.0 });
        let (dom, fgn) = sample_markets(5, 0.0).unwrap();
        analyze(&cfg, dom, fgn).unwrap().summary
    }

    #[test]
    fn writes_and_reads_back_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("summary.json");
        let summary = demo_summary();

        write_summary_json(&path, &summary).unwrap();
        let back = read_summary_json(&path);
        assert_eq!(back.analysis_date, summary.analysis_date);
        assert_eq!(back.foreign.label, "BR");

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"real_carry\""));
        assert!(raw.contains("\"spread_stats\""));
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let err = write_summary_json(&blocker.join("summary.json"), &demo_summary()).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
