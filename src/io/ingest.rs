//! CSV ingest and normalization.
//!
//! Turns a `maturity,yield` CSV into a validated `ObservationSet`.
//!
//! - Headers are matched case-insensitively (BOM tolerant); extra columns are ignored.
//! - Bad rows are skipped and reported with their line number.
//! - Percent quotes are detected once per file: if any yield exceeds `1.0` the
//!   whole column is divided by 100.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{Observation, ObservationSet};
use crate::error::AppError;

/// Yields above this are treated as whole percentages.
const PERCENT_THRESHOLD: f64 = 1.0;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated observations plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedCurve {
    pub observations: ObservationSet,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Whether percent quotes were rescaled to decimals.
    pub percent_scaled: bool,
}

/// Load a yield curve CSV from disk.
pub fn load_yield_csv(path: &Path) -> Result<IngestedCurve, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::Io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let curve = read_yield_csv(file)?;

    debug!(
        path = %path.display(),
        rows_read = curve.rows_read,
        rows_used = curve.observations.len(),
        percent_scaled = curve.percent_scaled,
        "loaded yield curve"
    );
    Ok(curve)
}

/// Parse a yield curve CSV from any reader.
pub fn read_yield_csv<R: Read>(reader: R) -> Result<IngestedCurve, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Parse(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let maturity_col = *header_map
        .get("maturity")
        .ok_or_else(|| AppError::Parse("Missing required column: `maturity`".to_string()))?;
    let yield_col = *header_map
        .get("yield")
        .ok_or_else(|| AppError::Parse("Missing required column: `yield`".to_string()))?;

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, maturity_col, yield_col) {
            Ok(point) => points.push(point),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for err in &row_errors {
        warn!(line = err.line, "skipping row: {}", err.message);
    }

    if points.is_empty() {
        return Err(AppError::NoData(format!(
            "No valid rows in CSV ({rows_read} read, {} rejected).",
            row_errors.len()
        )));
    }

    let percent_scaled = normalize_percent(&mut points);
    let observations = ObservationSet::from_observations(points)?;

    Ok(IngestedCurve {
        observations,
        row_errors,
        rows_read,
        percent_scaled,
    })
}

/// Rescale whole-percentage yields to decimals. Returns whether scaling happened.
pub fn normalize_percent(points: &mut [Observation]) -> bool {
    let max = points.iter().map(|p| p.yield_).fold(f64::NEG_INFINITY, f64::max);
    if max > PERCENT_THRESHOLD {
        for p in points.iter_mut() {
            p.yield_ /= 100.0;
        }
        true
    } else {
        false
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, maturity_col: usize, yield_col: usize) -> Result<Observation, String> {
    let maturity = parse_f64(record, maturity_col, "maturity")?;
    let yield_ = parse_f64(record, yield_col, "yield")?;

    if !(maturity.is_finite() && maturity > 0.0) {
        return Err(format!("maturity must be finite and > 0, got {maturity}"));
    }
    if !yield_.is_finite() {
        return Err(format!("yield must be finite, got {yield_}"));
    }
    Ok(Observation { maturity, yield_ })
}

fn parse_f64(record: &StringRecord, col: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(col)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing `{name}`"))?;
    raw.parse::<f64>()
        .map_err(|_| format!("invalid `{name}` value '{raw}'"))
}
