//! Bar sources for the runner.
//!
//! A [`BarSource`] yields one validated, time-ordered [`BarSeries`]. CSV files
//! are the real-data path; [`VecBarSource`] wraps bars already in memory and
//! the synthetic generator lives in [`crate::synthetic`].

use std::path::{Path, PathBuf};

use baconalgo_core::{Bar, BarSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read CSV {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("row {row}: unparseable timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    #[error("data validation failed: {0}")]
    Validation(String),
}

/// Something that can produce a bar series.
pub trait BarSource {
    fn load(&self) -> Result<BarSeries, DataError>;
}

/// In-memory bars, validated on load like any other source.
#[derive(Debug, Clone)]
pub struct VecBarSource {
    pub series: BarSeries,
}

impl VecBarSource {
    pub fn new(series: BarSeries) -> Self {
        Self { series }
    }
}

impl BarSource for VecBarSource {
    fn load(&self) -> Result<BarSeries, DataError> {
        validate_bars(&self.series.bars)?;
        Ok(self.series.clone())
    }
}

/// CSV file with a `timestamp,open,high,low,close[,volume]` header.
///
/// The timestamp column is optional; values may be RFC 3339,
/// `YYYY-MM-DD HH:MM:SS`, or `YYYY-MM-DD`.
#[derive(Debug, Clone)]
pub struct CsvBarSource {
    pub path: PathBuf,
    pub symbol: String,
}

impl CsvBarSource {
    pub fn new(path: impl Into<PathBuf>, symbol: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            symbol: symbol.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    timestamp: Option<String>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

impl BarSource for CsvBarSource {
    fn load(&self) -> Result<BarSeries, DataError> {
        let bars = read_csv_bars(&self.path)?;
        info!(path = %self.path.display(), symbol = %self.symbol, bars = bars.len(), "loaded CSV bars");
        Ok(BarSeries::new(bars).with_symbol(self.symbol.clone()))
    }
}

/// Read and validate bars from a CSV file.
pub fn read_csv_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
    let csv_err = |source: csv::Error| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let mut bars = Vec::new();
    for (i, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = i + 1;
        let record = record.map_err(csv_err)?;
        let mut bar = Bar::new(record.open, record.high, record.low, record.close);
        if let Some(raw) = record.timestamp.as_deref().filter(|s| !s.is_empty()) {
            let ts = parse_timestamp(raw).ok_or_else(|| DataError::InvalidTimestamp {
                row,
                value: raw.to_string(),
            })?;
            bar = bar.with_timestamp(ts);
        }
        if let Some(volume) = record.volume {
            bar = bar.with_volume(volume);
        }
        bars.push(bar);
    }

    validate_bars(&bars)?;
    debug!(path = %path.display(), rows = bars.len(), "CSV parsed");
    Ok(bars)
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS`, or `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Reject insane OHLC rows and timestamps that go backwards.
///
/// Row numbers in errors are 1-based. Equal timestamps are allowed.
pub fn validate_bars(bars: &[Bar]) -> Result<(), DataError> {
    let mut prev_ts: Option<DateTime<Utc>> = None;
    for (i, bar) in bars.iter().enumerate() {
        let row = i + 1;
        if !bar.is_sane() {
            return Err(DataError::Validation(format!(
                "row {row}: insane bar (open={}, high={}, low={}, close={})",
                bar.open, bar.high, bar.low, bar.close
            )));
        }
        if let Some(ts) = bar.timestamp {
            if let Some(prev) = prev_ts {
                if ts < prev {
                    return Err(DataError::Validation(format!(
                        "row {row}: timestamp {} is before previous {}",
                        ts.to_rfc3339(),
                        prev.to_rfc3339()
                    )));
                }
            }
            prev_ts = Some(ts);
        }
    }
    Ok(())
}
