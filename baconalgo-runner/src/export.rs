//! Reporting and export — JSON and CSV artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade tape and equity curve for external analysis tools
//!
//! Unknown schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use baconalgo_core::{ExitReason, Trade};
use tracing::info;

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export closed trades as CSV.
///
/// Columns: symbol, direction, entry_bar, entry_time, entry_price, exit_bar,
/// exit_time, exit_price, size, profit, profit_pct, exit_reason
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "direction",
        "entry_bar",
        "entry_time",
        "entry_price",
        "exit_bar",
        "exit_time",
        "exit_price",
        "size",
        "profit",
        "profit_pct",
        "exit_reason",
    ])?;

    let opt = |v: Option<String>| v.unwrap_or_default();
    for t in trades {
        wtr.write_record([
            t.symbol().to_string(),
            t.direction().to_string(),
            opt(t.entry_bar().map(|b| b.to_string())),
            t.entry_time().to_string(),
            format!("{:.6}", t.entry_price()),
            opt(t.exit_bar().map(|b| b.to_string())),
            opt(t.exit_time().map(|ts| ts.to_string())),
            opt(t.exit_price().map(|p| format!("{p:.6}"))),
            format!("{:.6}", t.size()),
            opt(t.profit().map(|p| format!("{p:.2}"))),
            opt(t.profit_pct().map(|p| format!("{p:.2}"))),
            opt(t.exit_reason().map(|r| exit_reason_label(r).to_string())),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn exit_reason_label(reason: ExitReason) -> &'static str {
    match reason {
        ExitReason::Signal => "signal",
        ExitReason::EndOfData => "end_of_data",
    }
}

/// Export an equity curve as CSV. Point 0 is the initial balance; point k is
/// the balance after the k-th closed trade.
pub fn export_equity_csv(equity_curve: &[f64]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trade_index", "equity"])?;
    for (i, eq) in equity_curve.iter().enumerate() {
        wtr.write_record([&i.to_string(), &format!("{:.2}", eq)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates a directory named `{symbol}_{timestamp}/` under `output_dir`
/// (symbol characters outside `[A-Za-z0-9_-]` become `_`) containing:
/// - `manifest.json`: the full `BacktestResult`
/// - `trades.csv`: trade tape
/// - `equity.csv`: equity curve
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        sanitize_dir_component(&result.symbol),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_artifact(&run_dir.join("manifest.json"), &export_json(result)?)?;
    write_artifact(&run_dir.join("trades.csv"), &export_trades_csv(&result.trades)?)?;
    write_artifact(&run_dir.join("equity.csv"), &export_equity_csv(&result.equity_curve)?)?;

    info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Keep `[A-Za-z0-9_-]`; everything else (path separators, dots) becomes `_`.
fn sanitize_dir_component(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}
