//! Integration tests for the runner: config files on disk, CSV bars,
//! sweeps, and artifact persistence.

use std::path::Path;

use baconalgo_core::ExitReason;
use baconalgo_runner::config::BacktestConfig;
use baconalgo_runner::data_loader::{BarSource, CsvBarSource, DataError};
use baconalgo_runner::export::{load_artifacts, save_artifacts};
use baconalgo_runner::runner::run_single_backtest;
use baconalgo_runner::sweep::{run_sweep, SweepGrid};
use baconalgo_runner::synthetic::generate_bars;
use baconalgo_runner::RunError;
use proptest::prelude::*;

// ── Helpers ──

fn write_config(dir: &Path, strategy: &str) -> std::path::PathBuf {
    let config = format!(
        r#"
[backtest]
symbol = "TEST"
initial_balance = 10000.0

[strategy]
{strategy}

[data]
type = "csv"
path = "bars.csv"
"#
    );
    let path = dir.join("backtest.toml");
    std::fs::write(&path, config).unwrap();
    path
}

/// Timestamps must not go backwards, so give every row its own day.
fn write_monotonic_csv(path: &Path, closes: &[f64]) {
    let mut content = String::from("timestamp,open,high,low,close\n");
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for (i, &c) in closes.iter().enumerate() {
        let day = start + chrono::Duration::days(i as i64);
        content.push_str(&format!("{day},{c},{c},{c},{c}\n"));
    }
    std::fs::write(path, content).unwrap();
}

fn trend_closes() -> Vec<f64> {
    (0..40)
        .map(|i| if i < 20 { 100.0 + i as f64 } else { 140.0 - i as f64 })
        .collect()
}

// ── End-to-end runs ──

#[test]
fn config_file_resolves_relative_csv_path() {
    let dir = tempfile::tempdir().unwrap();
    write_monotonic_csv(&dir.path().join("bars.csv"), &trend_closes());
    let config_path = write_config(dir.path(), r#"type = "buy_and_hold""#);

    let config = BacktestConfig::from_file(&config_path).unwrap();
    let result = run_single_backtest(&config).unwrap();

    assert_eq!(result.symbol, "TEST");
    assert_eq!(result.strategy, "buy_and_hold");
    assert_eq!(result.bar_count, 40);
    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.entry_bar(), Some(0));
    assert_eq!(trade.exit_bar(), Some(39));
    assert_eq!(trade.exit_reason(), Some(ExitReason::EndOfData));
}

#[test]
fn ma_crossover_on_csv_trend() {
    let dir = tempfile::tempdir().unwrap();
    write_monotonic_csv(&dir.path().join("bars.csv"), &trend_closes());
    let config_path = write_config(
        dir.path(),
        "type = \"ma_crossover\"\nfast = 3\nslow = 10",
    );

    let config = BacktestConfig::from_file(&config_path).unwrap();
    let result = run_single_backtest(&config).unwrap();

    assert_eq!(result.strategy, "ma_cross_3_10");
    assert!(!result.trades.is_empty());
    assert_eq!(result.equity_curve.len(), result.trades.len() + 1);
    let final_balance = *result.equity_curve.last().unwrap();
    let profit: f64 = result.trades.iter().filter_map(|t| t.profit()).sum();
    assert!((final_balance - 10_000.0 - profit).abs() < 1e-6);
}

#[test]
fn insane_csv_row_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    std::fs::write(
        &csv,
        "timestamp,open,high,low,close\n2024-01-01,10,11,9,10\n2024-01-02,10,8,12,10\n",
    )
    .unwrap();

    let err = CsvBarSource::new(&csv, "BAD").load().unwrap_err();
    assert!(matches!(err, DataError::Validation(_)));
    assert!(err.to_string().contains("row 2"), "{err}");
}

#[test]
fn missing_csv_surfaces_as_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), r#"type = "always_flat""#);
    let config = BacktestConfig::from_file(&config_path).unwrap();

    let err = run_single_backtest(&config).unwrap_err();
    assert!(matches!(err, RunError::Data(DataError::Csv { .. })), "{err}");
}

// ── Sweep ──

#[test]
fn sweep_ranks_by_sharpe() {
    let config = BacktestConfig::from_toml_str(
        r#"
[backtest]
symbol = "SYN"

[data]
type = "synthetic"
bars = 300
seed = 11
"#,
    )
    .unwrap();
    let grid = SweepGrid {
        fast_periods: vec![3, 5, 10],
        slow_periods: vec![10, 20],
    };

    let entries = run_sweep(&config, &grid).unwrap();
    assert_eq!(entries.len(), 5);
    for pair in entries.windows(2) {
        assert!(pair[0].metrics.sharpe_ratio >= pair[1].metrics.sharpe_ratio);
    }
    let mut ids: Vec<_> = entries.iter().map(|e| e.run_id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5, "each grid point has its own run id");
}

// ── Artifacts ──

#[test]
fn artifacts_roundtrip_through_disk() {
    let config = BacktestConfig::from_toml_str(
        r#"
[backtest]
symbol = "SYN"

[strategy]
type = "ma_crossover"

[data]
type = "synthetic"
bars = 200
"#,
    )
    .unwrap();
    let result = run_single_backtest(&config).unwrap();

    let out = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&result, out.path()).unwrap();
    assert!(run_dir.join("manifest.json").exists());
    assert!(run_dir.join("equity.csv").exists());

    let trades_csv = std::fs::read_to_string(run_dir.join("trades.csv")).unwrap();
    assert_eq!(trades_csv.lines().count(), result.trades.len() + 1);

    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.run_id, result.run_id);
    assert_eq!(loaded.trades.len(), result.trades.len());
    assert_eq!(loaded.metrics.total_trades, result.metrics.total_trades);
    assert!((loaded.metrics.final_balance - result.metrics.final_balance).abs() < 1e-9);
}

// ── Synthetic generation ──

proptest! {
    #[test]
    fn synthetic_bars_are_always_valid(n in 0usize..400, seed in any::<u64>(), start in 1.0f64..1000.0) {
        let bars = generate_bars(n, seed, start);
        prop_assert_eq!(bars.len(), n);
        prop_assert!(baconalgo_runner::data_loader::validate_bars(&bars).is_ok());
        for pair in bars.windows(2) {
            prop_assert!((pair[1].open - pair[0].close).abs() < 1e-9);
        }
    }
}
