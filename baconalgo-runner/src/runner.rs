//! Backtest runner — wires together config, bar source, strategy, and engine.
//!
//! Two entry points:
//! - `run_single_backtest()`: loads bars from the configured source, then runs. Used by CLI.
//! - `run_backtest_from_series()`: takes pre-loaded bars. Used by sweeps.

use baconalgo_core::{BacktestError, Backtester, BarSeries, PerformanceMetrics, Strategy, Trade};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::DataError;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub dataset_hash: String,
    pub symbol: String,
    pub strategy: String,
    pub bar_count: usize,
    pub initial_balance: f64,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<f64>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a single backtest from a config, loading bars from its data source.
pub fn run_single_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let series = config.bar_source().load()?;
    run_backtest_from_series(config, &series)
}

/// Run a backtest on pre-loaded bars. No I/O.
///
/// The config is validated here too, so configs built in code fail with
/// [`RunError::Config`] instead of reaching strategy construction.
pub fn run_backtest_from_series(
    config: &BacktestConfig,
    series: &BarSeries,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let strategy = config.build_strategy();
    let mut engine = Backtester::new(config.engine_config());
    let metrics = engine.run(series, strategy.as_ref())?;

    let result = BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id()?,
        dataset_hash: compute_dataset_hash(series),
        symbol: series.symbol().to_string(),
        strategy: strategy.name().to_string(),
        bar_count: series.len(),
        initial_balance: engine.initial_balance(),
        metrics,
        trades: engine.trades().to_vec(),
        equity_curve: engine.equity_curve().to_vec(),
    };
    info!(
        run_id = %result.run_id,
        symbol = %result.symbol,
        strategy = %result.strategy,
        trades = result.metrics.total_trades,
        "run finished"
    );
    Ok(result)
}

/// BLAKE3 over symbol, timestamps, and OHLCV values in bar order.
///
/// The symbol is length-prefixed and each optional field carries a presence
/// byte, so distinct series never feed the hasher the same bytes. Timestamps
/// hash at microsecond resolution.
pub fn compute_dataset_hash(series: &BarSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    let symbol = series.symbol().as_bytes();
    hasher.update(&(symbol.len() as u64).to_le_bytes());
    hasher.update(symbol);
    for bar in &series.bars {
        match bar.timestamp {
            Some(ts) => {
                hasher.update(&[1]);
                hasher.update(&ts.timestamp_micros().to_le_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        match bar.volume {
            Some(volume) => {
                hasher.update(&[1]);
                hasher.update(&volume.to_le_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
    }
    hasher.finalize().to_hex().to_string()
}
