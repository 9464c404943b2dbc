//! Backtester — drives a strategy over a bar series.
//!
//! Bar loop contract:
//! 1. The strategy sees `bars[0..=i]`, never later bars.
//! 2. An open trade whose direction differs from the signal (Flat included)
//!    is closed at the bar close.
//! 3. A directional signal with a flat book opens a trade at the bar close.
//!    Steps 2 and 3 run in order, so a flip closes and re-opens on one bar.
//!    No entry is taken on the last bar: it could only exit at its own price.
//! 4. A trade still open after the last bar is force-closed there.

use super::ledger::EquityLedger;
use super::position::PositionTracker;
use crate::domain::{BarSeries, BarTime, Direction, ExitReason, Trade, TradeError};
use crate::metrics::PerformanceMetrics;
use crate::strategy::{Strategy, StrategyError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;
pub const DEFAULT_RISK_FRACTION: f64 = 0.10;

/// Errors that abort a backtest run.
#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("strategy returned an invalid signal at bar {bar_index}")]
    InvalidSignal {
        bar_index: usize,
        source: StrategyError,
    },

    #[error("trade error: {0}")]
    Trade(#[from] TradeError),
}

/// Account parameters for a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub initial_balance: f64,
    /// Fraction of the current balance committed to each new trade.
    pub risk_fraction: f64,
}

impl EngineConfig {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            initial_balance,
            risk_fraction: DEFAULT_RISK_FRACTION,
        }
    }

    pub fn with_risk_fraction(mut self, risk_fraction: f64) -> Self {
        self.risk_fraction = risk_fraction;
        self
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(BacktestError::InvalidConfig(format!(
                "initial_balance must be finite and > 0, got {}",
                self.initial_balance
            )));
        }
        if !(self.risk_fraction > 0.0 && self.risk_fraction <= 1.0) {
            return Err(BacktestError::InvalidConfig(format!(
                "risk_fraction must be in (0, 1], got {}",
                self.risk_fraction
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_BALANCE)
    }
}

/// Single-instrument, single-position backtester.
///
/// Each [`run`](Self::run) starts from a fresh ledger; the state of the last
/// run stays readable through the accessors until the next one.
#[derive(Debug, Clone)]
pub struct Backtester {
    config: EngineConfig,
    ledger: EquityLedger,
    positions: PositionTracker,
}

impl Backtester {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            ledger: EquityLedger::new(config.initial_balance),
            positions: PositionTracker::new(),
            config,
        }
    }

    /// Walk `series` with `strategy` and return the performance report.
    pub fn run<S>(
        &mut self,
        series: &BarSeries,
        strategy: &S,
    ) -> Result<PerformanceMetrics, BacktestError>
    where
        S: Strategy + ?Sized,
    {
        self.config.validate()?;
        self.reset();

        let symbol = series.symbol();
        let bars = &series.bars;
        let span = info_span!(
            "backtest",
            symbol = symbol,
            strategy = strategy.name(),
            bars = bars.len()
        );
        let _guard = span.enter();

        let last_index = bars.len().saturating_sub(1);
        for (i, bar) in bars.iter().enumerate() {
            let signal = strategy
                .decide(&bars[..=i])
                .map_err(|source| BacktestError::InvalidSignal {
                    bar_index: i,
                    source,
                })?;
            let time = BarTime::of(bar, i);

            if let Some(open_dir) = self.positions.open_direction() {
                if signal.direction() != Some(open_dir) {
                    self.close_position(i, bar.close, time, ExitReason::Signal)?;
                }
            }

            if let Some(direction) = signal.direction() {
                if self.positions.is_flat() && i < last_index {
                    self.open_position(symbol, i, bar.close, time, direction)?;
                }
            }
        }

        if let Some(last) = bars.last() {
            let time = BarTime::of(last, last_index);
            self.close_position(last_index, last.close, time, ExitReason::EndOfData)?;
        }

        let metrics = self.metrics();
        info!(
            trades = metrics.total_trades,
            final_balance = metrics.final_balance,
            sharpe = metrics.sharpe_ratio,
            "backtest complete"
        );
        Ok(metrics)
    }

    /// Recompute the report from the current ledger and trade history.
    pub fn metrics(&self) -> PerformanceMetrics {
        PerformanceMetrics::compute(
            self.positions.trades(),
            self.ledger.curve(),
            self.ledger.initial_balance(),
            self.ledger.balance(),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn initial_balance(&self) -> f64 {
        self.ledger.initial_balance()
    }

    pub fn balance(&self) -> f64 {
        self.ledger.balance()
    }

    pub fn trades(&self) -> &[Trade] {
        self.positions.trades()
    }

    pub fn equity_curve(&self) -> &[f64] {
        self.ledger.curve()
    }

    fn reset(&mut self) {
        self.ledger.reset();
        self.positions.reset();
    }

    fn open_position(
        &mut self,
        symbol: &str,
        bar_index: usize,
        price: f64,
        time: BarTime,
        direction: Direction,
    ) -> Result<(), BacktestError> {
        let balance = self.ledger.balance();
        if balance <= 0.0 {
            warn!(bar = bar_index, balance, "account depleted, skipping entry");
            return Ok(());
        }
        let size = balance * self.config.risk_fraction / price;
        let trade = Trade::open(symbol, price, time, direction, size)?.with_entry_bar(bar_index);
        if self.positions.open(trade) {
            debug!(bar = bar_index, %direction, price, size, "opened trade");
        }
        Ok(())
    }

    fn close_position(
        &mut self,
        bar_index: usize,
        price: f64,
        time: BarTime,
        reason: ExitReason,
    ) -> Result<(), BacktestError> {
        if let Some(profit) = self.positions.close(bar_index, price, time, reason)? {
            self.ledger.record_close(profit);
            debug!(
                bar = bar_index,
                price,
                profit,
                balance = self.ledger.balance(),
                ?reason,
                "closed trade"
            );
        }
        Ok(())
    }
}

impl Default for Backtester {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
