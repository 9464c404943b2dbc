//! Backtesting engine — single-instrument bar loop.
//!
//! Per bar: ask the strategy, close a position whose direction no longer
//! matches the signal, then open one if the signal is directional and the book
//! is flat. Closed trades feed the equity ledger; metrics are computed from
//! the ledger and trade history once the series is exhausted.

pub mod backtester;
pub mod ledger;
pub mod position;

pub use backtester::{BacktestError, Backtester, EngineConfig};
pub use ledger::EquityLedger;
pub use position::PositionTracker;
