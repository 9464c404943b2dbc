//! BaconAlgo Core — domain types, backtest engine, metrics, strategies.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (bars, bar series, trades, directions)
//! - Bar-by-bar backtest loop with a single-position tracker and equity ledger
//! - Performance metrics (win rate, drawdown, Sharpe)
//! - Strategy trait plus a handful of reference strategies
//! - Stateless candlestick pattern detection and a moving-average predictor

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod metrics;
pub mod patterns;
pub mod predictor;
pub mod strategy;

pub use domain::{Bar, BarSeries, BarTime, Direction, ExitReason, Trade, TradeError};
pub use engine::{BacktestError, Backtester, EngineConfig};
pub use metrics::PerformanceMetrics;
pub use strategy::{Signal, Strategy, StrategyError};
