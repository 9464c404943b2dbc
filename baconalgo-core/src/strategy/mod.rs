//! Strategies — pure decision functions over observed bar history.
//!
//! A strategy receives `bars[0..=i]` and nothing else: no balance, no open
//! position, no future bars. The engine owns all state; the strategy only says
//! which exposure it wants now.

pub mod ma_cross;
pub mod pattern;
pub mod signal;
pub mod simple;
pub mod token;

pub use ma_cross::MaCrossover;
pub use pattern::PatternStrategy;
pub use signal::{Signal, SignalParseError};
pub use simple::{AlwaysFlat, BuyAndHold};
pub use token::TokenStrategy;

use crate::domain::Bar;
use thiserror::Error;

/// Errors a strategy may surface instead of a signal.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error(transparent)]
    InvalidToken(#[from] SignalParseError),

    #[error("strategy failed: {0}")]
    Failed(String),
}

/// Decision function mapping observed history to a desired exposure.
///
/// # Invariants
/// - `decide()` MUST only look at `history`, whose last element is the current bar
/// - `decide()` MUST be deterministic for the same history
pub trait Strategy {
    /// Strategy name for logs and reports.
    fn name(&self) -> &str;

    /// Decide the exposure for the last bar in `history`.
    fn decide(&self, history: &[Bar]) -> Result<Signal, StrategyError>;
}

/// Any plain closure over the history is a strategy.
impl<F> Strategy for F
where
    F: Fn(&[Bar]) -> Signal,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn decide(&self, history: &[Bar]) -> Result<Signal, StrategyError> {
        Ok(self(history))
    }
}
