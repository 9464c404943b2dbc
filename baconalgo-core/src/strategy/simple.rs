//! Constant strategies, useful as baselines and in tests.

use super::{Signal, Strategy, StrategyError};
use crate::domain::Bar;

/// Long on every bar: one trade from the first bar to the last.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn decide(&self, _history: &[Bar]) -> Result<Signal, StrategyError> {
        Ok(Signal::Long)
    }
}

/// Never trades.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFlat;

impl Strategy for AlwaysFlat {
    fn name(&self) -> &str {
        "always_flat"
    }

    fn decide(&self, _history: &[Bar]) -> Result<Signal, StrategyError> {
        Ok(Signal::Flat)
    }
}
