//! Trade candlestick reversals on the bar they complete.

use super::{Signal, Strategy, StrategyError};
use crate::domain::Bar;
use crate::patterns::{patterns_at_end, PatternBias};

/// Long on a bullish pattern, Short on a bearish one, otherwise Flat.
///
/// When the current bar carries both, the higher-confidence pattern wins;
/// a tie is Flat.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternStrategy;

impl Strategy for PatternStrategy {
    fn name(&self) -> &str {
        "candlestick_patterns"
    }

    fn decide(&self, history: &[Bar]) -> Result<Signal, StrategyError> {
        let mut bull = 0u8;
        let mut bear = 0u8;
        for kind in patterns_at_end(history) {
            match kind.bias() {
                PatternBias::Bullish => bull = bull.max(kind.confidence()),
                PatternBias::Bearish => bear = bear.max(kind.confidence()),
                PatternBias::Neutral => {}
            }
        }
        Ok(match bull.cmp(&bear) {
            std::cmp::Ordering::Greater => Signal::Long,
            std::cmp::Ordering::Less => Signal::Short,
            std::cmp::Ordering::Equal => Signal::Flat,
        })
    }
}
