//! Moving average crossover.
//!
//! - Long while the fast SMA is above the slow SMA
//! - Short while it is below
//! - Flat when they are equal or history is shorter than the slow period

use super::{Signal, Strategy, StrategyError};
use crate::domain::Bar;
use crate::indicators::Sma;

pub const DEFAULT_FAST_PERIOD: usize = 5;
pub const DEFAULT_SLOW_PERIOD: usize = 20;

#[derive(Debug, Clone)]
pub struct MaCrossover {
    fast: Sma,
    slow: Sma,
    name: String,
}

impl MaCrossover {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        assert!(fast_period > 0, "fast_period must be > 0");
        assert!(slow_period > fast_period, "slow_period must be > fast_period");
        Self {
            fast: Sma::new(fast_period),
            slow: Sma::new(slow_period),
            name: format!("ma_cross_{fast_period}_{slow_period}"),
        }
    }

    pub fn fast_period(&self) -> usize {
        self.fast.period()
    }

    pub fn slow_period(&self) -> usize {
        self.slow.period()
    }
}

impl Default for MaCrossover {
    fn default() -> Self {
        Self::new(DEFAULT_FAST_PERIOD, DEFAULT_SLOW_PERIOD)
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, history: &[Bar]) -> Result<Signal, StrategyError> {
        let (Some(fast), Some(slow)) = (self.fast.latest(history), self.slow.latest(history))
        else {
            return Ok(Signal::Flat);
        };
        Ok(if fast > slow {
            Signal::Long
        } else if fast < slow {
            Signal::Short
        } else {
            Signal::Flat
        })
    }
}
