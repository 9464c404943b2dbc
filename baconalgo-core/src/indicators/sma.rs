//! Simple Moving Average (SMA) of close prices over the trailing window.

use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Mean of the last `period` closes, or `None` when history is shorter.
    pub fn latest(&self, bars: &[Bar]) -> Option<f64> {
        if bars.len() < self.period {
            return None;
        }
        let window = &bars[bars.len() - self.period..];
        let sum: f64 = window.iter().map(|b| b.close).sum();
        Some(sum / self.period as f64)
    }
}
