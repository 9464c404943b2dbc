//! Indicators — values derived from the observed bar prefix.
//!
//! No indicator value at bar t may depend on bars after t. Strategies call
//! them on the observed prefix only, so look-ahead is impossible by
//! construction.

pub mod sma;

pub use sma::Sma;

#[cfg(test)]
use crate::domain::Bar;

/// Synthetic bars from close prices for testing.
///
/// open = previous close, high/low = max/min(open, close) ± 1.0.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar::new(open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect()
}

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
