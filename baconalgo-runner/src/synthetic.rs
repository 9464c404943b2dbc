//! Synthetic bars — seeded random walk for demos and tests.
//!
//! Same seed, same bars. Timestamps are consecutive days starting 2023-01-02.

use baconalgo_core::{Bar, BarSeries};
use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data_loader::{BarSource, DataError};

/// Largest absolute daily close-to-close move.
const MAX_DAILY_RETURN: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct SyntheticBarSource {
    pub symbol: String,
    pub bars: usize,
    pub seed: u64,
    pub start_price: f64,
}

impl BarSource for SyntheticBarSource {
    fn load(&self) -> Result<BarSeries, DataError> {
        if !self.start_price.is_finite() || self.start_price <= 0.0 {
            return Err(DataError::Validation(format!(
                "synthetic start_price must be > 0, got {}",
                self.start_price
            )));
        }
        let bars = generate_bars(self.bars, self.seed, self.start_price);
        Ok(BarSeries::new(bars).with_symbol(self.symbol.clone()))
    }
}

/// Random walk of `n` daily bars from `start_price`.
pub fn generate_bars(n: usize, seed: u64, start_price: f64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).single();

    let mut bars = Vec::with_capacity(n);
    let mut price = start_price;
    for i in 0..n {
        let daily_return: f64 = rng.gen_range(-MAX_DAILY_RETURN..MAX_DAILY_RETURN);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        let mut bar = Bar::new(open, high, low, close).with_volume(volume);
        if let Some(start) = start {
            bar = bar.with_timestamp(start + Duration::days(i as i64));
        }
        bars.push(bar);
        price = close;
    }
    bars
}
