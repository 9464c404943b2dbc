//! Bar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbol reported for a series that carries no symbol tag.
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// OHLC(V) price sample for one interval.
///
/// Timestamp and volume are optional: a series built from plain price arrays
/// has neither, and the engine falls back to the bar index for trade times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp: None,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }

    /// Absolute size of the candle body.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// Full high-to-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

/// Point in time attached to a trade entry/exit or a pattern match.
///
/// The bar timestamp when the series carries one, otherwise the bar index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BarTime {
    Timestamp(DateTime<Utc>),
    Index(usize),
}

impl BarTime {
    pub fn of(bar: &Bar, index: usize) -> Self {
        match bar.timestamp {
            Some(ts) => Self::Timestamp(ts),
            None => Self::Index(index),
        }
    }
}

impl fmt::Display for BarTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Ordered bar sequence for a single instrument.
///
/// Read-only to the engine. Bars are expected in ascending time order; the
/// engine does not re-sort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { symbol: None, bars }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Build an untimestamped series from close prices (open = high = low = close).
    pub fn from_closes(closes: &[f64]) -> Self {
        Self::new(closes.iter().map(|&c| Bar::new(c, c, c, c)).collect())
    }

    /// Symbol tag, or `UNKNOWN` when the series has none.
    pub fn symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or(UNKNOWN_SYMBOL)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bar() -> Bar {
        Bar::new(100.0, 105.0, 98.0, 103.0)
            .with_timestamp(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
            .with_volume(50_000.0)
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn candle_anatomy() {
        let bar = sample_bar();
        assert_eq!(bar.body(), 3.0);
        assert_eq!(bar.upper_wick(), 2.0);
        assert_eq!(bar.lower_wick(), 2.0);
        assert_eq!(bar.range(), 7.0);
        assert!(bar.is_bullish());
    }

    #[test]
    fn bar_time_prefers_timestamp() {
        let bar = sample_bar();
        assert!(matches!(BarTime::of(&bar, 7), BarTime::Timestamp(_)));

        let bare = Bar::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(BarTime::of(&bare, 7), BarTime::Index(7));
        assert_eq!(BarTime::Index(7).to_string(), "7");
    }

    #[test]
    fn series_symbol_defaults_to_unknown() {
        let series = BarSeries::from_closes(&[1.0, 2.0]);
        assert_eq!(series.symbol(), "UNKNOWN");
        assert_eq!(series.with_symbol("BTCUSDT").symbol(), "BTCUSDT");
    }

    #[test]
    fn bar_serialization_skips_missing_optionals() {
        let bar = Bar::new(1.0, 2.0, 0.5, 1.5);
        let json = serde_json::to_string(&bar).unwrap();
        assert!(!json.contains("timestamp"));
        assert!(!json.contains("volume"));
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
