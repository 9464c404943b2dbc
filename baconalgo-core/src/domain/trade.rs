//! Trade — one round-trip position, opened once and closed exactly once.

use super::bar::BarTime;
use super::direction::Direction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from trade construction and closing.
#[derive(Debug, Error, PartialEq)]
pub enum TradeError {
    #[error("invalid trade direction '{0}' (expected 'long' or 'short')")]
    InvalidDirection(String),

    #[error("invalid trade size {0} (must be finite and > 0)")]
    InvalidSize(f64),

    #[error("invalid {field} price {price} (must be finite and > 0)")]
    InvalidPrice { field: &'static str, price: f64 },

    #[error("trade on {symbol} opened at {entry_time} is already closed")]
    AlreadyClosed { symbol: String, entry_time: BarTime },
}

/// Why a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Strategy signal diverged from the open direction.
    Signal,
    /// Series exhausted with the trade still open.
    EndOfData,
}

/// Exit side of a closed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeExit {
    pub price: f64,
    pub time: BarTime,
    pub reason: ExitReason,
    /// Bar index of the exit, when closed by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar: Option<usize>,
    pub profit: f64,
    /// Return on entry price, in percent.
    pub profit_pct: f64,
}

/// A single-instrument round-trip position.
///
/// Fields are private so the exit side can only be written by [`Trade::close`],
/// which refuses to run twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    symbol: String,
    direction: Direction,
    entry_price: f64,
    entry_time: BarTime,
    size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entry_bar: Option<usize>,
    exit: Option<TradeExit>,
}

impl Trade {
    /// Open a new trade. `size` is in instrument units and must be positive.
    pub fn open(
        symbol: impl Into<String>,
        entry_price: f64,
        entry_time: BarTime,
        direction: Direction,
        size: f64,
    ) -> Result<Self, TradeError> {
        check_price("entry", entry_price)?;
        if !size.is_finite() || size <= 0.0 {
            return Err(TradeError::InvalidSize(size));
        }
        Ok(Self {
            symbol: symbol.into(),
            direction,
            entry_price,
            entry_time,
            size,
            entry_bar: None,
            exit: None,
        })
    }

    /// Tag the trade with the bar index it was opened on.
    pub fn with_entry_bar(mut self, bar: usize) -> Self {
        self.entry_bar = Some(bar);
        self
    }

    /// Close on a strategy signal. Returns the realized profit.
    pub fn close(&mut self, exit_price: f64, exit_time: BarTime) -> Result<f64, TradeError> {
        self.close_with_reason(exit_price, exit_time, ExitReason::Signal)
    }

    /// Close and record why. Fails if the trade is already closed.
    pub fn close_with_reason(
        &mut self,
        exit_price: f64,
        exit_time: BarTime,
        reason: ExitReason,
    ) -> Result<f64, TradeError> {
        self.record_exit(exit_price, exit_time, None, reason)
    }

    /// Close on bar `bar` of the series being walked.
    pub fn close_at_bar(
        &mut self,
        bar: usize,
        exit_price: f64,
        exit_time: BarTime,
        reason: ExitReason,
    ) -> Result<f64, TradeError> {
        self.record_exit(exit_price, exit_time, Some(bar), reason)
    }

    fn record_exit(
        &mut self,
        exit_price: f64,
        exit_time: BarTime,
        bar: Option<usize>,
        reason: ExitReason,
    ) -> Result<f64, TradeError> {
        if self.exit.is_some() {
            return Err(TradeError::AlreadyClosed {
                symbol: self.symbol.clone(),
                entry_time: self.entry_time,
            });
        }
        check_price("exit", exit_price)?;

        let move_per_unit = match self.direction {
            Direction::Long => exit_price - self.entry_price,
            Direction::Short => self.entry_price - exit_price,
        };
        let profit = move_per_unit * self.size;
        let profit_pct = move_per_unit / self.entry_price * 100.0;

        self.exit = Some(TradeExit {
            price: exit_price,
            time: exit_time,
            reason,
            bar,
            profit,
            profit_pct,
        });
        Ok(profit)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn entry_time(&self) -> BarTime {
        self.entry_time
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn entry_bar(&self) -> Option<usize> {
        self.entry_bar
    }

    pub fn exit_bar(&self) -> Option<usize> {
        self.exit.as_ref().and_then(|e| e.bar)
    }

    pub fn is_closed(&self) -> bool {
        self.exit.is_some()
    }

    pub fn exit(&self) -> Option<&TradeExit> {
        self.exit.as_ref()
    }

    pub fn exit_price(&self) -> Option<f64> {
        self.exit.as_ref().map(|e| e.price)
    }

    pub fn exit_time(&self) -> Option<BarTime> {
        self.exit.as_ref().map(|e| e.time)
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit.as_ref().map(|e| e.reason)
    }

    pub fn profit(&self) -> Option<f64> {
        self.exit.as_ref().map(|e| e.profit)
    }

    pub fn profit_pct(&self) -> Option<f64> {
        self.exit.as_ref().map(|e| e.profit_pct)
    }

    /// Closed with strictly positive profit. Breakeven counts as a loss.
    pub fn is_winner(&self) -> bool {
        self.profit().is_some_and(|p| p > 0.0)
    }
}

fn check_price(field: &'static str, price: f64) -> Result<(), TradeError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(TradeError::InvalidPrice { field, price });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_trade() -> Trade {
        Trade::open("SPY", 100.0, BarTime::Index(0), Direction::Long, 10.0).unwrap()
    }

    #[test]
    fn new_trade_has_no_exit() {
        let trade = long_trade();
        assert!(!trade.is_closed());
        assert_eq!(trade.exit_price(), None);
        assert_eq!(trade.exit_time(), None);
        assert_eq!(trade.profit(), None);
        assert_eq!(trade.profit_pct(), None);
        assert!(!trade.is_winner());
    }

    #[test]
    fn long_profit_calculation() {
        let mut trade = long_trade();
        let profit = trade.close(110.0, BarTime::Index(1)).unwrap();
        assert!((profit - 100.0).abs() < 1e-10);
        assert!((trade.profit_pct().unwrap() - 10.0).abs() < 1e-10);
        assert_eq!(trade.exit_reason(), Some(ExitReason::Signal));
        assert!(trade.is_winner());
    }

    #[test]
    fn short_profit_calculation() {
        let mut trade =
            Trade::open("SPY", 100.0, BarTime::Index(0), Direction::Short, 5.0).unwrap();
        let profit = trade.close(90.0, BarTime::Index(3)).unwrap();
        assert!((profit - 50.0).abs() < 1e-10);
        assert!((trade.profit_pct().unwrap() - 10.0).abs() < 1e-10);
    }

    #[test]
    fn short_loses_when_price_rises() {
        let mut trade =
            Trade::open("SPY", 100.0, BarTime::Index(0), Direction::Short, 5.0).unwrap();
        let profit = trade.close(120.0, BarTime::Index(3)).unwrap();
        assert!((profit + 100.0).abs() < 1e-10);
        assert!((trade.profit_pct().unwrap() + 20.0).abs() < 1e-10);
        assert!(!trade.is_winner());
    }

    #[test]
    fn breakeven_is_not_a_winner() {
        let mut trade = long_trade();
        trade.close(100.0, BarTime::Index(1)).unwrap();
        assert_eq!(trade.profit(), Some(0.0));
        assert!(!trade.is_winner());
    }

    #[test]
    fn double_close_fails_and_keeps_first_exit() {
        let mut trade = long_trade();
        trade.close(110.0, BarTime::Index(1)).unwrap();
        let err = trade.close(50.0, BarTime::Index(2)).unwrap_err();
        assert!(matches!(err, TradeError::AlreadyClosed { .. }));
        assert_eq!(trade.exit_price(), Some(110.0));
        assert_eq!(trade.exit_time(), Some(BarTime::Index(1)));
    }

    #[test]
    fn rejects_non_positive_size() {
        for size in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let res = Trade::open("SPY", 100.0, BarTime::Index(0), Direction::Long, size);
            assert!(matches!(res, Err(TradeError::InvalidSize(_))));
        }
    }

    #[test]
    fn rejects_bad_prices() {
        let res = Trade::open("SPY", 0.0, BarTime::Index(0), Direction::Long, 1.0);
        assert!(matches!(
            res,
            Err(TradeError::InvalidPrice { field: "entry", .. })
        ));

        let mut trade = long_trade();
        let err = trade.close(f64::NAN, BarTime::Index(1)).unwrap_err();
        assert!(matches!(err, TradeError::InvalidPrice { field: "exit", .. }));
        assert!(!trade.is_closed());
    }

    #[test]
    fn bar_indices_are_recorded() {
        let mut trade = long_trade().with_entry_bar(3);
        trade
            .close_at_bar(9, 120.0, BarTime::Index(9), ExitReason::Signal)
            .unwrap();
        assert_eq!(trade.entry_bar(), Some(3));
        assert_eq!(trade.exit_bar(), Some(9));
        assert_eq!(long_trade().exit_bar(), None);
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let mut trade = long_trade();
        trade
            .close_with_reason(105.0, BarTime::Index(4), ExitReason::EndOfData)
            .unwrap();
        let json = serde_json::to_string(&trade).unwrap();
        assert!(json.contains("\"end_of_data\""));
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
