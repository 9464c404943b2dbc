//! Domain types for BaconAlgo

pub mod bar;
pub mod direction;
pub mod trade;

pub use bar::{Bar, BarSeries, BarTime, UNKNOWN_SYMBOL};
pub use direction::Direction;
pub use trade::{ExitReason, Trade, TradeError, TradeExit};
