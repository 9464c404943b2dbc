//! Position tracker — at most one open trade plus append-only history.

use crate::domain::{BarTime, Direction, ExitReason, Trade, TradeError};

#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    open: Option<Trade>,
    history: Vec<Trade>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction of the open trade, if any.
    pub fn open_direction(&self) -> Option<Direction> {
        self.open.as_ref().map(Trade::direction)
    }

    pub fn is_flat(&self) -> bool {
        self.open.is_none()
    }

    /// Install a freshly opened trade. `false` (trade dropped) when the slot
    /// is taken.
    #[must_use]
    pub fn open(&mut self, trade: Trade) -> bool {
        if self.open.is_some() {
            return false;
        }
        self.open = Some(trade);
        true
    }

    /// Close the open trade at `bar`, move it to history, return its profit.
    ///
    /// `Ok(None)` when the book is already flat. On a close error the trade
    /// stays open.
    pub fn close(
        &mut self,
        bar: usize,
        price: f64,
        time: BarTime,
        reason: ExitReason,
    ) -> Result<Option<f64>, TradeError> {
        let Some(trade) = self.open.as_mut() else {
            return Ok(None);
        };
        let profit = trade.close_at_bar(bar, price, time, reason)?;
        if let Some(closed) = self.open.take() {
            self.history.push(closed);
        }
        Ok(Some(profit))
    }

    /// Closed trades in close order.
    pub fn trades(&self) -> &[Trade] {
        &self.history
    }

    pub fn reset(&mut self) {
        self.open = None;
        self.history.clear();
    }
}
