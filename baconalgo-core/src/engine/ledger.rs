//! Equity ledger — account balance and its history of closed-trade snapshots.

use serde::{Deserialize, Serialize};

/// Balance plus one snapshot per closed trade.
///
/// # Invariant
/// `curve.len() == closed trades + 1`; `curve[0]` is the initial balance and
/// the last element always equals `balance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityLedger {
    initial_balance: f64,
    balance: f64,
    curve: Vec<f64>,
}

impl EquityLedger {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            initial_balance,
            balance: initial_balance,
            curve: vec![initial_balance],
        }
    }

    /// Realize a closed trade's profit and snapshot the new balance.
    pub fn record_close(&mut self, profit: f64) {
        self.balance += profit;
        self.curve.push(self.balance);
    }

    /// Back to the seeded state.
    pub fn reset(&mut self) {
        self.balance = self.initial_balance;
        self.curve.clear();
        self.curve.push(self.initial_balance);
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn curve(&self) -> &[f64] {
        &self.curve
    }
}
