//! Performance metrics — pure functions over the trade list and equity curve.
//!
//! The report rounds money and percentages to 2 decimals. The individual
//! metric functions return raw values so callers can test them exactly.

use crate::domain::Trade;
use serde::{Deserialize, Serialize};

/// Trading periods per year used to annualize the Sharpe ratio.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Summary report for one backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent of trades with profit > 0.
    pub win_rate: f64,
    pub total_profit: f64,
    pub total_profit_pct: f64,
    pub avg_profit_per_trade: f64,
    /// Largest peak-to-trough decline of the equity curve, in percent.
    ///
    /// Rounded like every other field, so a decline under 0.005% reports 0.
    /// [`max_drawdown`] gives the unrounded value.
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub final_balance: f64,
}

impl PerformanceMetrics {
    /// Compute the report. Zero trades yield an all-zero report that still
    /// carries the final balance.
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[f64],
        initial_balance: f64,
        final_balance: f64,
    ) -> Self {
        if trades.is_empty() {
            return Self {
                final_balance: round2(final_balance),
                ..Self::default()
            };
        }

        let total_trades = trades.len();
        let winning_trades = trades.iter().filter(|t| t.is_winner()).count();
        let total_profit: f64 = trades.iter().filter_map(Trade::profit).sum();

        Self {
            total_trades,
            winning_trades,
            losing_trades: total_trades - winning_trades,
            win_rate: round2(win_rate(trades)),
            total_profit: round2(total_profit),
            total_profit_pct: round2(total_return_pct(initial_balance, final_balance)),
            avg_profit_per_trade: round2(total_profit / total_trades as f64),
            max_drawdown: round2(max_drawdown(equity_curve)),
            sharpe_ratio: round2(sharpe_ratio(equity_curve)),
            final_balance: round2(final_balance),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Round half away from zero to 2 decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percent of closed trades with strictly positive profit. 0 for no trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// (final - initial) / initial, in percent. 0 when initial is not positive.
pub fn total_return_pct(initial_balance: f64, final_balance: f64) -> f64 {
    if initial_balance <= 0.0 {
        return 0.0;
    }
    (final_balance - initial_balance) / initial_balance * 100.0
}

/// Maximum drawdown as a positive percent (e.g., 15.0 = 15% off the peak).
///
/// 0.0 for an empty, constant, or non-decreasing curve.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            max_dd = max_dd.max((peak - eq) / peak * 100.0);
        }
    }
    max_dd
}

/// Relative change between consecutive equity points.
///
/// Steps from a non-positive balance are skipped.
pub fn equity_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Annualized Sharpe ratio over equity-curve steps.
///
/// mean(r) / std(r) * sqrt(252), population standard deviation.
/// Returns 0.0 when there are no returns or the deviation is zero.
pub fn sharpe_ratio(equity_curve: &[f64]) -> f64 {
    let returns = equity_returns(equity_curve);
    if returns.is_empty() {
        return 0.0;
    }
    let std = population_std(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean_f64(&returns) / std * PERIODS_PER_YEAR.sqrt()
}

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean_f64(values);
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BarTime, Direction};

    fn closed(direction: Direction, entry: f64, exit: f64, size: f64) -> Trade {
        let mut trade = Trade::open("TEST", entry, BarTime::Index(0), direction, size).unwrap();
        trade.close(exit, BarTime::Index(1)).unwrap();
        trade
    }

    #[test]
    fn zero_trades_report() {
        let m = PerformanceMetrics::compute(&[], &[10_000.0], 10_000.0, 10_000.0);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.final_balance, 10_000.0);
    }

    #[test]
    fn single_winning_trade() {
        let trades = vec![closed(Direction::Long, 100.0, 110.0, 10.0)];
        let m = PerformanceMetrics::compute(&trades, &[10_000.0, 10_100.0], 10_000.0, 10_100.0);
        assert_eq!(m.total_trades, 1);
        assert_eq!(m.winning_trades, 1);
        assert_eq!(m.losing_trades, 0);
        assert_eq!(m.win_rate, 100.0);
        assert_eq!(m.total_profit, 100.0);
        assert_eq!(m.total_profit_pct, 1.0);
        assert_eq!(m.avg_profit_per_trade, 100.0);
        assert_eq!(m.max_drawdown, 0.0);
        // one return → zero deviation
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.final_balance, 10_100.0);
    }

    #[test]
    fn breakeven_counts_as_loss() {
        let trades = vec![
            closed(Direction::Long, 100.0, 110.0, 1.0),
            closed(Direction::Short, 100.0, 100.0, 1.0),
        ];
        let m = PerformanceMetrics::compute(&trades, &[100.0, 110.0, 110.0], 100.0, 110.0);
        assert_eq!(m.winning_trades, 1);
        assert_eq!(m.losing_trades, 1);
        assert_eq!(m.win_rate, 50.0);
    }

    #[test]
    fn reported_drawdown_rounds_tiny_declines_to_zero() {
        let trades = vec![closed(Direction::Long, 100.0, 99.9, 1.0)];
        let curve = [10_000.0, 9_999.9];
        let m = PerformanceMetrics::compute(&trades, &curve, 10_000.0, 9_999.9);
        assert_eq!(m.max_drawdown, 0.0);
        let raw = max_drawdown(&curve);
        assert!(raw > 0.0 && raw < 0.005, "raw drawdown {raw}");
    }

    #[test]
    fn max_drawdown_known_curve() {
        let dd = max_drawdown(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert!((dd - 25.0).abs() < 1e-10);
    }

    #[test]
    fn max_drawdown_monotonic_is_zero() {
        assert_eq!(max_drawdown(&[100.0, 100.0, 101.0, 150.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn sharpe_known_values() {
        // returns: +10%, -10%  → mean 0
        assert!(sharpe_ratio(&[100.0, 110.0, 99.0]).abs() < 1e-10);

        // returns: 0.1, 0.2 → mean 0.15, population std 0.05
        let curve = [100.0, 110.0, 132.0];
        let expected = 0.15 / 0.05 * 252.0_f64.sqrt();
        assert!((sharpe_ratio(&curve) - expected).abs() < 1e-9);
    }

    #[test]
    fn sharpe_guards() {
        assert_eq!(sharpe_ratio(&[]), 0.0);
        assert_eq!(sharpe_ratio(&[100.0]), 0.0);
        assert_eq!(sharpe_ratio(&[100.0, 100.0, 100.0]), 0.0);
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(-0.005001), -0.01);
        assert_eq!(round2(2.5), 2.5);
    }

    #[test]
    fn total_return_guard() {
        assert_eq!(total_return_pct(0.0, 100.0), 0.0);
        assert!((total_return_pct(200.0, 150.0) + 25.0).abs() < 1e-10);
    }
}
