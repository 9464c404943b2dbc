//! MA crossover parameter sweep.
//!
//! Each grid point runs on its own `Backtester` in a rayon worker; the bar
//! series is loaded once and shared read-only.

use baconalgo_core::{BarSeries, PerformanceMetrics};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{BacktestConfig, StrategyConfig};
use crate::runner::{run_backtest_from_series, RunError};

/// Fast/slow SMA periods to cross.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub fast_periods: Vec<usize>,
    pub slow_periods: Vec<usize>,
}

impl SweepGrid {
    /// Fast 3/5/8/13 crossed with slow 20/30/50.
    pub fn ma_crossover_default() -> Self {
        Self {
            fast_periods: vec![3, 5, 8, 13],
            slow_periods: vec![20, 30, 50],
        }
    }

    /// Valid (fast, slow) pairs: fast >= 1 and fast < slow.
    pub fn combinations(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for &fast in &self.fast_periods {
            for &slow in &self.slow_periods {
                if fast == 0 || fast >= slow {
                    continue;
                }
                pairs.push((fast, slow));
            }
        }
        pairs
    }

    pub fn size(&self) -> usize {
        self.combinations().len()
    }
}

/// One grid point's outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepEntry {
    pub fast: usize,
    pub slow: usize,
    pub run_id: String,
    pub metrics: PerformanceMetrics,
}

/// Load bars from `base`'s data source and sweep the grid over them.
pub fn run_sweep(base: &BacktestConfig, grid: &SweepGrid) -> Result<Vec<SweepEntry>, RunError> {
    base.validate()?;
    let series = base.bar_source().load()?;
    run_sweep_on_series(base, &series, grid)
}

/// Sweep the grid over pre-loaded bars. Results are sorted by Sharpe ratio,
/// best first, with total profit breaking ties.
pub fn run_sweep_on_series(
    base: &BacktestConfig,
    series: &BarSeries,
    grid: &SweepGrid,
) -> Result<Vec<SweepEntry>, RunError> {
    base.validate()?;
    let combos = grid.combinations();
    info!(points = combos.len(), bars = series.len(), "starting sweep");

    let mut entries = combos
        .par_iter()
        .map(|&(fast, slow)| {
            let mut config = base.clone();
            config.strategy = StrategyConfig::MaCrossover { fast, slow };
            let result = run_backtest_from_series(&config, series)?;
            Ok(SweepEntry {
                fast,
                slow,
                run_id: result.run_id,
                metrics: result.metrics,
            })
        })
        .collect::<Result<Vec<_>, RunError>>()?;

    entries.sort_by(|a, b| {
        b.metrics
            .sharpe_ratio
            .total_cmp(&a.metrics.sharpe_ratio)
            .then(b.metrics.total_profit.total_cmp(&a.metrics.total_profit))
    });

    if let Some(best) = entries.first() {
        info!(
            fast = best.fast,
            slow = best.slow,
            sharpe = best.metrics.sharpe_ratio,
            "sweep complete"
        );
    }
    Ok(entries)
}
