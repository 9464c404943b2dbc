//! BaconAlgo Runner — backtest orchestration on top of `baconalgo-core`.
//!
//! - TOML run configuration with validation and content-addressed run ids
//! - Bar sources: CSV files, seeded synthetic random walks, in-memory bars
//! - Single-run entry point producing a serializable `BacktestResult`
//! - Parallel MA crossover parameter sweeps
//! - JSON/CSV artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod sweep;
pub mod synthetic;

pub use config::{BacktestConfig, ConfigError, DataConfig, StrategyConfig};
pub use data_loader::{BarSource, CsvBarSource, DataError, VecBarSource};
pub use runner::{
    compute_dataset_hash, run_backtest_from_series, run_single_backtest, BacktestResult,
    RunError, SCHEMA_VERSION,
};
pub use sweep::{run_sweep, run_sweep_on_series, SweepEntry, SweepGrid};
pub use synthetic::SyntheticBarSource;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<SweepGrid>();
        assert_sync::<SweepGrid>();
    }

    #[test]
    fn sweep_entry_is_send_sync() {
        assert_send::<SweepEntry>();
        assert_sync::<SweepEntry>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
