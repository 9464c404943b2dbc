//! TOML configuration for backtest runs.
//!
//! ```toml
//! [backtest]
//! symbol = "SPY"
//! initial_balance = 10000.0
//! risk_fraction = 0.1
//!
//! [strategy]
//! type = "ma_crossover"
//! fast = 5
//! slow = 20
//!
//! [data]
//! type = "csv"
//! path = "data/spy.csv"
//! ```

use std::path::{Path, PathBuf};

use baconalgo_core::engine::backtester::{DEFAULT_INITIAL_BALANCE, DEFAULT_RISK_FRACTION};
use baconalgo_core::strategy::ma_cross::{DEFAULT_FAST_PERIOD, DEFAULT_SLOW_PERIOD};
use baconalgo_core::strategy::{AlwaysFlat, BuyAndHold, MaCrossover, PatternStrategy};
use baconalgo_core::{EngineConfig, Strategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_loader::{BarSource, CsvBarSource};
use crate::synthetic::SyntheticBarSource;

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Top-level config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub strategy: StrategyConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    pub symbol: String,
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,
    #[serde(default = "default_risk_fraction")]
    pub risk_fraction: f64,
}

fn default_initial_balance() -> f64 {
    DEFAULT_INITIAL_BALANCE
}

fn default_risk_fraction() -> f64 {
    DEFAULT_RISK_FRACTION
}

/// Strategy selection (serializable enum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Fast/slow SMA crossover.
    MaCrossover {
        #[serde(default = "default_fast")]
        fast: usize,
        #[serde(default = "default_slow")]
        slow: usize,
    },
    /// Long from the first bar to the last.
    BuyAndHold,
    /// Never trades.
    AlwaysFlat,
    /// Candlestick reversal patterns.
    Patterns,
}

fn default_fast() -> usize {
    DEFAULT_FAST_PERIOD
}

fn default_slow() -> usize {
    DEFAULT_SLOW_PERIOD
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::MaCrossover {
            fast: DEFAULT_FAST_PERIOD,
            slow: DEFAULT_SLOW_PERIOD,
        }
    }
}

impl StrategyConfig {
    /// Instantiate the configured strategy. Call after [`BacktestConfig::validate`].
    pub fn build(&self) -> Box<dyn Strategy + Send + Sync> {
        match *self {
            Self::MaCrossover { fast, slow } => Box::new(MaCrossover::new(fast, slow)),
            Self::BuyAndHold => Box::new(BuyAndHold),
            Self::AlwaysFlat => Box::new(AlwaysFlat),
            Self::Patterns => Box::new(PatternStrategy),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Self::MaCrossover { fast, slow } = *self {
            if fast == 0 {
                return Err(ConfigError::Invalid(
                    "strategy.fast must be >= 1".to_string(),
                ));
            }
            if slow <= fast {
                return Err(ConfigError::Invalid(format!(
                    "strategy.slow ({slow}) must be greater than strategy.fast ({fast})"
                )));
            }
        }
        Ok(())
    }
}

/// Where bars come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataConfig {
    /// CSV file with `timestamp,open,high,low,close[,volume]` columns.
    Csv { path: PathBuf },
    /// Seeded random walk.
    Synthetic {
        bars: usize,
        #[serde(default = "default_seed")]
        seed: u64,
        #[serde(default = "default_start_price")]
        start_price: f64,
    },
}

fn default_seed() -> u64 {
    42
}

fn default_start_price() -> f64 {
    100.0
}

impl BacktestConfig {
    /// Parse a TOML string. Relative CSV paths are kept as written.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; a relative CSV path resolves against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        if let DataConfig::Csv { path: csv_path } = &mut config.data {
            if csv_path.is_relative() {
                if let Some(dir) = path.parent() {
                    *csv_path = dir.join(&*csv_path);
                }
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bt = &self.backtest;
        if bt.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "backtest.symbol must not be empty".to_string(),
            ));
        }
        if !bt.initial_balance.is_finite() || bt.initial_balance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "backtest.initial_balance must be > 0, got {}",
                bt.initial_balance
            )));
        }
        if !(bt.risk_fraction > 0.0 && bt.risk_fraction <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "backtest.risk_fraction must be in (0, 1], got {}",
                bt.risk_fraction
            )));
        }
        self.strategy.validate()?;
        if let DataConfig::Synthetic { start_price, .. } = self.data {
            if !start_price.is_finite() || start_price <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "data.start_price must be > 0, got {start_price}"
                )));
            }
        }
        Ok(())
    }

    /// Content hash of the config: identical configs share a run id.
    pub fn run_id(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.backtest.initial_balance)
            .with_risk_fraction(self.backtest.risk_fraction)
    }

    pub fn build_strategy(&self) -> Box<dyn Strategy + Send + Sync> {
        self.strategy.build()
    }

    pub fn bar_source(&self) -> Box<dyn BarSource> {
        let symbol = self.backtest.symbol.clone();
        match &self.data {
            DataConfig::Csv { path } => Box::new(CsvBarSource::new(path.clone(), symbol)),
            DataConfig::Synthetic {
                bars,
                seed,
                start_price,
            } => Box::new(SyntheticBarSource {
                symbol,
                bars: *bars,
                seed: *seed,
                start_price: *start_price,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[backtest]
symbol = "SPY"
initial_balance = 25000.0
risk_fraction = 0.2

[strategy]
type = "ma_crossover"
fast = 3
slow = 10

[data]
type = "synthetic"
bars = 100
seed = 7
"#;

    #[test]
    fn parses_full_config() {
        let config = BacktestConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.backtest.symbol, "SPY");
        assert_eq!(config.backtest.initial_balance, 25_000.0);
        assert_eq!(config.strategy, StrategyConfig::MaCrossover { fast: 3, slow: 10 });
        assert_eq!(
            config.data,
            DataConfig::Synthetic {
                bars: 100,
                seed: 7,
                start_price: 100.0
            }
        );
        let engine = config.engine_config();
        assert_eq!(engine.risk_fraction, 0.2);
        assert_eq!(config.build_strategy().name(), "ma_cross_3_10");
    }

    #[test]
    fn defaults_apply() {
        let config = BacktestConfig::from_toml_str(
            r#"
[backtest]
symbol = "BTC"

[data]
type = "csv"
path = "btc.csv"
"#,
        )
        .unwrap();
        assert_eq!(config.backtest.initial_balance, 10_000.0);
        assert_eq!(config.backtest.risk_fraction, 0.1);
        assert_eq!(config.strategy, StrategyConfig::MaCrossover { fast: 5, slow: 20 });
    }

    #[test]
    fn unit_strategies_parse() {
        for (ty, name) in [
            ("buy_and_hold", "buy_and_hold"),
            ("always_flat", "always_flat"),
            ("patterns", "candlestick_patterns"),
        ] {
            let toml = format!(
                "[backtest]\nsymbol = \"X\"\n[strategy]\ntype = \"{ty}\"\n[data]\ntype = \"synthetic\"\nbars = 5\n"
            );
            let config = BacktestConfig::from_toml_str(&toml).unwrap();
            assert_eq!(config.build_strategy().name(), name);
        }
    }

    #[test]
    fn rejects_bad_values() {
        let bad_balance = SAMPLE.replace("25000.0", "-5.0");
        assert!(matches!(
            BacktestConfig::from_toml_str(&bad_balance),
            Err(ConfigError::Invalid(_))
        ));

        let bad_fraction = SAMPLE.replace("0.2", "1.5");
        assert!(matches!(
            BacktestConfig::from_toml_str(&bad_fraction),
            Err(ConfigError::Invalid(_))
        ));

        let inverted = SAMPLE.replace("slow = 10", "slow = 2");
        assert!(matches!(
            BacktestConfig::from_toml_str(&inverted),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unknown_strategy() {
        let unknown = SAMPLE.replace("ma_crossover", "martingale");
        assert!(matches!(
            BacktestConfig::from_toml_str(&unknown),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn run_id_is_content_addressed() {
        let a = BacktestConfig::from_toml_str(SAMPLE).unwrap();
        let b = BacktestConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(a.run_id().unwrap(), b.run_id().unwrap());
        assert_eq!(a.run_id().unwrap().len(), 64);

        let c = BacktestConfig::from_toml_str(&SAMPLE.replace("seed = 7", "seed = 8")).unwrap();
        assert_ne!(a.run_id().unwrap(), c.run_id().unwrap());
    }
}
