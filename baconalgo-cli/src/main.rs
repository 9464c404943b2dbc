//! BaconAlgo CLI — backtest, sweep, and chart-analysis commands.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML config file and save artifacts
//! - `sweep` — rank MA crossover fast/slow pairs over one dataset
//! - `patterns` — detect candlestick patterns in a CSV and print JSON
//! - `predict` — moving-average next-price prediction for a CSV, as JSON

use anyhow::{bail, Context, Result};
use baconalgo_core::patterns::detect_patterns;
use baconalgo_core::predictor::{predict_price_movement, MovingAveragePredictor};
use baconalgo_runner::data_loader::{BarSource, CsvBarSource};
use baconalgo_runner::export::save_artifacts;
use baconalgo_runner::runner::run_single_backtest;
use baconalgo_runner::sweep::run_sweep;
use baconalgo_runner::{BacktestConfig, BacktestResult, SweepEntry, SweepGrid};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "baconalgo",
    about = "BaconAlgo CLI: signal-driven strategy backtesting"
)]
struct Cli {
    /// Log filter (e.g. info, debug, baconalgo_core=trace). BACONALGO_LOG overrides it.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for result artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Sweep MA crossover periods over the config's dataset.
    Sweep {
        /// Path to a TOML config file. Its strategy section is ignored.
        #[arg(long)]
        config: PathBuf,

        /// Fast SMA periods, comma separated. Defaults to 3,5,8,13.
        #[arg(long, value_delimiter = ',')]
        fast: Vec<usize>,

        /// Slow SMA periods, comma separated. Defaults to 20,30,50.
        #[arg(long, value_delimiter = ',')]
        slow: Vec<usize>,

        /// Show only the best N entries.
        #[arg(long)]
        top: Option<usize>,
    },
    /// Detect candlestick patterns in a CSV of bars.
    Patterns {
        /// CSV with timestamp,open,high,low,close[,volume] columns.
        #[arg(long)]
        csv: PathBuf,
    },
    /// Predict the next price move from a CSV of bars.
    Predict {
        /// CSV with timestamp,open,high,low,close[,volume] columns.
        #[arg(long)]
        csv: PathBuf,

        /// Symbol to report. Defaults to the file stem.
        #[arg(long)]
        symbol: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;

    match cli.command {
        Commands::Run { config, output_dir } => run_backtest_cmd(&config, &output_dir),
        Commands::Sweep {
            config,
            fast,
            slow,
            top,
        } => run_sweep_cmd(&config, fast, slow, top),
        Commands::Patterns { csv } => run_patterns_cmd(&csv),
        Commands::Predict { csv, symbol } => run_predict_cmd(&csv, symbol),
    }
}

fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = std::env::var("BACONALGO_LOG").unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| anyhow::anyhow!("invalid log filter: {err}"))?;

    // Logs go to stderr so JSON on stdout stays machine-readable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
    Ok(())
}

fn run_backtest_cmd(config_path: &Path, output_dir: &Path) -> Result<()> {
    let config = BacktestConfig::from_file(config_path)?;
    debug!(config = %config_path.display(), "config loaded");

    let result = run_single_backtest(&config)?;
    print_summary(&result);

    // Save full artifact set (manifest.json, trades.csv, equity.csv)
    let run_dir = save_artifacts(&result, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn run_sweep_cmd(
    config_path: &Path,
    fast: Vec<usize>,
    slow: Vec<usize>,
    top: Option<usize>,
) -> Result<()> {
    let config = BacktestConfig::from_file(config_path)?;

    let defaults = SweepGrid::ma_crossover_default();
    let grid = SweepGrid {
        fast_periods: if fast.is_empty() { defaults.fast_periods } else { fast },
        slow_periods: if slow.is_empty() { defaults.slow_periods } else { slow },
    };
    if grid.size() == 0 {
        bail!("sweep grid has no valid (fast, slow) pairs; every fast period must be below a slow one");
    }

    let entries = run_sweep(&config, &grid)?;
    let shown = top.unwrap_or(entries.len()).min(entries.len());
    print_sweep_table(&config.backtest.symbol, &entries[..shown]);
    Ok(())
}

fn run_patterns_cmd(csv: &Path) -> Result<()> {
    let series = CsvBarSource::new(csv, symbol_from_path(csv)).load()?;
    let matches = detect_patterns(&series.bars);
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

fn run_predict_cmd(csv: &Path, symbol: Option<String>) -> Result<()> {
    let symbol = symbol.unwrap_or_else(|| symbol_from_path(csv));
    let series = CsvBarSource::new(csv, symbol.clone()).load()?;
    let prediction = predict_price_movement(
        &symbol,
        &series.closes(),
        &MovingAveragePredictor::default(),
    );
    let json = serde_json::to_string_pretty(&prediction).context("failed to encode prediction")?;
    println!("{json}");
    Ok(())
}

fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| baconalgo_core::domain::UNKNOWN_SYMBOL.to_string())
}

fn print_summary(result: &BacktestResult) {
    let m = &result.metrics;
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", result.symbol);
    println!("Strategy:       {}", result.strategy);
    println!("Bars:           {}", result.bar_count);
    println!("Run ID:         {}", &result.run_id[..result.run_id.len().min(12)]);
    println!();
    println!("--- Performance ---");
    println!("Initial:        {:.2}", result.initial_balance);
    println!("Final:          {:.2}", m.final_balance);
    println!("Total Profit:   {:.2} ({:.2}%)", m.total_profit, m.total_profit_pct);
    println!(
        "Trades:         {} ({} won, {} lost)",
        m.total_trades, m.winning_trades, m.losing_trades
    );
    println!("Win Rate:       {:.2}%", m.win_rate);
    println!("Avg Profit:     {:.2}", m.avg_profit_per_trade);
    println!("Max Drawdown:   {:.2}%", m.max_drawdown);
    println!("Sharpe:         {:.2}", m.sharpe_ratio);
    println!();
}

fn print_sweep_table(symbol: &str, entries: &[SweepEntry]) {
    println!();
    println!("=== MA Crossover Sweep: {symbol} ===");
    println!(
        "{:>4}  {:>4}  {:>4}  {:>7}  {:>10}  {:>8}  {:>7}  {:>7}",
        "rank", "fast", "slow", "trades", "profit", "return%", "win%", "sharpe"
    );
    for (rank, e) in entries.iter().enumerate() {
        let m = &e.metrics;
        println!(
            "{:>4}  {:>4}  {:>4}  {:>7}  {:>10.2}  {:>8.2}  {:>7.2}  {:>7.2}",
            rank + 1,
            e.fast,
            e.slow,
            m.total_trades,
            m.total_profit,
            m.total_profit_pct,
            m.win_rate,
            m.sharpe_ratio
        );
    }
    println!();
}
