//! QuantLab CLI — generate, run, and batch commands.
//!
//! Commands:
//! - `generate` — write a seeded synthetic candle series as CSV
//! - `run` — backtest one strategy over a CSV file or synthetic data
//! - `batch` — run every configured strategy from a TOML config and save artifacts

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use quantlab_core::data::{generate, load_csv, save_csv, Trend};
use quantlab_core::domain::Candle;
use quantlab_core::engine::EngineConfig;
use quantlab_core::strategy::StrategyRegistry;
use quantlab_runner::runner::run_single_backtest;
use quantlab_runner::{
    format_report, run_all_backtests, save_artifacts, BacktestResult, RunConfig, RunLabels,
};

#[derive(Parser)]
#[command(
    name = "quantlab",
    about = "QuantLab CLI — strategy backtesting engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a seeded synthetic candle series and write it as CSV.
    Generate {
        /// Output CSV path.
        output: PathBuf,

        /// Number of candles to generate.
        #[arg(long, default_value_t = 1000)]
        count: usize,

        /// Starting price.
        #[arg(long, default_value_t = 100.0)]
        base_price: f64,

        /// Directional bias: bullish, bearish, or sideways.
        #[arg(long, default_value = "sideways")]
        trend: Trend,

        /// Seed for reproducible output.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Backtest one strategy over a CSV file or synthetic data.
    Run {
        /// Strategy name (see `batch` config for the full list).
        strategy: String,

        /// Path to a candle CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Use synthetic data instead of a CSV file.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Synthetic candle count.
        #[arg(long, default_value_t = 1000)]
        count: usize,

        /// Synthetic trend bias.
        #[arg(long, default_value = "sideways")]
        trend: Trend,

        /// Synthetic seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Starting portfolio value in USD.
        #[arg(long, default_value_t = 10_000.0)]
        capital: f64,

        /// Market regime label recorded in the result.
        #[arg(long, default_value = "unknown")]
        regime: String,

        /// Timeframe label recorded in the result.
        #[arg(long, default_value = "1m")]
        timeframe: String,
    },
    /// Run every configured strategy from a TOML config and save artifacts.
    Batch {
        /// Path to the TOML run configuration.
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            output,
            count,
            base_price,
            trend,
            seed,
        } => run_generate(output, count, base_price, trend, seed),
        Commands::Run {
            strategy,
            csv,
            synthetic,
            count,
            trend,
            seed,
            capital,
            regime,
            timeframe,
        } => run_single_cmd(
            strategy, csv, synthetic, count, trend, seed, capital, regime, timeframe,
        ),
        Commands::Batch { config } => run_batch_cmd(&config),
    }
}

fn run_generate(
    output: PathBuf,
    count: usize,
    base_price: f64,
    trend: Trend,
    seed: u64,
) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    let candles = generate(count, base_price, trend, seed);
    save_csv(&candles, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Wrote {count} {trend} candles (seed {seed}) to {}",
        output.display()
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_single_cmd(
    strategy: String,
    csv: Option<PathBuf>,
    synthetic: bool,
    count: usize,
    trend: Trend,
    seed: u64,
    capital: f64,
    regime: String,
    timeframe: String,
) -> Result<()> {
    if csv.is_some() && synthetic {
        bail!("--csv and --synthetic are mutually exclusive");
    }

    let candles: Vec<Candle> = if let Some(path) = csv {
        let loaded = load_csv(&path)?;
        for warning in &loaded.warnings {
            eprintln!("WARNING: {warning}");
        }
        loaded.candles
    } else if synthetic {
        generate(count, 100.0, trend, seed)
    } else {
        bail!("one of --csv or --synthetic is required");
    };

    let registry = StrategyRegistry::with_builtins();
    let labels = RunLabels { regime, timeframe };
    let config = EngineConfig::new(capital);

    let result = run_single_backtest(&strategy, &candles, &labels, &config, &registry)
        .with_context(|| {
            format!(
                "available strategies: {}",
                registry.names().join(", ")
            )
        })?;

    print_summary(&result);
    Ok(())
}

fn run_batch_cmd(config_path: &PathBuf) -> Result<()> {
    let config = RunConfig::from_file(config_path)?;
    let (candles, data_warnings) = config.resolve_candles()?;
    for warning in &data_warnings {
        eprintln!("WARNING: {warning}");
    }

    let registry = StrategyRegistry::with_builtins();
    let names = if config.run.strategies.is_empty() {
        registry.names()
    } else {
        config.run.strategies.clone()
    };

    let outcomes = run_all_backtests(
        &names,
        &candles,
        &config.labels(),
        &config.engine_config(),
        &registry,
    );

    let mut results: BTreeMap<String, BacktestResult> = BTreeMap::new();
    let mut failures: Vec<(String, String)> = Vec::new();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                results.insert(name, result);
            }
            Err(err) => failures.push((name, err.to_string())),
        }
    }

    print!("{}", format_report(&results));

    if !results.is_empty() {
        let written = save_artifacts(&results, &config.output.dir)?;
        println!();
        println!(
            "Saved {} artifact file(s) to {}",
            written.len(),
            config.output.dir.display()
        );
    }

    if !failures.is_empty() {
        for (name, err) in &failures {
            eprintln!("Error for {name}: {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let m = &result.metrics;
    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:       {}", result.strategy_name);
    println!("Regime:         {}", result.regime);
    if let (Some(start), Some(end)) = (result.start_date, result.end_date) {
        println!("Period:         {} to {}", start.to_rfc3339(), end.to_rfc3339());
    }
    println!("Trades:         {}", m.total_trades);
    println!();
    println!("--- Performance ---");
    println!("Total Return:   {:.2}%", m.total_pnl_percent);
    println!("Total P&L:      ${:.2}", m.total_pnl_usd);
    println!("Sharpe:         {:.3}", m.sharpe_ratio);
    println!("Max Drawdown:   ${:.2} ({:.2}%)", m.max_drawdown_usd, m.max_drawdown_percent);
    println!("Win Rate:       {:.1}%", m.win_rate);
    println!("Profit Factor:  {:.2}", m.profit_factor);
    println!("Best Trade:     ${:.2}", m.best_trade_usd);
    println!("Worst Trade:    ${:.2}", m.worst_trade_usd);
    for warning in &result.warnings {
        println!("WARNING: {warning}");
    }
    println!();
}
