//! Single-backtest orchestration: strategy lookup, engine run, metric
//! computation, and assembly of the persisted result artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quantlab_core::domain::{Candle, TradeResult};
use quantlab_core::engine::{run_backtest, EngineConfig};
use quantlab_core::strategy::StrategyRegistry;

use crate::metrics::PerformanceMetrics;

/// Version stamp on every persisted result. Bump when the JSON shape
/// changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

/// Describes the market context a run was made under. Labels only; the
/// engine never reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLabels {
    pub regime: String,
    pub timeframe: String,
}

impl Default for RunLabels {
    fn default() -> Self {
        Self {
            regime: "unknown".to_string(),
            timeframe: "1m".to_string(),
        }
    }
}

/// Complete record of one strategy's backtest, ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub schema_version: u32,
    pub strategy_name: String,
    pub regime: String,
    pub timeframe: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub initial_capital: f64,
    pub final_portfolio_value: f64,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<TradeResult>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("unknown strategy '{0}'")]
    StrategyNotFound(String),
}

/// Run one named strategy over a candle series and package the outcome.
///
/// Strategy lookup is the only fallible step; the engine itself absorbs
/// rule errors into warnings rather than aborting the run.
pub fn run_single_backtest(
    strategy_name: &str,
    candles: &[Candle],
    labels: &RunLabels,
    config: &EngineConfig,
    registry: &StrategyRegistry,
) -> Result<BacktestResult, RunError> {
    let strategy = registry
        .create(strategy_name)
        .map_err(|e| RunError::StrategyNotFound(e.0))?;

    let run = run_backtest(candles, &strategy, config);
    let metrics = PerformanceMetrics::compute(
        &run.trades,
        run.final_portfolio_value,
        run.initial_capital,
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        strategy_name: strategy_name.to_string(),
        regime: labels.regime.clone(),
        timeframe: labels.timeframe.clone(),
        start_date: run.start_time,
        end_date: run.end_time,
        initial_capital: run.initial_capital,
        final_portfolio_value: run.final_portfolio_value,
        metrics,
        trades: run.trades,
        warnings: run.warnings,
    })
}
