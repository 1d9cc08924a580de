//! Engine configuration and run output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::TradeResult;

/// Engine tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Starting portfolio value in USD.
    pub initial_capital: f64,
    /// Maximum trailing window handed to the strategy.
    pub window_depth: usize,
    /// Bars required before any signal is evaluated.
    pub min_window: usize,
    /// Positions whose value falls below this are not opened.
    pub min_notional_usd: f64,
    /// True-range averaging depth for the volatility fed to the risk rule.
    pub atr_period: usize,
}

impl EngineConfig {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            window_depth: 100,
            min_window: 20,
            min_notional_usd: 10.0,
            atr_period: 14,
        }
    }
}

/// Raw output of one engine run: the trade ledger plus accounting totals.
///
/// Aggregate metrics are computed downstream; the engine only records what
/// happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub trades: Vec<TradeResult>,
    pub initial_capital: f64,
    pub final_portfolio_value: f64,
    pub bars_processed: usize,
    pub signals_evaluated: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Recoverable problems encountered during the run (strategy errors,
    /// short input). Collected here rather than logged inline.
    pub warnings: Vec<String>,
}

impl RunResult {
    /// The empty run: no bars, no trades, portfolio untouched.
    pub fn empty(initial_capital: f64) -> Self {
        Self {
            trades: Vec::new(),
            initial_capital,
            final_portfolio_value: initial_capital,
            bars_processed: 0,
            signals_evaluated: 0,
            start_time: None,
            end_time: None,
            warnings: Vec::new(),
        }
    }

    pub fn total_pnl_usd(&self) -> f64 {
        self.final_portfolio_value - self.initial_capital
    }
}
