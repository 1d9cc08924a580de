//! Performance metrics — pure functions from the trade ledger to statistics.
//!
//! Every metric is a pure function: trades in, scalar out. Empty ledgers
//! produce zeros, never NaN and never a division-by-zero panic.

use serde::{Deserialize, Serialize};

use quantlab_core::domain::TradeResult;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percentage of winning trades, 0–100.
    pub win_rate: f64,
    pub total_pnl_usd: f64,
    /// Portfolio return over the run, in percent of initial capital.
    pub total_pnl_percent: f64,
    pub avg_pnl_usd: f64,
    /// Mean per-trade percent return over its sample standard deviation.
    pub sharpe_ratio: f64,
    pub max_drawdown_usd: f64,
    pub max_drawdown_percent: f64,
    pub profit_factor: f64,
    pub avg_duration_minutes: f64,
    pub best_trade_usd: f64,
    pub worst_trade_usd: f64,
    pub avg_win_usd: f64,
    pub avg_loss_usd: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from a trade ledger and the final accounting.
    pub fn compute(
        trades: &[TradeResult],
        final_portfolio_value: f64,
        initial_capital: f64,
    ) -> Self {
        let total_trades = trades.len();
        let winners: Vec<&TradeResult> = trades.iter().filter(|t| t.is_winner()).collect();
        let losers: Vec<&TradeResult> = trades.iter().filter(|t| t.pnl_usd < 0.0).collect();

        let total_pnl_usd: f64 = trades.iter().map(|t| t.pnl_usd).sum();
        let total_pnl_percent = if initial_capital > 0.0 {
            (final_portfolio_value - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };

        let (max_drawdown_usd, max_drawdown_percent) = max_drawdown(trades, initial_capital);

        Self {
            total_trades,
            winning_trades: winners.len(),
            losing_trades: losers.len(),
            win_rate: win_rate(trades),
            total_pnl_usd,
            total_pnl_percent,
            avg_pnl_usd: mean(&trades.iter().map(|t| t.pnl_usd).collect::<Vec<_>>()),
            sharpe_ratio: sharpe_ratio(trades),
            max_drawdown_usd,
            max_drawdown_percent,
            profit_factor: profit_factor(trades),
            avg_duration_minutes: mean(
                &trades
                    .iter()
                    .map(|t| t.duration_minutes as f64)
                    .collect::<Vec<_>>(),
            ),
            best_trade_usd: trades.iter().map(|t| t.pnl_usd).fold(0.0, f64::max),
            worst_trade_usd: trades.iter().map(|t| t.pnl_usd).fold(0.0, f64::min),
            avg_win_usd: mean(&winners.iter().map(|t| t.pnl_usd).collect::<Vec<_>>()),
            avg_loss_usd: mean(&losers.iter().map(|t| t.pnl_usd).collect::<Vec<_>>()),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Winning trades as a percentage of all trades. 0 for an empty ledger.
pub fn win_rate(trades: &[TradeResult]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// Sharpe ratio over per-trade percent returns.
///
/// `mean(pnl_percent) / stdev(pnl_percent)` with the sample standard
/// deviation; 0 with fewer than two trades or zero deviation.
pub fn sharpe_ratio(trades: &[TradeResult]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = trades.iter().map(|t| t.pnl_percent).collect();
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean(&returns) / std
}

/// Maximum peak-to-trough drawdown over the trade ledger.
///
/// Cumulative P&L is evaluated after each trade close (sequential on the
/// ledger, not intrabar). Returns `(usd, percent)`; percent is measured
/// against the portfolio value at the running peak.
pub fn max_drawdown(trades: &[TradeResult], initial_capital: f64) -> (f64, f64) {
    let mut cumulative = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd_usd = 0.0_f64;
    let mut max_dd_pct = 0.0_f64;

    for trade in trades {
        cumulative += trade.pnl_usd;
        if cumulative > peak {
            peak = cumulative;
        }
        let dd = peak - cumulative;
        if dd > max_dd_usd {
            max_dd_usd = dd;
        }
        let base = initial_capital + peak;
        if base > 0.0 {
            let dd_pct = dd / base * 100.0;
            if dd_pct > max_dd_pct {
                max_dd_pct = dd_pct;
            }
        }
    }

    (max_dd_usd, max_dd_pct)
}

/// Gross profit over gross loss.
///
/// An all-winning run has no loss to divide by; the raw gross profit is
/// returned instead ("infinite" profit factor, kept finite).
pub fn profit_factor(trades: &[TradeResult]) -> f64 {
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.pnl_usd > 0.0)
        .map(|t| t.pnl_usd)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl_usd < 0.0)
        .map(|t| t.pnl_usd.abs())
        .sum();

    if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else {
        gross_profit
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
