//! TradeResult — a completed round-trip trade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    /// The strategy's exit rule signalled SELL.
    SignalExit,
    /// Price reached the stop-loss fixed at entry.
    StopLoss,
    /// Price reached the take-profit fixed at entry.
    TakeProfit,
    /// The series ended with the position still open.
    EndOfData,
}

impl ExitReason {
    /// Wire name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::SignalExit => "SIGNAL_EXIT",
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TakeProfit => "TAKE_PROFIT",
            ExitReason::EndOfData => "END_OF_DATA",
        }
    }
}

/// A complete round-trip trade record: entry → exit.
///
/// Append-only; the engine emits exactly one per position lifecycle, in
/// chronological exit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub pnl_usd: f64,
    pub pnl_percent: f64,
    pub exit_reason: ExitReason,
    pub duration_minutes: i64,
}

impl TradeResult {
    pub fn is_winner(&self) -> bool {
        self.pnl_usd > 0.0
    }
}
