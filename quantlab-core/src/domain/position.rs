//! Position — the engine's single open holding.

use chrono::{DateTime, Utc};

use super::trade::{ExitReason, TradeResult};

/// An open long position.
///
/// Created only by a BUY entry signal; the engine holds at most one at a
/// time. The stop-loss and take-profit thresholds are fixed at entry and
/// never adjusted afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub quantity: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl Position {
    /// Consume the position into a completed trade at the given exit.
    pub fn into_trade(
        self,
        exit_time: DateTime<Utc>,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> TradeResult {
        let pnl_usd = (exit_price - self.entry_price) * self.quantity;
        let pnl_percent = if self.entry_price > 0.0 {
            (exit_price - self.entry_price) / self.entry_price * 100.0
        } else {
            0.0
        };
        let duration_minutes = (exit_time - self.entry_time).num_minutes();

        TradeResult {
            entry_time: self.entry_time,
            exit_time,
            entry_price: self.entry_price,
            exit_price,
            quantity: self.quantity,
            pnl_usd,
            pnl_percent,
            exit_reason,
            duration_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_position() -> Position {
        Position {
            entry_price: 100.0,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap(),
            quantity: 2.0,
            stop_loss: 95.0,
            take_profit: 112.0,
        }
    }

    #[test]
    fn into_trade_computes_pnl() {
        let exit_time = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let trade = sample_position().into_trade(exit_time, 110.0, ExitReason::TakeProfit);

        assert!((trade.pnl_usd - 20.0).abs() < 1e-10);
        assert!((trade.pnl_percent - 10.0).abs() < 1e-10);
        assert_eq!(trade.duration_minutes, 120);
        assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
    }

    #[test]
    fn into_trade_losing_exit() {
        let exit_time = Utc.with_ymd_and_hms(2024, 1, 2, 10, 30, 0).unwrap();
        let trade = sample_position().into_trade(exit_time, 95.0, ExitReason::StopLoss);

        assert!((trade.pnl_usd - (-10.0)).abs() < 1e-10);
        assert!((trade.pnl_percent - (-5.0)).abs() < 1e-10);
        assert_eq!(trade.duration_minutes, 30);
    }
}
