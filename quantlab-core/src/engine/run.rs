//! The bar-by-bar simulation loop — the heart of the backtesting engine.
//!
//! Two states: flat and in-position. Per bar, strictly in timestamp order:
//! 1. Build the trailing window ending at the current bar.
//! 2. In position: evaluate the exit rule, then the stop-loss threshold,
//!    then the take-profit threshold. The first condition that holds closes
//!    the position at the bar's close and records its reason.
//! 3. Flat: evaluate the entry rule; on BUY, size the position from the
//!    window's average true range and open it if the notional clears the
//!    minimum.
//!
//! A rule returning an error on some bar is absorbed: the bar counts as
//! HOLD, a warning records the timestamp, and the run continues.

use crate::domain::{Candle, ExitReason, Position, TradeResult};
use crate::indicators::window_atr;
use crate::strategy::{EntryAction, ExitAction, Strategy};

use super::state::{EngineConfig, RunResult};

/// Run one strategy over one candle series.
///
/// Fewer bars than `config.min_window` yields the empty result with a
/// warning instead of an error, so batch callers never abort on one short
/// input. A position still open after the final bar is force-closed at
/// that bar's close with `ExitReason::EndOfData`.
pub fn run_backtest(candles: &[Candle], strategy: &Strategy, config: &EngineConfig) -> RunResult {
    if candles.len() < config.min_window {
        let mut result = RunResult::empty(config.initial_capital);
        result.warnings.push(format!(
            "insufficient data: {} bars, minimum {}",
            candles.len(),
            config.min_window
        ));
        return result;
    }

    let mut portfolio_value = config.initial_capital;
    let mut open_position: Option<Position> = None;
    let mut trades: Vec<TradeResult> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();
    let mut signals_evaluated = 0usize;

    for t in 0..candles.len() {
        // Bars before the minimum window depth are skipped, no state change.
        if t + 1 < config.min_window {
            continue;
        }

        let window_start = (t + 1).saturating_sub(config.window_depth);
        let window = &candles[window_start..=t];
        let current = &candles[t];
        let price = current.close;

        match open_position.take() {
            Some(position) => {
                // Exit-signal check runs before the threshold checks: when a
                // SELL signal and a stop/take threshold are both true on the
                // same bar, the signal supplies the exit reason.
                signals_evaluated += 1;
                let exit_signal = match strategy.exit.evaluate(window, position.entry_price) {
                    Ok(signal) => signal,
                    Err(e) => {
                        warnings.push(format!(
                            "bar {}: exit rule error ({e}), treated as hold",
                            current.timestamp
                        ));
                        crate::strategy::ExitSignal::hold("rule error")
                    }
                };

                let exit_reason = if exit_signal.action == ExitAction::Sell {
                    Some(ExitReason::SignalExit)
                } else if price <= position.stop_loss {
                    Some(ExitReason::StopLoss)
                } else if price >= position.take_profit {
                    Some(ExitReason::TakeProfit)
                } else {
                    None
                };

                match exit_reason {
                    Some(reason) => {
                        let trade = position.into_trade(current.timestamp, price, reason);
                        portfolio_value += trade.pnl_usd;
                        trades.push(trade);
                        // open_position stays None: back to flat
                    }
                    None => {
                        open_position = Some(position);
                    }
                }
            }
            None => {
                signals_evaluated += 1;
                let entry_signal = match strategy.entry.evaluate(window) {
                    Ok(signal) => signal,
                    Err(e) => {
                        warnings.push(format!(
                            "bar {}: entry rule error ({e}), treated as hold",
                            current.timestamp
                        ));
                        crate::strategy::EntrySignal::hold("rule error")
                    }
                };

                if entry_signal.action == EntryAction::Buy {
                    let volatility = window_atr(window, config.atr_period);
                    match strategy.risk.position_size(portfolio_value, price, volatility) {
                        Ok(size) => {
                            if size.quantity > 0.0
                                && size.position_value_usd >= config.min_notional_usd
                            {
                                open_position = Some(Position {
                                    entry_price: price,
                                    entry_time: current.timestamp,
                                    quantity: size.quantity,
                                    stop_loss: size.stop_loss,
                                    take_profit: size.take_profit,
                                });
                            }
                            // Too small to trade: no position, no warning.
                        }
                        Err(e) => {
                            warnings.push(format!(
                                "bar {}: risk rule error ({e}), entry skipped",
                                current.timestamp
                            ));
                        }
                    }
                }
            }
        }
    }

    // Terminal state must be flat: force-close at the last candle's close.
    if let Some(position) = open_position.take() {
        let last = candles
            .last()
            .expect("non-empty series guaranteed by the min_window check");
        let trade = position.into_trade(last.timestamp, last.close, ExitReason::EndOfData);
        portfolio_value += trade.pnl_usd;
        trades.push(trade);
    }

    RunResult {
        trades,
        initial_capital: config.initial_capital,
        final_portfolio_value: portfolio_value,
        bars_processed: candles.len(),
        signals_evaluated,
        start_time: candles.first().map(|c| c.timestamp),
        end_time: candles.last().map(|c| c.timestamp),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{
        EntryRule, EntrySignal, ExitRule, ExitSignal, PositionSize, RiskRule, StrategyError,
    };
    use chrono::{Duration, TimeZone, Utc};

    fn series(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle {
                timestamp: start + Duration::minutes(i as i64),
                open: c,
                high: c + 0.5,
                low: c - 0.5,
                close: c,
                volume: 1_000.0,
            })
            .collect()
    }

    /// Never trades.
    struct HoldAll;

    impl EntryRule for HoldAll {
        fn evaluate(&self, _window: &[Candle]) -> Result<EntrySignal, StrategyError> {
            Ok(EntrySignal::hold("never enters"))
        }
    }

    impl ExitRule for HoldAll {
        fn evaluate(
            &self,
            _window: &[Candle],
            _entry_price: f64,
        ) -> Result<ExitSignal, StrategyError> {
            Ok(ExitSignal::hold("never exits"))
        }
    }

    /// Fixed-quantity risk with wide brackets.
    struct FixedRisk {
        quantity: f64,
    }

    impl RiskRule for FixedRisk {
        fn position_size(
            &self,
            _portfolio_value: f64,
            entry_price: f64,
            _volatility: f64,
        ) -> Result<PositionSize, StrategyError> {
            Ok(PositionSize {
                quantity: self.quantity,
                stop_loss: entry_price * 0.5,
                take_profit: entry_price * 2.0,
                position_value_usd: self.quantity * entry_price,
            })
        }
    }

    /// Buys when the close equals `at`, never exits by signal.
    struct BuyAt {
        at: f64,
    }

    impl EntryRule for BuyAt {
        fn evaluate(&self, window: &[Candle]) -> Result<EntrySignal, StrategyError> {
            let last = window.last().unwrap();
            if (last.close - self.at).abs() < 1e-9 {
                Ok(EntrySignal::buy("scripted entry"))
            } else {
                Ok(EntrySignal::hold("waiting"))
            }
        }
    }

    /// Errors on every bar.
    struct AlwaysErr;

    impl EntryRule for AlwaysErr {
        fn evaluate(&self, _window: &[Candle]) -> Result<EntrySignal, StrategyError> {
            Err(StrategyError("deliberate failure".to_string()))
        }
    }

    fn strategy(
        entry: impl EntryRule + 'static,
        exit: impl ExitRule + 'static,
        risk: impl RiskRule + 'static,
    ) -> Strategy {
        Strategy {
            name: "scripted".to_string(),
            entry: Box::new(entry),
            exit: Box::new(exit),
            risk: Box::new(risk),
        }
    }

    fn small_config() -> EngineConfig {
        EngineConfig {
            initial_capital: 10_000.0,
            window_depth: 100,
            min_window: 2,
            min_notional_usd: 10.0,
            atr_period: 14,
        }
    }

    #[test]
    fn insufficient_data_yields_empty_result() {
        let candles = series(&[100.0, 101.0, 102.0]);
        let strategy = strategy(HoldAll, HoldAll, FixedRisk { quantity: 1.0 });
        let config = EngineConfig::new(10_000.0); // min_window 20 > 3 bars

        let result = run_backtest(&candles, &strategy, &config);
        assert!(result.trades.is_empty());
        assert_eq!(result.bars_processed, 0);
        assert!((result.final_portfolio_value - 10_000.0).abs() < 1e-10);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("insufficient data"));
    }

    #[test]
    fn hold_strategy_never_trades() {
        let candles = series(&[100.0; 50]);
        let strategy = strategy(HoldAll, HoldAll, FixedRisk { quantity: 1.0 });
        let result = run_backtest(&candles, &strategy, &small_config());

        assert!(result.trades.is_empty());
        assert!((result.final_portfolio_value - 10_000.0).abs() < 1e-10);
        assert_eq!(result.bars_processed, 50);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn still_open_position_force_closed_at_end() {
        let candles = series(&[100.0, 100.0, 100.0, 104.0]);
        let strategy = strategy(BuyAt { at: 100.0 }, HoldAll, FixedRisk { quantity: 1.0 });
        let result = run_backtest(&candles, &strategy, &small_config());

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::EndOfData);
        assert!((trade.exit_price - 104.0).abs() < 1e-10);
        assert!((trade.pnl_usd - 4.0).abs() < 1e-10);
        assert!((result.final_portfolio_value - 10_004.0).abs() < 1e-10);
    }

    #[test]
    fn stop_loss_closes_position() {
        // Entry at 100, stop at 50 (FixedRisk), dips to 49
        let candles = series(&[100.0, 100.0, 80.0, 49.0, 60.0]);
        let strategy = strategy(BuyAt { at: 100.0 }, HoldAll, FixedRisk { quantity: 2.0 });
        let result = run_backtest(&candles, &strategy, &small_config());

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        assert!((trade.exit_price - 49.0).abs() < 1e-10);
        assert!((trade.pnl_usd - (-102.0)).abs() < 1e-10);
    }

    #[test]
    fn take_profit_closes_position() {
        // Entry at 100, take-profit at 200, spikes to 210
        let candles = series(&[100.0, 100.0, 150.0, 210.0, 190.0]);
        let strategy = strategy(BuyAt { at: 100.0 }, HoldAll, FixedRisk { quantity: 1.0 });
        let result = run_backtest(&candles, &strategy, &small_config());

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_reason, ExitReason::TakeProfit);
        assert!((result.trades[0].pnl_usd - 110.0).abs() < 1e-10);
    }

    #[test]
    fn signal_exit_wins_tie_against_stop() {
        /// Sells as soon as there is a position to sell.
        struct SellNow;
        impl ExitRule for SellNow {
            fn evaluate(
                &self,
                _window: &[Candle],
                _entry_price: f64,
            ) -> Result<ExitSignal, StrategyError> {
                Ok(ExitSignal::sell("scripted exit"))
            }
        }

        // Next bar after entry crashes through the stop, but the SELL signal
        // is evaluated first and supplies the reason.
        let candles = series(&[100.0, 100.0, 40.0, 40.0]);
        let strategy = strategy(BuyAt { at: 100.0 }, SellNow, FixedRisk { quantity: 1.0 });
        let result = run_backtest(&candles, &strategy, &small_config());

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_reason, ExitReason::SignalExit);
    }

    #[test]
    fn rule_errors_become_warnings_not_failures() {
        let candles = series(&[100.0; 10]);
        let strategy = strategy(AlwaysErr, HoldAll, FixedRisk { quantity: 1.0 });
        let result = run_backtest(&candles, &strategy, &small_config());

        assert!(result.trades.is_empty());
        // One warning per evaluated bar (bars 1..9 with min_window 2)
        assert_eq!(result.warnings.len(), 9);
        assert!(result.warnings[0].contains("entry rule error"));
        assert!(result.warnings[0].contains("deliberate failure"));
        assert!((result.final_portfolio_value - 10_000.0).abs() < 1e-10);
    }

    #[test]
    fn below_min_notional_opens_nothing() {
        let candles = series(&[100.0, 100.0, 100.0, 100.0]);
        // Quantity 0.05 at price 100 → $5 notional, below the $10 minimum
        let strategy = strategy(BuyAt { at: 100.0 }, HoldAll, FixedRisk { quantity: 0.05 });
        let result = run_backtest(&candles, &strategy, &small_config());
        assert!(result.trades.is_empty());
    }

    #[test]
    fn portfolio_value_tracks_sum_of_trades() {
        // Two full cycles: buy at 100, stop out at 49; buy again at 100 via
        // scripted entry, force-close at end.
        let candles = series(&[100.0, 100.0, 49.0, 100.0, 100.0, 120.0]);
        let strategy = strategy(BuyAt { at: 100.0 }, HoldAll, FixedRisk { quantity: 1.0 });
        let result = run_backtest(&candles, &strategy, &small_config());

        assert_eq!(result.trades.len(), 2);
        let sum: f64 = result.trades.iter().map(|t| t.pnl_usd).sum();
        assert!((result.total_pnl_usd() - sum).abs() < 1e-9);
    }

    #[test]
    fn trades_ordered_by_exit_time() {
        let candles = series(&[100.0, 100.0, 49.0, 100.0, 100.0, 49.0, 80.0]);
        let strategy = strategy(BuyAt { at: 100.0 }, HoldAll, FixedRisk { quantity: 1.0 });
        let result = run_backtest(&candles, &strategy, &small_config());

        for pair in result.trades.windows(2) {
            assert!(pair[0].exit_time <= pair[1].exit_time);
        }
    }
}
