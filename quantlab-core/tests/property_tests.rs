//! Property tests for engine invariants.
//!
//! Uses proptest to verify, across random seeds, trends, and series lengths:
//! 1. Accounting conservation — final value equals initial plus ledger sum
//! 2. Ledger ordering — trades close in chronological order, never overlap
//! 3. Sign consistency — per-trade USD and percent P&L agree in sign
//! 4. Generator sanity — synthetic candles always satisfy OHLC bounds

use proptest::prelude::*;

use quantlab_core::data::{generate, Trend};
use quantlab_core::engine::{run_backtest, EngineConfig};
use quantlab_core::strategy::StrategyRegistry;

fn arb_trend() -> impl Strategy<Value = Trend> {
    prop_oneof![
        Just(Trend::Bullish),
        Just(Trend::Bearish),
        Just(Trend::Sideways),
    ]
}

fn arb_strategy_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ma_crossover".to_string()),
        Just("momentum".to_string()),
        Just("mean_reversion".to_string()),
    ]
}

// ── 1. Accounting conservation ───────────────────────────────────────

proptest! {
    /// Whatever the strategy does, the final portfolio value is exactly
    /// the initial capital plus the sum of closed-trade P&L.
    #[test]
    fn conservation(
        seed in any::<u64>(),
        trend in arb_trend(),
        count in 50usize..400,
        name in arb_strategy_name(),
    ) {
        let candles = generate(count, 100.0, trend, seed);
        let registry = StrategyRegistry::with_builtins();
        let strategy = registry.create(&name).unwrap();
        let result = run_backtest(&candles, &strategy, &EngineConfig::default());

        let ledger_sum: f64 = result.trades.iter().map(|t| t.pnl_usd).sum();
        let drift = (result.final_portfolio_value - result.initial_capital - ledger_sum).abs();
        prop_assert!(drift < 1e-6, "accounting drift: {drift}");
    }
}

// ── 2. Ledger ordering ───────────────────────────────────────────────

proptest! {
    /// Trades never overlap and close in chronological order, and every
    /// trade exits at or after its entry.
    #[test]
    fn ledger_is_ordered(
        seed in any::<u64>(),
        trend in arb_trend(),
        name in arb_strategy_name(),
    ) {
        let candles = generate(300, 100.0, trend, seed);
        let registry = StrategyRegistry::with_builtins();
        let strategy = registry.create(&name).unwrap();
        let result = run_backtest(&candles, &strategy, &EngineConfig::default());

        for trade in &result.trades {
            prop_assert!(trade.entry_time <= trade.exit_time);
            prop_assert!(trade.duration_minutes >= 0);
        }
        for pair in result.trades.windows(2) {
            prop_assert!(pair[0].exit_time <= pair[1].entry_time);
        }
    }
}

// ── 3. Sign consistency ──────────────────────────────────────────────

proptest! {
    /// USD and percent P&L always agree in sign, and quantities are positive.
    #[test]
    fn pnl_signs_agree(
        seed in any::<u64>(),
        trend in arb_trend(),
        name in arb_strategy_name(),
    ) {
        let candles = generate(300, 100.0, trend, seed);
        let registry = StrategyRegistry::with_builtins();
        let strategy = registry.create(&name).unwrap();
        let result = run_backtest(&candles, &strategy, &EngineConfig::default());

        for trade in &result.trades {
            prop_assert!(trade.quantity > 0.0);
            prop_assert!(trade.entry_price > 0.0);
            prop_assert!(
                trade.pnl_usd.signum() == trade.pnl_percent.signum()
                    || (trade.pnl_usd.abs() < 1e-12 && trade.pnl_percent.abs() < 1e-12)
            );
        }
    }
}

// ── 4. Generator sanity ──────────────────────────────────────────────

proptest! {
    /// Every synthetic candle satisfies the OHLC sanity bounds, stays
    /// positive, and advances the clock by exactly one minute.
    #[test]
    fn synthetic_candles_are_sane(
        seed in any::<u64>(),
        trend in arb_trend(),
        count in 1usize..500,
    ) {
        let candles = generate(count, 100.0, trend, seed);
        prop_assert_eq!(candles.len(), count);

        for candle in &candles {
            prop_assert!(candle.is_sane());
            prop_assert!(candle.low > 0.0);
        }
        for pair in candles.windows(2) {
            prop_assert_eq!(
                (pair[1].timestamp - pair[0].timestamp).num_minutes(),
                1
            );
            // Continuity: each candle opens at the previous close.
            prop_assert!((pair[1].open - pair[0].close).abs() < 1e-12);
        }
    }

    /// The same seed always reproduces the identical series.
    #[test]
    fn synthetic_generation_is_deterministic(
        seed in any::<u64>(),
        trend in arb_trend(),
    ) {
        let a = generate(100, 100.0, trend, seed);
        let b = generate(100, 100.0, trend, seed);
        prop_assert_eq!(a, b);
    }
}
