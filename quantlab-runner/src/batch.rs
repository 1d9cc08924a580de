//! Batch execution: fan a candle series out across many strategies in
//! parallel and collect every outcome, failures included.

use std::collections::BTreeMap;

use rayon::prelude::*;

use quantlab_core::domain::Candle;
use quantlab_core::engine::EngineConfig;
use quantlab_core::strategy::StrategyRegistry;

use crate::runner::{run_single_backtest, BacktestResult, RunError, RunLabels};

/// Run every named strategy over the same series.
///
/// Each strategy gets its own engine run with a fresh portfolio; runs are
/// independent, so they execute in parallel. An unknown strategy is
/// recorded as an error under its name and the batch continues. The
/// `BTreeMap` keeps output ordering stable regardless of scheduling.
pub fn run_all_backtests(
    strategy_names: &[String],
    candles: &[Candle],
    labels: &RunLabels,
    config: &EngineConfig,
    registry: &StrategyRegistry,
) -> BTreeMap<String, Result<BacktestResult, RunError>> {
    strategy_names
        .par_iter()
        .map(|name| {
            let result = run_single_backtest(name, candles, labels, config, registry);
            (name.clone(), result)
        })
        .collect()
}
