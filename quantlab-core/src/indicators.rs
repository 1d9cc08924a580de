//! Indicator helpers used by the built-in strategies and the engine.
//!
//! Everything here is a pure function of a trailing slice: values up to and
//! including the current bar, never beyond it.

use crate::domain::Candle;

/// Simple moving average over the last `period` values.
///
/// Returns `None` when the slice holds fewer than `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let tail = &values[values.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}

/// Rate of change over the last `period` bars, as a percentage.
///
/// `roc = (last - value_period_bars_ago) / value_period_bars_ago * 100`.
pub fn roc(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }
    let last = values[values.len() - 1];
    let past = values[values.len() - 1 - period];
    if past == 0.0 {
        return None;
    }
    Some((last - past) / past * 100.0)
}

/// True range of a candle given the previous close.
///
/// `max(high - low, |high - prev_close|, |low - prev_close|)`; with no
/// previous close it degrades to `high - low`.
pub fn true_range(candle: &Candle, prev_close: Option<f64>) -> f64 {
    let hl = candle.high - candle.low;
    match prev_close {
        Some(pc) => hl.max((candle.high - pc).abs()).max((candle.low - pc).abs()),
        None => hl,
    }
}

/// ATR-style volatility: average true range over the last
/// `min(window_len, period)` candles of the window.
///
/// Returns 0.0 on an empty window.
pub fn window_atr(window: &[Candle], period: usize) -> f64 {
    if window.is_empty() || period == 0 {
        return 0.0;
    }
    let depth = window.len().min(period);
    let start = window.len() - depth;
    let mut sum = 0.0;
    for i in start..window.len() {
        let prev_close = if i > 0 { Some(window[i - 1].close) } else { None };
        sum += true_range(&window[i], prev_close);
    }
    sum / depth as f64
}

/// Closing prices of a candle window.
pub fn closes(window: &[Candle]) -> Vec<f64> {
    window.iter().map(|c| c.close).collect()
}
