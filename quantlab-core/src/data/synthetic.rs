//! Synthetic series generation — a seedable, trend-biased random walk.
//!
//! Each candle opens at the previous close and moves by
//! `drift + volatility * noise`; high and low are bounded random offsets
//! around the open/close body. A fixed seed reproduces the series exactly.

use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::Candle;

/// Directional bias of the generated walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    Sideways,
}

impl Trend {
    /// Per-candle drift as a fraction of price.
    fn drift(self) -> f64 {
        match self {
            Trend::Bullish => 0.0004,
            Trend::Bearish => -0.0004,
            Trend::Sideways => 0.0,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Bullish => "bullish",
            Trend::Bearish => "bearish",
            Trend::Sideways => "sideways",
        };
        f.write_str(s)
    }
}

impl FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bullish" => Ok(Trend::Bullish),
            "bearish" => Ok(Trend::Bearish),
            "sideways" => Ok(Trend::Sideways),
            other => Err(format!(
                "unknown trend '{other}' (expected bullish, bearish, or sideways)"
            )),
        }
    }
}

/// Per-candle noise amplitude as a fraction of price.
const VOLATILITY: f64 = 0.002;

/// Maximum wick extension beyond the candle body, as a fraction of price.
const MAX_WICK: f64 = 0.0015;

/// Price floor so a long bearish walk never reaches zero.
const MIN_PRICE: f64 = 0.01;

/// Generate `count` one-minute candles starting from `base_price`.
///
/// Deterministic for a fixed `(count, base_price, trend, seed)` tuple.
pub fn generate(count: usize, base_price: f64, trend: Trend, seed: u64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let drift = trend.drift();

    let mut candles = Vec::with_capacity(count);
    let mut price = base_price.max(MIN_PRICE);

    for i in 0..count {
        let open = price;
        let noise: f64 = rng.gen_range(-1.0..1.0);
        let close = (open * (1.0 + drift + VOLATILITY * noise)).max(MIN_PRICE);

        let body_high = open.max(close);
        let body_low = open.min(close);
        let high = body_high * (1.0 + rng.gen_range(0.0..MAX_WICK));
        let low = (body_low * (1.0 - rng.gen_range(0.0..MAX_WICK))).max(MIN_PRICE * 0.5);
        let volume = rng.gen_range(500.0..5_000.0);

        candles.push(Candle {
            timestamp: start + Duration::minutes(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }

    candles
}
