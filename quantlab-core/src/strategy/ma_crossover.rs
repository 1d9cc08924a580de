//! Moving-average crossover strategy.
//!
//! Entry: fast SMA crosses above slow SMA on the current bar.
//! Exit: fast SMA back below slow SMA.

use crate::domain::Candle;
use crate::indicators::{closes, sma};

use super::{
    EntryRule, EntrySignal, ExitRule, ExitSignal, FixedFractionRisk, Strategy, StrategyError,
};

#[derive(Debug, Clone)]
pub struct MaCrossover {
    pub fast: usize,
    pub slow: usize,
}

impl Default for MaCrossover {
    fn default() -> Self {
        Self { fast: 10, slow: 30 }
    }
}

impl MaCrossover {
    pub fn into_strategy(self) -> Strategy {
        Strategy {
            name: "ma_crossover".to_string(),
            entry: Box::new(self.clone()),
            exit: Box::new(self),
            risk: Box::new(FixedFractionRisk::default()),
        }
    }

    /// Fast and slow SMA at the window's last bar and one bar earlier.
    fn averages(&self, window: &[Candle]) -> Option<(f64, f64, f64, f64)> {
        if window.len() < self.slow + 1 {
            return None;
        }
        let prices = closes(window);
        let prev = &prices[..prices.len() - 1];
        Some((
            sma(&prices, self.fast)?,
            sma(&prices, self.slow)?,
            sma(prev, self.fast)?,
            sma(prev, self.slow)?,
        ))
    }
}

impl EntryRule for MaCrossover {
    fn evaluate(&self, window: &[Candle]) -> Result<EntrySignal, StrategyError> {
        if self.fast >= self.slow {
            return Err(StrategyError(format!(
                "fast period {} must be below slow period {}",
                self.fast, self.slow
            )));
        }
        let Some((fast, slow, prev_fast, prev_slow)) = self.averages(window) else {
            return Ok(EntrySignal::hold("insufficient history for slow average"));
        };

        if prev_fast <= prev_slow && fast > slow {
            Ok(EntrySignal::buy(format!(
                "fast SMA {fast:.4} crossed above slow SMA {slow:.4}"
            )))
        } else {
            Ok(EntrySignal::hold("no bullish crossover"))
        }
    }
}

impl ExitRule for MaCrossover {
    fn evaluate(&self, window: &[Candle], _entry_price: f64) -> Result<ExitSignal, StrategyError> {
        let Some((fast, slow, _, _)) = self.averages(window) else {
            return Ok(ExitSignal::hold("insufficient history for slow average"));
        };

        if fast < slow {
            Ok(ExitSignal::sell(format!(
                "fast SMA {fast:.4} dropped below slow SMA {slow:.4}"
            )))
        } else {
            Ok(ExitSignal::hold("fast SMA still above slow"))
        }
    }
}
