//! Mean-reversion strategy.
//!
//! Entry: close dips a fixed fraction below its SMA.
//! Exit: close reverts back up to the SMA.

use crate::domain::Candle;
use crate::indicators::{closes, sma};

use super::{
    EntryRule, EntrySignal, ExitRule, ExitSignal, FixedFractionRisk, Strategy, StrategyError,
};

#[derive(Debug, Clone)]
pub struct MeanReversion {
    pub period: usize,
    /// Entry deviation below the mean, as a fraction (0.02 = 2%).
    pub deviation: f64,
}

impl Default for MeanReversion {
    fn default() -> Self {
        Self {
            period: 20,
            deviation: 0.02,
        }
    }
}

impl MeanReversion {
    pub fn into_strategy(self) -> Strategy {
        Strategy {
            name: "mean_reversion".to_string(),
            entry: Box::new(self.clone()),
            exit: Box::new(self),
            risk: Box::new(FixedFractionRisk::default()),
        }
    }
}

impl EntryRule for MeanReversion {
    fn evaluate(&self, window: &[Candle]) -> Result<EntrySignal, StrategyError> {
        let prices = closes(window);
        let Some(mean) = sma(&prices, self.period) else {
            return Ok(EntrySignal::hold("insufficient history for mean"));
        };
        let last = prices[prices.len() - 1];
        let entry_level = mean * (1.0 - self.deviation);

        if last < entry_level {
            Ok(EntrySignal::buy(format!(
                "close {last:.4} stretched {:.1}% below mean {mean:.4}",
                (mean - last) / mean * 100.0
            )))
        } else {
            Ok(EntrySignal::hold("close within band of mean"))
        }
    }
}

impl ExitRule for MeanReversion {
    fn evaluate(&self, window: &[Candle], _entry_price: f64) -> Result<ExitSignal, StrategyError> {
        let prices = closes(window);
        let Some(mean) = sma(&prices, self.period) else {
            return Ok(ExitSignal::hold("insufficient history for mean"));
        };
        let last = prices[prices.len() - 1];

        if last >= mean {
            Ok(ExitSignal::sell(format!(
                "close {last:.4} reverted to mean {mean:.4}"
            )))
        } else {
            Ok(ExitSignal::hold("close still below mean"))
        }
    }
}
