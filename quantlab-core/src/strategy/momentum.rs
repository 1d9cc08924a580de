//! Momentum breakout strategy.
//!
//! Entry: rate of change over the lookback exceeds a breakout threshold.
//! Exit: momentum has faded to or below zero.

use crate::domain::Candle;
use crate::indicators::{closes, roc};

use super::{
    EntryRule, EntrySignal, ExitRule, ExitSignal, FixedFractionRisk, Strategy, StrategyError,
};

#[derive(Debug, Clone)]
pub struct Momentum {
    pub period: usize,
    /// Entry threshold in percent.
    pub threshold: f64,
}

impl Default for Momentum {
    fn default() -> Self {
        Self {
            period: 10,
            threshold: 2.0,
        }
    }
}

impl Momentum {
    pub fn into_strategy(self) -> Strategy {
        Strategy {
            name: "momentum".to_string(),
            entry: Box::new(self.clone()),
            exit: Box::new(self),
            risk: Box::new(FixedFractionRisk::default()),
        }
    }
}

impl EntryRule for Momentum {
    fn evaluate(&self, window: &[Candle]) -> Result<EntrySignal, StrategyError> {
        let prices = closes(window);
        let Some(momentum) = roc(&prices, self.period) else {
            return Ok(EntrySignal::hold("insufficient history for momentum"));
        };

        if momentum > self.threshold {
            Ok(EntrySignal::buy(format!(
                "momentum {momentum:.2}% above breakout threshold {:.2}%",
                self.threshold
            )))
        } else {
            Ok(EntrySignal::hold(format!(
                "momentum {momentum:.2}% below threshold"
            )))
        }
    }
}

impl ExitRule for Momentum {
    fn evaluate(&self, window: &[Candle], _entry_price: f64) -> Result<ExitSignal, StrategyError> {
        let prices = closes(window);
        let Some(momentum) = roc(&prices, self.period) else {
            return Ok(ExitSignal::hold("insufficient history for momentum"));
        };

        if momentum <= 0.0 {
            Ok(ExitSignal::sell(format!("momentum faded to {momentum:.2}%")))
        } else {
            Ok(ExitSignal::hold(format!("momentum still {momentum:.2}%")))
        }
    }
}
