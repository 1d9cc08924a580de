//! Fixed-fraction risk sizing with volatility-scaled brackets.

use super::{PositionSize, RiskRule, StrategyError};

/// Risk a fixed fraction of the portfolio per trade.
///
/// The stop sits `stop_mult` volatility units below entry and the target
/// `target_mult` units above; quantity is chosen so a stop-out loses
/// `risk_fraction` of the portfolio. Position value is capped at
/// `max_position_fraction` of the portfolio, and anything below
/// `min_notional_usd` collapses to the zero size.
#[derive(Debug, Clone)]
pub struct FixedFractionRisk {
    pub risk_fraction: f64,
    pub stop_mult: f64,
    pub target_mult: f64,
    pub max_position_fraction: f64,
    pub min_notional_usd: f64,
}

impl Default for FixedFractionRisk {
    fn default() -> Self {
        Self {
            risk_fraction: 0.02,
            stop_mult: 2.0,
            target_mult: 3.0,
            max_position_fraction: 0.25,
            min_notional_usd: 10.0,
        }
    }
}

impl RiskRule for FixedFractionRisk {
    fn position_size(
        &self,
        portfolio_value: f64,
        entry_price: f64,
        volatility: f64,
    ) -> Result<PositionSize, StrategyError> {
        if entry_price <= 0.0 {
            return Err(StrategyError(format!(
                "non-positive entry price {entry_price}"
            )));
        }
        if portfolio_value <= 0.0 {
            return Ok(PositionSize::none());
        }

        // Degenerate volatility (flat window) falls back to 1% of price so
        // the stop distance is never zero.
        let vol = if volatility > 0.0 {
            volatility
        } else {
            entry_price * 0.01
        };

        let stop_distance = self.stop_mult * vol;
        let risk_budget = portfolio_value * self.risk_fraction;
        let mut quantity = risk_budget / stop_distance;
        let mut position_value = quantity * entry_price;

        let max_value = portfolio_value * self.max_position_fraction;
        if position_value > max_value {
            position_value = max_value;
            quantity = position_value / entry_price;
        }

        if position_value < self.min_notional_usd {
            return Ok(PositionSize::none());
        }

        Ok(PositionSize {
            quantity,
            stop_loss: (entry_price - stop_distance).max(0.0),
            take_profit: entry_price + self.target_mult * vol,
            position_value_usd: position_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_by_risk_budget() {
        let risk = FixedFractionRisk::default();
        // vol 1.0 → stop distance 2.0; budget 2% of 10_000 = 200 → qty 100,
        // value 10_000 — capped at 25% of portfolio.
        let size = risk.position_size(10_000.0, 100.0, 1.0).unwrap();
        assert!((size.position_value_usd - 2_500.0).abs() < 1e-9);
        assert!((size.quantity - 25.0).abs() < 1e-9);
        assert!((size.stop_loss - 98.0).abs() < 1e-9);
        assert!((size.take_profit - 103.0).abs() < 1e-9);
    }

    #[test]
    fn uncapped_when_volatile() {
        let risk = FixedFractionRisk::default();
        // vol 10.0 → stop distance 20; budget 200 → qty 10, value 1_000.
        let size = risk.position_size(10_000.0, 100.0, 10.0).unwrap();
        assert!((size.quantity - 10.0).abs() < 1e-9);
        assert!((size.position_value_usd - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn position_value_never_exceeds_portfolio() {
        let risk = FixedFractionRisk {
            max_position_fraction: 1.0,
            ..FixedFractionRisk::default()
        };
        let size = risk.position_size(500.0, 100.0, 0.01).unwrap();
        assert!(size.position_value_usd <= 500.0 + 1e-9);
    }

    #[test]
    fn tiny_portfolio_returns_zero_size() {
        let risk = FixedFractionRisk::default();
        // 25% cap of $30 portfolio = $7.50 < $10 minimum notional
        let size = risk.position_size(30.0, 100.0, 1.0).unwrap();
        assert_eq!(size, PositionSize::none());
    }

    #[test]
    fn zero_volatility_falls_back() {
        let risk = FixedFractionRisk::default();
        let size = risk.position_size(10_000.0, 100.0, 0.0).unwrap();
        assert!(size.quantity > 0.0);
        assert!(size.stop_loss < 100.0);
        assert!(size.take_profit > 100.0);
    }

    #[test]
    fn bad_entry_price_is_an_error() {
        let risk = FixedFractionRisk::default();
        assert!(risk.position_size(10_000.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn stop_never_negative() {
        let risk = FixedFractionRisk::default();
        let size = risk.position_size(10_000.0, 1.0, 5.0).unwrap();
        assert!(size.stop_loss >= 0.0);
    }
}
