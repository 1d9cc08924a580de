//! Strategy contract — entry, exit, and risk capabilities.
//!
//! A strategy is a named bundle of three pluggable rules. Entry and exit
//! rules are pure functions of a bounded trailing candle window (exit also
//! sees the active entry price); the risk rule maps portfolio value, entry
//! price, and a volatility measure to a position size. Rules never see
//! portfolio or ledger state beyond those arguments — the engine owns the
//! state machine.

pub mod ma_crossover;
pub mod mean_reversion;
pub mod momentum;
pub mod registry;
pub mod risk;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Candle;

pub use registry::{StrategyNotFound, StrategyRegistry};
pub use risk::FixedFractionRisk;

/// Error raised by a rule on a single bar.
///
/// The engine absorbs these: the bar is treated as HOLD, a warning is
/// recorded with the bar's timestamp, and the run continues.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct StrategyError(pub String);

/// Directional intent of an entry rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryAction {
    Buy,
    Hold,
}

/// Directional intent of an exit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitAction {
    Sell,
    Hold,
}

/// An entry decision plus its human-readable justification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySignal {
    pub action: EntryAction,
    pub reason: String,
}

impl EntrySignal {
    pub fn buy(reason: impl Into<String>) -> Self {
        Self {
            action: EntryAction::Buy,
            reason: reason.into(),
        }
    }

    pub fn hold(reason: impl Into<String>) -> Self {
        Self {
            action: EntryAction::Hold,
            reason: reason.into(),
        }
    }
}

/// An exit decision plus its human-readable justification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitSignal {
    pub action: ExitAction,
    pub reason: String,
}

impl ExitSignal {
    pub fn sell(reason: impl Into<String>) -> Self {
        Self {
            action: ExitAction::Sell,
            reason: reason.into(),
        }
    }

    pub fn hold(reason: impl Into<String>) -> Self {
        Self {
            action: ExitAction::Hold,
            reason: reason.into(),
        }
    }
}

/// Output of a risk rule: how much to buy and where the brackets sit.
///
/// `quantity == 0.0` means "too small to trade" — the engine opens nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSize {
    pub quantity: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_value_usd: f64,
}

impl PositionSize {
    /// The zero size: no position is opened.
    pub fn none() -> Self {
        Self {
            quantity: 0.0,
            stop_loss: 0.0,
            take_profit: 0.0,
            position_value_usd: 0.0,
        }
    }
}

/// Entry capability: decides whether to open a position.
///
/// # Architecture invariant
/// `evaluate` receives only the trailing window ending at the current bar.
/// Implementations must not look beyond the last element (no lookahead)
/// and never see portfolio state.
pub trait EntryRule: Send + Sync {
    fn evaluate(&self, window: &[Candle]) -> Result<EntrySignal, StrategyError>;
}

/// Exit capability: decides whether to close the open position.
pub trait ExitRule: Send + Sync {
    fn evaluate(&self, window: &[Candle], entry_price: f64) -> Result<ExitSignal, StrategyError>;
}

/// Risk capability: sizes a prospective position.
///
/// Implementations must guarantee `position_value_usd <= portfolio_value`
/// and return `quantity > 0` only when the trade is viable.
pub trait RiskRule: Send + Sync {
    fn position_size(
        &self,
        portfolio_value: f64,
        entry_price: f64,
        volatility: f64,
    ) -> Result<PositionSize, StrategyError>;
}

/// A named bundle of the three capabilities. Produced by the registry.
pub struct Strategy {
    pub name: String,
    pub entry: Box<dyn EntryRule>,
    pub exit: Box<dyn ExitRule>,
    pub risk: Box<dyn RiskRule>,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}
