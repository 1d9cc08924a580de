//! Core domain types: candles, positions, completed trades.

pub mod candle;
pub mod position;
pub mod trade;

pub use candle::Candle;
pub use position::Position;
pub use trade::{ExitReason, TradeResult};
