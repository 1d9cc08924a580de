//! QuantLab Core — domain types, series provider, strategy contract, simulation loop.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (candles, positions, completed trades)
//! - Historical series provider (CSV load + seedable synthetic generation)
//! - Strategy contract (entry / exit / risk traits) with a name-keyed registry
//! - Bar-by-bar simulation loop with a flat / in-position state machine
//! - Small indicator helpers (SMA, ROC, true range)

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod rng;
pub mod strategy;
