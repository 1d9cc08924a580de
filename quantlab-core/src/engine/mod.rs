//! Bar-by-bar simulation engine.

pub mod run;
pub mod state;

pub use run::run_backtest;
pub use state::{EngineConfig, RunResult};
