//! QuantLab Runner — orchestration on top of the core engine.
//!
//! - Pure performance metrics over the trade ledger
//! - Single-run orchestration (registry lookup → engine → metrics)
//! - Rayon-parallel batch entry point over many strategies
//! - TOML run configuration
//! - Report generation: plain text, lossless JSON, trade-tape CSV

pub mod batch;
pub mod config;
pub mod metrics;
pub mod report;
pub mod runner;

pub use batch::run_all_backtests;
pub use config::RunConfig;
pub use metrics::PerformanceMetrics;
pub use report::{export_json, format_report, import_json, save_artifacts};
pub use runner::{run_single_backtest, BacktestResult, RunError, RunLabels, SCHEMA_VERSION};
