//! Batch run configuration — TOML file describing the data source, the
//! strategies to run, and where artifacts land.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quantlab_core::data::{generate, load_csv, DataError, Trend};
use quantlab_core::domain::Candle;
use quantlab_core::engine::EngineConfig;
use quantlab_core::rng::SeedHierarchy;

use crate::runner::RunLabels;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Top-level batch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub run: RunSection,
    pub data: DataSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSection {
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    #[serde(default = "default_regime")]
    pub regime: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    /// Empty means "every registered strategy".
    #[serde(default)]
    pub strategies: Vec<String>,
}

/// Where candles come from. `csv` reads `path`; `synthetic` generates
/// `count` candles from `base_price` with the given `trend` and `seed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSection {
    pub source: DataSource,
    pub path: Option<PathBuf>,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_base_price")]
    pub base_price: f64,
    #[serde(default)]
    pub trend: Trend,
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Csv,
    Synthetic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_initial_capital() -> f64 {
    10_000.0
}
fn default_regime() -> String {
    "unknown".to_string()
}
fn default_timeframe() -> String {
    "1m".to_string()
}
fn default_count() -> usize {
    1_000
}
fn default_base_price() -> f64 {
    100.0
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("backtest_results")
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.run.initial_capital <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_capital must be positive, got {}",
                self.run.initial_capital
            )));
        }
        if self.data.source == DataSource::Csv && self.data.path.is_none() {
            return Err(ConfigError::Invalid(
                "data.source = \"csv\" requires data.path".to_string(),
            ));
        }
        if self.data.source == DataSource::Synthetic && self.data.count == 0 {
            return Err(ConfigError::Invalid(
                "data.count must be at least 1 for synthetic data".to_string(),
            ));
        }
        Ok(())
    }

    /// Materialize the candle series this config describes, plus any
    /// data-quality warnings raised while loading.
    ///
    /// Synthetic data derives its candle seed from the configured master
    /// seed, so adding other seeded stages later will not perturb it.
    pub fn resolve_candles(&self) -> Result<(Vec<Candle>, Vec<String>), ConfigError> {
        match self.data.source {
            DataSource::Csv => {
                let path = self
                    .data
                    .path
                    .as_ref()
                    .ok_or_else(|| ConfigError::Invalid("data.path is missing".to_string()))?;
                let loaded = load_csv(path)?;
                Ok((loaded.candles, loaded.warnings))
            }
            DataSource::Synthetic => {
                let seeds = SeedHierarchy::new(self.data.seed);
                let candles = generate(
                    self.data.count,
                    self.data.base_price,
                    self.data.trend,
                    seeds.sub_seed("candles", 0),
                );
                Ok((candles, Vec::new()))
            }
        }
    }

    pub fn labels(&self) -> RunLabels {
        RunLabels {
            regime: self.run.regime.clone(),
            timeframe: self.run.timeframe.clone(),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.run.initial_capital)
    }
}
