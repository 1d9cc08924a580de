//! Strategy registry — name-keyed construction of strategy bundles.
//!
//! Strategies are registered explicitly at construction time; there is no
//! filesystem discovery and no process-global cache. The registry is
//! read-only after construction and may be shared across parallel runs.

use std::collections::BTreeMap;

use thiserror::Error;

use super::ma_crossover::MaCrossover;
use super::mean_reversion::MeanReversion;
use super::momentum::Momentum;
use super::Strategy;

/// Request for a strategy name nobody registered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("strategy '{0}' is not registered")]
pub struct StrategyNotFound(pub String);

type Builder = fn() -> Strategy;

/// Name → constructor mapping for strategy bundles.
pub struct StrategyRegistry {
    builders: BTreeMap<String, Builder>,
}

impl StrategyRegistry {
    /// An empty registry. Callers register their own strategies.
    pub fn new() -> Self {
        Self {
            builders: BTreeMap::new(),
        }
    }

    /// A registry pre-populated with the built-in reference strategies.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("ma_crossover", || MaCrossover::default().into_strategy());
        registry.register("momentum", || Momentum::default().into_strategy());
        registry.register("mean_reversion", || {
            MeanReversion::default().into_strategy()
        });
        registry
    }

    pub fn register(&mut self, name: &str, builder: Builder) {
        self.builders.insert(name.to_string(), builder);
    }

    /// Construct a fresh strategy instance for `name`.
    pub fn create(&self, name: &str) -> Result<Strategy, StrategyNotFound> {
        match self.builders.get(name) {
            Some(builder) => Ok(builder()),
            None => Err(StrategyNotFound(name.to_string())),
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.builders.keys().cloned().collect()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = StrategyRegistry::with_builtins();
        let names = registry.names();
        assert_eq!(names, vec!["ma_crossover", "mean_reversion", "momentum"]);
    }

    #[test]
    fn create_returns_named_strategy() {
        let registry = StrategyRegistry::with_builtins();
        let strategy = registry.create("momentum").unwrap();
        assert_eq!(strategy.name, "momentum");
    }

    #[test]
    fn unknown_name_is_an_error() {
        let registry = StrategyRegistry::with_builtins();
        let err = registry.create("hodl_forever").unwrap_err();
        assert_eq!(err, StrategyNotFound("hodl_forever".to_string()));
        assert!(err.to_string().contains("hodl_forever"));
    }

    #[test]
    fn empty_registry_has_no_names() {
        let registry = StrategyRegistry::new();
        assert!(registry.names().is_empty());
    }
}
