//! In-memory configuration source.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use topoform_core::{
    application::{ApplicationError, ports::ConfigSource},
    domain::ConfigValue,
    error::TopoResult,
};

/// Thread-safe in-memory configuration source.
///
/// Used for tests and for CLI `--set name=value` overrides layered on top of
/// a file source.
#[derive(Clone, Default)]
pub struct InMemoryConfig {
    inner: Arc<RwLock<HashMap<String, ConfigValue>>>,
}

impl InMemoryConfig {
    /// Create a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any earlier one for the same name.
    pub fn set(&self, name: impl Into<String>, value: impl Into<ConfigValue>) -> TopoResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_error())?;
        inner.insert(name.into(), value.into());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConfigSource for InMemoryConfig {
    fn get(&self, name: &str) -> TopoResult<Option<ConfigValue>> {
        let inner = self.inner.read().map_err(|_| lock_error())?;
        Ok(inner.get(name).cloned())
    }
}

/// A source that consults `overrides` first and falls back to `base`.
///
/// This is how CLI `--set` values win over the deployment file without the
/// composer knowing about layering at all.
pub struct LayeredConfig {
    overrides: InMemoryConfig,
    base: Box<dyn ConfigSource>,
}

impl LayeredConfig {
    pub fn new(overrides: InMemoryConfig, base: Box<dyn ConfigSource>) -> Self {
        Self { overrides, base }
    }
}

impl ConfigSource for LayeredConfig {
    fn get(&self, name: &str) -> TopoResult<Option<ConfigValue>> {
        if let Some(value) = self.overrides.get(name)? {
            return Ok(Some(value));
        }
        self.base.get(name)
    }
}

fn lock_error() -> ApplicationError {
    ApplicationError::LockPoisoned {
        context: "in-memory configuration".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips_each_value_kind() {
        let config = InMemoryConfig::new();
        config.set("enable-cache", false).unwrap();
        config.set("app-worker-count", 4i64).unwrap();
        config.set("data-root", "/srv/data").unwrap();

        assert_eq!(
            config.get("enable-cache").unwrap(),
            Some(ConfigValue::Bool(false))
        );
        assert_eq!(
            config.get("app-worker-count").unwrap(),
            Some(ConfigValue::Integer(4))
        );
        assert_eq!(config.get("missing").unwrap(), None);
    }

    #[test]
    fn layered_overrides_win_over_base() {
        let base = InMemoryConfig::new();
        base.set("data-root", "/base").unwrap();
        base.set("enable-cache", true).unwrap();

        let overrides = InMemoryConfig::new();
        overrides.set("data-root", "/override").unwrap();

        let layered = LayeredConfig::new(overrides, Box::new(base));
        assert_eq!(
            layered.get("data-root").unwrap(),
            Some(ConfigValue::Str("/override".into()))
        );
        assert_eq!(
            layered.get("enable-cache").unwrap(),
            Some(ConfigValue::Bool(true))
        );
    }
}
