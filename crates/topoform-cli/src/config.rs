//! Application configuration.
//!
//! [`AppConfig`] is the *tool's* own settings (colour, default deployment
//! file, default patches directory) — not the deployment configuration the
//! Flag Resolver consumes; that one travels through the `ConfigSource` port.
//! Loaded once at startup and passed down by value; the core crates never
//! see it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `TOPOFORM_*` environment variables
//! 3. Config file (`--config FILE` or the default location)
//! 4. Built-in defaults (always present)

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default input locations.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Deployment file used when `--deployment` is not given.
    pub deployment_file: Option<PathBuf>,
    /// Patches directory used when `--patches-dir` is not given.
    pub patches_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "human".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the config file (if any), then
    /// `TOPOFORM_*` environment variables (`TOPOFORM_OUTPUT__NO_COLOR=1`).
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();

        let file = config_file.cloned().or_else(|| {
            let default = Self::config_path();
            default.exists().then_some(default)
        });
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TOPOFORM")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .context("failed to assemble configuration sources")?;
        config
            .try_deserialize()
            .context("invalid tool configuration")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.topoform.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "topoform", "topoform")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".topoform.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_empty_and_colored() {
        let cfg = AppConfig::default();
        assert!(cfg.defaults.deployment_file.is_none());
        assert!(!cfg.output.no_color);
        assert_eq!(cfg.output.format, "human");
    }

    #[test]
    fn load_without_file_returns_defaults() {
        let cfg = AppConfig::load(None).unwrap();
        assert!(cfg.defaults.patches_dir.is_none());
    }

    #[test]
    fn config_path_is_non_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
