//! Command handler implementations.
//!
//! Each submodule owns one subcommand. Shared plumbing for turning the
//! deployment-input arguments into a `ConfigSource` lives here.

pub mod completions;
pub mod flags;
pub mod render;
pub mod services;

use topoform_adapters::{InMemoryConfig, LayeredConfig, YamlFileConfig};
use topoform_core::{
    application::ports::ConfigSource,
    domain::{Catalog, ConfigValue, DomainError},
};

use crate::{
    cli::DeploymentArgs,
    config::AppConfig,
    error::{CliError, CliResult},
};

/// Build the configuration source for one invocation: the deployment file
/// (explicit flag, or the tool config's default, or empty) with `--set`
/// overrides layered on top.
pub(crate) fn build_config_source(
    args: &DeploymentArgs,
    config: &AppConfig,
    catalog: &Catalog,
) -> CliResult<Box<dyn ConfigSource>> {
    let base: Box<dyn ConfigSource> = match args
        .deployment
        .as_ref()
        .or(config.defaults.deployment_file.as_ref())
    {
        Some(path) => Box::new(YamlFileConfig::load(path)?),
        None => Box::new(InMemoryConfig::new()),
    };

    if args.set.is_empty() {
        return Ok(base);
    }

    let overrides = InMemoryConfig::new();
    for raw in &args.set {
        let Some((name, value)) = raw.split_once('=') else {
            return Err(CliError::InvalidOverride {
                argument: raw.clone(),
            });
        };
        // Catch typos here rather than letting an unknown override be
        // silently ignored by the resolver's declared-names snapshot.
        if catalog.flag_decl(name).is_none() && catalog.param_decl(name).is_none() {
            return Err(CliError::Core(
                DomainError::UndeclaredName {
                    name: name.to_string(),
                }
                .into(),
            ));
        }
        overrides.set(name, parse_override(value))?;
    }
    Ok(Box::new(LayeredConfig::new(overrides, base)))
}

/// `--set` values parse as booleans, then integers, then strings.
fn parse_override(raw: &str) -> ConfigValue {
    if let Ok(b) = raw.parse::<bool>() {
        return ConfigValue::Bool(b);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return ConfigValue::Integer(i);
    }
    ConfigValue::Str(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_values_parse_bool_then_int_then_string() {
        assert_eq!(parse_override("true"), ConfigValue::Bool(true));
        assert_eq!(parse_override("false"), ConfigValue::Bool(false));
        assert_eq!(parse_override("42"), ConfigValue::Integer(42));
        assert_eq!(parse_override("8.4"), ConfigValue::Str("8.4".into()));
        assert_eq!(parse_override("s3cret"), ConfigValue::Str("s3cret".into()));
    }

    #[test]
    fn unknown_override_name_is_rejected() {
        let catalog = topoform_adapters::builtin_catalog::standard_catalog().unwrap();
        let args = DeploymentArgs {
            deployment: None,
            set: vec!["enable-caching=false".into()],
        };
        let err = build_config_source(&args, &AppConfig::default(), &catalog)
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn malformed_override_is_a_user_error() {
        let catalog = topoform_adapters::builtin_catalog::standard_catalog().unwrap();
        let args = DeploymentArgs {
            deployment: None,
            set: vec!["enable-cache".into()],
        };
        let err = build_config_source(&args, &AppConfig::default(), &catalog)
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), 2);
    }
}
