//! Implementation of the `topoform flags` command.

use tracing::instrument;

use topoform_adapters::builtin_catalog;
use topoform_core::domain::ConfigValue;

use crate::{
    cli::{FlagsArgs, GlobalArgs, ListFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Effective value of one declaration, for display only. Unlike the flag
/// resolver this never fails: a missing required parameter renders as
/// "(unset, required)" instead of aborting the listing.
fn effective(configured: Option<&ConfigValue>, default: Option<String>) -> String {
    match (configured, default) {
        (Some(value), _) => format!("{value} (configured)"),
        (None, Some(default)) => format!("{default} (default)"),
        (None, None) => "(unset, required)".into(),
    }
}

#[instrument(skip_all)]
pub fn execute(
    args: FlagsArgs,
    _global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let catalog = builtin_catalog::standard_catalog()?;
    let source = super::build_config_source(&args.deployment, &config, &catalog)?;

    match args.format {
        ListFormat::Table => {
            output.header("Flags:")?;
            for decl in catalog.flags() {
                let value = effective(source.get(&decl.name)?.as_ref(), Some(decl.default.to_string()));
                output.print(&format!("  {:<24} {}", decl.name, value))?;
            }
            output.header("Parameters:")?;
            for decl in catalog.params() {
                let value = effective(source.get(&decl.name)?.as_ref(), decl.default.clone());
                output.print(&format!("  {:<24} {}", decl.name, value))?;
            }
        }

        ListFormat::List => {
            for decl in catalog.flags() {
                println!("{}", decl.name);
            }
            for decl in catalog.params() {
                println!("{}", decl.name);
            }
        }

        ListFormat::Json => {
            let mut entries = Vec::new();
            for decl in catalog.flags() {
                entries.push(serde_json::json!({
                    "name": decl.name,
                    "kind": "flag",
                    "default": decl.default,
                    "configured": source.get(&decl.name)?,
                }));
            }
            for decl in catalog.params() {
                entries.push(serde_json::json!({
                    "name": decl.name,
                    "kind": "parameter",
                    "default": decl.default,
                    "configured": source.get(&decl.name)?,
                }));
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".into())
            );
        }
    }

    Ok(())
}
