//! Implementation of the `topoform services` command.

use tracing::instrument;

use topoform_adapters::{InMemoryPatchRegistry, builtin_catalog};
use topoform_core::application::ComposeService;

use crate::{
    cli::{GlobalArgs, ListFormat, ServicesArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(
    args: ServicesArgs,
    _global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let catalog = builtin_catalog::standard_catalog()?;
    let source = super::build_config_source(&args.deployment, &config, &catalog)?;
    let graph =
        ComposeService::new(source, Box::new(InMemoryPatchRegistry::new())).compose(&catalog)?;

    let inactive: Vec<&str> = catalog
        .services()
        .map(|s| s.name.as_str())
        .filter(|name| !graph.contains(name))
        .collect();

    match args.format {
        ListFormat::Table => {
            output.header("Active services:")?;
            for service in graph.services() {
                let edges = if service.depends_on.is_empty() {
                    String::new()
                } else {
                    format!("  (after: {})", service.depends_on.join(", "))
                };
                output.print(&format!("  {}{}", service.name, edges))?;
            }
            if args.all && !inactive.is_empty() {
                output.header("Inactive services:")?;
                for name in &inactive {
                    output.print(&format!("  {name}"))?;
                }
            }
        }

        ListFormat::List => {
            for service in graph.services() {
                println!("{}", service.name);
            }
        }

        ListFormat::Json => {
            // Raw stdout so the JSON stays parseable in pipes.
            let entries: Vec<serde_json::Value> = graph
                .services()
                .map(|s| {
                    serde_json::json!({
                        "name": s.name,
                        "active": true,
                        "depends_on": s.depends_on,
                    })
                })
                .chain(args.all.then_some(&inactive).into_iter().flatten().map(
                    |name| {
                        serde_json::json!({
                            "name": name,
                            "active": false,
                            "depends_on": [],
                        })
                    },
                ))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".into())
            );
        }
    }

    Ok(())
}
