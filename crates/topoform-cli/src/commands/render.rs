//! Implementation of the `topoform render` command.

use tracing::{debug, info, instrument};

use topoform_adapters::{ComposeProjector, InMemoryPatchRegistry, builtin_catalog};
use topoform_core::application::ComposeService;

use crate::{
    cli::{GlobalArgs, RenderArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(
    args: RenderArgs,
    _global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let catalog = builtin_catalog::standard_catalog()?;
    let source = super::build_config_source(&args.deployment, &config, &catalog)?;

    let registry = InMemoryPatchRegistry::new();
    if let Some(dir) = args.patches_dir.as_ref().or(config.defaults.patches_dir.as_ref()) {
        let count = registry.register_dir(dir)?;
        debug!(dir = %dir.display(), fragments = count, "patches registered");
    }

    let graph = ComposeService::new(source, Box::new(registry)).compose(&catalog)?;
    let document = ComposeProjector::new().project(&graph);
    info!(services = graph.len(), "compose document rendered");

    match args.output {
        Some(path) => {
            std::fs::write(&path, &document).map_err(|e| CliError::OutputWrite {
                path: path.clone(),
                source: e,
            })?;
            output.success(&format!(
                "Wrote {} services to {}",
                graph.len(),
                path.display()
            ))?;
        }
        None => {
            // The document goes to stdout raw so it stays pipeable; the
            // OutputManager is only used for status messages.
            print!("{document}");
        }
    }

    Ok(())
}
