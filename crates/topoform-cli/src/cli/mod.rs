//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "topoform",
    bin_name = "topoform",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{1f9e9} Deployment-topology generation",
    long_about = "Topoform assembles a multi-service deployment topology from \
                  a built-in service catalog, boolean feature flags, and \
                  externally contributed patch fragments.",
    after_help = "EXAMPLES:\n\
        \x20 topoform render --set database-root-password=s3cret\n\
        \x20 topoform render -d deployment.yml -o docker-compose.yml\n\
        \x20 topoform services --set enable-app-secondary=false\n\
        \x20 topoform flags\n\
        \x20 topoform completions bash > /usr/share/bash-completion/completions/topoform",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compose the service graph and render the compose document.
    #[command(
        visible_alias = "r",
        about = "Render the compose document",
        after_help = "EXAMPLES:\n\
            \x20 topoform render --set database-root-password=s3cret\n\
            \x20 topoform render -d deployment.yml --patches-dir patches/\n\
            \x20 topoform render -d deployment.yml -o docker-compose.yml"
    )]
    Render(RenderArgs),

    /// Show which services are active and their dependency edges.
    #[command(
        visible_alias = "svc",
        about = "List active and inactive services",
        after_help = "EXAMPLES:\n\
            \x20 topoform services\n\
            \x20 topoform services -d deployment.yml\n\
            \x20 topoform services --set enable-jobs=true --format json"
    )]
    Services(ServicesArgs),

    /// Show declared flags and parameters with their effective values.
    #[command(
        about = "List declared flags and parameters",
        after_help = "EXAMPLES:\n\
            \x20 topoform flags\n\
            \x20 topoform flags -d deployment.yml --format json"
    )]
    Flags(FlagsArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 topoform completions bash > ~/.local/share/bash-completion/completions/topoform\n\
            \x20 topoform completions zsh  > ~/.zfunc/_topoform\n\
            \x20 topoform completions fish > ~/.config/fish/completions/topoform.fish"
    )]
    Completions(CompletionsArgs),
}

// ── shared deployment-input arguments ─────────────────────────────────────────

/// Deployment configuration inputs shared by `render`, `services`, `flags`.
#[derive(Debug, Args)]
pub struct DeploymentArgs {
    /// Deployment configuration file (flat YAML mapping of names to scalars).
    #[arg(
        short = 'd',
        long = "deployment",
        value_name = "FILE",
        help = "Deployment configuration file"
    )]
    pub deployment: Option<PathBuf>,

    /// Override single values; repeatable.  Values parse as booleans, then
    /// integers, then fall back to strings.
    #[arg(
        short = 's',
        long = "set",
        value_name = "NAME=VALUE",
        help = "Override a configuration value (repeatable)"
    )]
    pub set: Vec<String>,
}

// ── render ────────────────────────────────────────────────────────────────────

/// Arguments for `topoform render`.
#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub deployment: DeploymentArgs,

    /// Directory of patch files; each `<patch-point>.yml` is registered at
    /// the patch point its file stem names.
    #[arg(
        long = "patches-dir",
        value_name = "DIR",
        help = "Directory of patch fragment files"
    )]
    pub patches_dir: Option<PathBuf>,

    /// Write to a file instead of stdout.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Output file (default: stdout)"
    )]
    pub output: Option<PathBuf>,
}

// ── services ──────────────────────────────────────────────────────────────────

/// Arguments for `topoform services`.
#[derive(Debug, Args)]
pub struct ServicesArgs {
    #[command(flatten)]
    pub deployment: DeploymentArgs,

    /// Include inactive services in the listing.
    #[arg(long = "all", help = "Show inactive services too")]
    pub all: bool,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

// ── flags ─────────────────────────────────────────────────────────────────────

/// Arguments for `topoform flags`.
#[derive(Debug, Args)]
pub struct FlagsArgs {
    #[command(flatten)]
    pub deployment: DeploymentArgs,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the listing commands.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `topoform completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── tests ─────────────────────────────────────────────────────────────────────
