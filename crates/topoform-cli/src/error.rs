//! Comprehensive error handling for the Topoform CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Proper error chaining
//! - Exit code mapping

use std::path::PathBuf;
use std::{error::Error as _, fmt::Write as _};

use owo_colors::OwoColorize;
use thiserror::Error;

use topoform_core::error::TopoformError;

// Re-export so callers only need `use crate::error::*`.
pub use topoform_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Comprehensive CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input (validation failed).
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A `--set` argument is not of the form `name=value`.
    #[error("Invalid override '{argument}': expected name=value")]
    InvalidOverride { argument: String },

    // ── Core errors ────────────────────────────────────────────────────────
    /// An error propagated from `topoform-core` or the adapters.
    ///
    /// Wrapped here so that the CLI can attach suggestions drawn from the
    /// core error's category without touching core internals.
    #[error("Composition failed: {0}")]
    Core(#[from] TopoformError),

    // ── System errors ──────────────────────────────────────────────────────
    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the rendered document failed.
    #[error("Cannot write output to {path}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message } => vec![
                format!("Check your input: {}", message),
                "Use --help for usage information".into(),
            ],

            Self::InvalidOverride { argument } => vec![
                format!("'{}' is missing an '=' separator", argument),
                "Write overrides as name=value, e.g. --set enable-cache=false".into(),
                "Values parse as booleans, then integers, then strings".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
                "Ensure the parent directory exists".into(),
            ],

            Self::OutputWrite { path, .. } => vec![
                format!("The output file '{}' could not be written", path.display()),
                "Check the directory exists and is writable".into(),
                "Omit --output to print to stdout instead".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::InvalidOverride { .. } => ErrorCategory::UserError,
            Self::Core(core) => match core.category() {
                CoreCategory::Configuration => ErrorCategory::Configuration,
                // Catalog integrity defects and graph invariant violations are
                // programming errors, not something the user can fix.
                CoreCategory::Integrity | CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } | Self::OutputWrite { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        let _ = write!(output, "\n{} {}\n\n", "✗".red().bold(), "Error:".red().bold());
        let _ = writeln!(output, "  {}", self.to_string().red());

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                let _ = write!(output, "\n  {} {}\n", "→".dimmed(), err.to_string().dimmed());
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            let _ = write!(output, "\n{}\n", "Suggestions:".yellow().bold());
            for suggestion in suggestions {
                let _ = writeln!(output, "  {suggestion}");
            }
        }

        if !verbose {
            output.push('\n');
            let _ = writeln!(
                output,
                "{} {}",
                "\u{2139}".blue(), // ℹ
                "Use -v / --verbose for more details.".dimmed(),
            );
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`] — no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\nError: {self}");

        if verbose {
            let mut src = std::error::Error::source(self);
            while let Some(err) = src {
                let _ = writeln!(out, "  Caused by: {err}");
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                let _ = writeln!(out, "  {s}");
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (validation, invalid arguments).
    UserError,
    /// Resource not found.
    NotFound,
    /// Configuration error.
    Configuration,
    /// Internal/system error.
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use topoform_core::domain::DomainError;

    // ── suggestions ───────────────────────────────────────────────────────

    #[test]
    fn invalid_override_suggests_the_syntax() {
        let err = CliError::InvalidOverride {
            argument: "enable-cache".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("name=value")));
    }

    #[test]
    fn core_suggestions_pass_through() {
        let err = CliError::Core(
            DomainError::MissingRequiredValue {
                name: "database-root-password".into(),
            }
            .into(),
        );
        assert!(
            err.suggestions()
                .iter()
                .any(|s| s.contains("database-root-password"))
        );
    }

    // ── exit codes ────────────────────────────────────────────────────────

    #[test]
    fn exit_code_user_error() {
        let err = CliError::InvalidOverride {
            argument: "x".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_code_configuration() {
        let err = CliError::Core(
            DomainError::MissingRequiredValue {
                name: "database-root-password".into(),
            }
            .into(),
        );
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn exit_code_integrity_is_internal() {
        let err = CliError::Core(
            DomainError::CatalogIntegrity("duplicate flag".into()).into(),
        );
        assert_eq!(err.exit_code(), 1);
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn format_plain_contains_error_header() {
        let err = CliError::InvalidOverride {
            argument: "x".into(),
        };
        let s = err.format_plain(false);
        assert!(s.contains("Error:"));
        assert!(s.contains("Suggestions:"));
    }

    #[test]
    fn format_plain_verbose_omits_hint() {
        let err = CliError::InvalidInput {
            message: "x".into(),
        };
        let s = err.format_plain(true);
        assert!(!s.contains("--verbose"));
    }
}
