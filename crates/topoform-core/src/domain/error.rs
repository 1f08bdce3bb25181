// ============================================================================
// domain/error.rs - DOMAIN ERROR TAXONOMY
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// Three families, matching the generator's failure taxonomy:
/// - configuration errors (a name the catalog declared is absent or wrongly
///   typed in the configuration source, or an undeclared name was referenced)
/// - unresolved parameters (a template placeholder left unbound)
/// - catalog integrity defects (programming-time errors in the catalog data)
///
/// All errors are cloneable and categorizable for CLI display.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("configuration name '{name}' is not declared by the catalog")]
    UndeclaredName { name: String },

    #[error("required configuration value '{name}' is missing and has no default")]
    MissingRequiredValue { name: String },

    #[error("configuration value '{name}' has type {found}, expected {expected}")]
    InvalidValueType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A failure inside the external configuration source, propagated
    /// verbatim.
    #[error("configuration source failed: {reason}")]
    SourceFailure { reason: String },

    // ========================================================================
    // Substitution Errors
    // ========================================================================
    #[error("unresolved placeholder '{{{{{placeholder}}}}}' in service '{service}'")]
    UnresolvedParameter { placeholder: String, service: String },

    // ========================================================================
    // Catalog Integrity Errors (programming-time defects)
    // ========================================================================
    #[error("catalog integrity: {0}")]
    CatalogIntegrity(String),

    #[error("duplicate service name: '{name}'")]
    DuplicateService { name: String },

    #[error("unknown service '{name}' referenced by {context}")]
    UnknownService { name: String, context: String },

    #[error("activation predicate of service '{service}' references undeclared flag '{flag}'")]
    UnknownFlag { flag: String, service: String },

    #[error("dependency cycle in catalog: {chain}")]
    DependencyCycle { chain: String },

    #[error("patch fragments registered for undeclared patch point '{name}'")]
    UnknownPatchPoint { name: String },

    #[error("invalid service definition: {0}")]
    InvalidDefinition(String),

    #[error("required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    // ========================================================================
    // Graph Invariant Violations (composer defects, should never surface)
    // ========================================================================
    #[error("dangling dependency edge: '{successor}' depends on absent '{predecessor}'")]
    DanglingEdge {
        predecessor: String,
        successor: String,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UndeclaredName { name } => vec![
                format!("'{}' is not a flag or parameter the catalog knows", name),
                "Run: topoform flags to list every declared name".into(),
            ],
            Self::MissingRequiredValue { name } => vec![
                format!("Set '{}' in your deployment configuration file", name),
                format!("Or pass it on the command line: --set {}=<value>", name),
            ],
            Self::InvalidValueType { name, expected, .. } => vec![
                format!("'{}' must be a {}", name, expected),
                "Check the value in your deployment configuration file".into(),
            ],
            Self::UnresolvedParameter { placeholder, service } => vec![
                format!(
                    "Service '{}' references '{{{{{}}}}}', which the catalog never declared",
                    service, placeholder
                ),
                "This indicates a catalog/configuration mismatch".into(),
            ],
            Self::SourceFailure { .. } => vec![
                "The configuration source could not be read".into(),
                "Check the file path and its permissions".into(),
            ],
            Self::UnknownPatchPoint { name } => vec![
                format!("No patch point named '{}' exists in the catalog", name),
                "Run: topoform flags to inspect the catalog, or fix the patch file name".into(),
            ],
            _ => vec!["This is a catalog defect; please report it".into()],
        }
    }

    /// Error category for CLI display styling and exit-code mapping.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UndeclaredName { .. }
            | Self::MissingRequiredValue { .. }
            | Self::InvalidValueType { .. }
            | Self::SourceFailure { .. } => ErrorCategory::Configuration,
            Self::UnresolvedParameter { .. } => ErrorCategory::Configuration,
            Self::CatalogIntegrity(_)
            | Self::DuplicateService { .. }
            | Self::UnknownService { .. }
            | Self::UnknownFlag { .. }
            | Self::DependencyCycle { .. }
            | Self::UnknownPatchPoint { .. }
            | Self::InvalidDefinition(_)
            | Self::MissingRequiredField { .. } => ErrorCategory::Integrity,
            Self::DanglingEdge { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Integrity,
    Internal,
}
