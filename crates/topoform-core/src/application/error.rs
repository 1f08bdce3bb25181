//! Application-layer errors.
//!
//! Failures that originate in the orchestration layer or its collaborators
//! rather than in domain logic: adapter I/O going wrong, poisoned shared
//! state. Domain errors pass through untouched; see `crate::error` for the
//! crate root type.

use thiserror::Error;

use crate::domain::ErrorCategory;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// The configuration source adapter failed outright (I/O, parse).
    #[error("configuration source error: {reason}")]
    SourceFailure { reason: String },

    /// The patch registry adapter failed.
    #[error("patch registry error: {reason}")]
    RegistryFailure { reason: String },

    /// A shared-state lock was poisoned by a panicking holder.
    #[error("internal state lock poisoned: {context}")]
    LockPoisoned { context: String },
}

impl ApplicationError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::SourceFailure { .. } => vec![
                "The deployment configuration could not be read".into(),
                "Check the file path, its permissions, and that it is valid YAML".into(),
            ],
            Self::RegistryFailure { .. } => vec![
                "A patch file could not be read".into(),
                "Check the patches directory and its file permissions".into(),
            ],
            Self::LockPoisoned { .. } => {
                vec!["This is an internal fault; please report it".into()]
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceFailure { .. } | Self::RegistryFailure { .. } => {
                ErrorCategory::Configuration
            }
            Self::LockPoisoned { .. } => ErrorCategory::Internal,
        }
    }
}
