//! Crate-level error type and result alias.

use thiserror::Error;

use crate::{application::ApplicationError, domain::DomainError};

pub use crate::domain::ErrorCategory;

/// Result alias used across the crate boundary.
pub type TopoResult<T> = Result<T, TopoformError>;

/// Root error type: domain failures plus application/adapter failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopoformError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Application(#[from] ApplicationError),
}

impl TopoformError {
    /// User-actionable suggestions for CLI display.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    /// Category for display styling and exit-code mapping.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category(),
            Self::Application(e) => e.category(),
        }
    }
}
