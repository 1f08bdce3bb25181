//! Infrastructure adapters for Topoform.
//!
//! This crate implements the ports defined in
//! `topoform-core::application::ports` and carries everything that touches
//! the outside world: configuration files, patch directories, and the
//! projection of a composed [`topoform_core::domain::ServiceGraph`] into a
//! compose-style YAML document.

pub mod builtin_catalog;
pub mod config_source;
pub mod patch_registry;
pub mod projector;

// Re-export commonly used adapters
pub use config_source::{InMemoryConfig, LayeredConfig, YamlFileConfig};
pub use patch_registry::InMemoryPatchRegistry;
pub use projector::ComposeProjector;
