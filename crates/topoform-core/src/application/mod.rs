// ============================================================================
//  APPLICATION LAYER - ORCHESTRATION
// ============================================================================

//! Application layer for Topoform.
//!
//! Orchestrates domain logic behind the driven ports: the [`FlagResolver`]
//! snapshots configuration, the [`DependencyDeriver`] filters the catalog's
//! adjacency, and [`ComposeService`] runs the full generation pipeline.
//! Nothing in this layer performs I/O itself; adapters are injected through
//! the traits in [`ports`].

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use services::{ComposeService, DependencyDeriver, FlagResolver};
