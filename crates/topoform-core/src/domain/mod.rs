// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Topoform.
//!
//! This module contains pure business logic with ZERO external dependencies.
//! All I/O (configuration sources, patch registries, output projection) is
//! handled via ports (traits) defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **No external crates**: Only std library + thiserror + serde derives
//! - **Immutable entities**: All domain objects are Clone + PartialEq
//! - **Rich domain model**: Behavior lives in entities, not services
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod template;

// Re-exports for convenience
pub use entities::{
    catalog::{Catalog, CatalogBuilder, FlagDecl, ParamDecl, PatchAttachment, PatchPoint},
    common::{ConfigValue, RestartPolicy, ServiceKind, VolumeBinding, VolumeMode},
    graph::{DependencyEdge, PatchFragment, ResolvedService, ResolvedVolume, ServiceGraph},
    service::{Activation, PermissionFixup, ServiceDefinition, ServiceDefinitionBuilder},
};

pub use error::{DomainError, ErrorCategory};
