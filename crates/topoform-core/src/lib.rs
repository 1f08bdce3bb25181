//! Topoform Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Topoform
//! deployment-topology generator, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          topoform-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (ComposeService, FlagResolver,         │
//! │   DependencyDeriver)                    │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │   (Driven: ConfigSource, PatchRegistry) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    topoform-adapters (Infrastructure)   │
//! │  (InMemoryConfig, YamlFileConfig,       │
//! │   InMemoryPatchRegistry, projector)     │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  (Catalog, ServiceDefinition,           │
//! │   ServiceGraph)                         │
//! │        No External Dependencies         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use topoform_core::application::ComposeService;
//!
//! // catalog, config source and patch registry are injected by the caller
//! # fn demo(catalog: &topoform_core::domain::Catalog,
//! #         source: Box<dyn topoform_core::application::ports::ConfigSource>,
//! #         registry: Box<dyn topoform_core::application::ports::PatchRegistry>)
//! #         -> topoform_core::error::TopoResult<()> {
//! let service = ComposeService::new(source, registry);
//! let graph = service.compose(catalog)?;
//! for svc in graph.services() {
//!     println!("{} -> {:?}", svc.name, svc.depends_on);
//! }
//! # Ok(())
//! # }
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ComposeService, FlagResolver,
        ports::{ConfigSource, PatchRegistry},
    };
    pub use crate::domain::{
        Activation, Catalog, CatalogBuilder, ConfigValue, DependencyEdge, PatchAttachment,
        PatchFragment, PatchPoint, PermissionFixup, ResolvedService, RestartPolicy, ServiceDefinition,
        ServiceGraph, ServiceKind, VolumeBinding,
    };
    pub use crate::error::{TopoResult, TopoformError};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
