//! Application ports (traits) for external collaborators.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `topoform-adapters` implement
//! these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `ConfigSource`: flag/parameter lookup
//!   - `PatchRegistry`: externally registered patch fragments
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{ConfigSource, PatchRegistry};

#[cfg(test)]
pub use output::{MockConfigSource, MockPatchRegistry};
