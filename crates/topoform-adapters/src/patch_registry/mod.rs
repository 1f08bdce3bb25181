//! Patch registry adapters.

pub mod memory;

pub use memory::InMemoryPatchRegistry;
