//! Configuration source adapters.

pub mod file;
pub mod memory;

pub use file::YamlFileConfig;
pub use memory::{InMemoryConfig, LayeredConfig};
