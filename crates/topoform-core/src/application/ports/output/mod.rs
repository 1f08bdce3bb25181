//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external
//! collaborators. The `topoform-adapters` crate provides implementations.

use crate::domain::{ConfigValue, PatchFragment};
use crate::error::TopoResult;

#[cfg(test)]
use mockall::automock;

/// Port for the external configuration source.
///
/// Implemented by:
/// - `topoform_adapters::config_source::InMemoryConfig` (testing, CLI --set)
/// - `topoform_adapters::config_source::YamlFileConfig` (deployment files)
///
/// ## Design Notes
///
/// - `get` returns `Ok(None)` for names the source does not carry; the Flag
///   Resolver decides between defaults and configuration errors.
/// - A source that performs blocking I/O reports failures through the error
///   channel; the resolver propagates them verbatim as configuration errors.
#[cfg_attr(test, automock)]
pub trait ConfigSource: Send + Sync {
    /// Look up a configured value by name, `None` if absent.
    fn get(&self, name: &str) -> TopoResult<Option<ConfigValue>>;
}

/// Port for the patch registry.
///
/// Implemented by:
/// - `topoform_adapters::patch_registry::InMemoryPatchRegistry`
///
/// Registration is append-only within one generation run: fragments for a
/// patch point are returned in the order they were registered, and the
/// composer never reorders or merges them.
#[cfg_attr(test, automock)]
pub trait PatchRegistry: Send + Sync {
    /// All fragments registered at a patch point, in registration order.
    /// Unknown points yield an empty list, not an error; it is the
    /// composer's job to reject fragments for points the catalog never
    /// declared.
    fn fragments_for(&self, point: &str) -> TopoResult<Vec<PatchFragment>>;

    /// Every patch-point name with at least one registered fragment.
    fn registered_points(&self) -> TopoResult<Vec<String>>;
}
