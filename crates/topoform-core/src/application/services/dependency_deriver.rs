//! Startup-ordering derivation.
//!
//! Dependencies are not computed from data flow or port usage; the catalog
//! carries a hand-authored adjacency list and the deriver merely filters it
//! down to the services that are active in this run. Declaration order in
//! the adjacency list is preserved in the emitted edges.

use std::collections::BTreeSet;

use crate::domain::{Catalog, DependencyEdge};

/// Filters the catalog's adjacency list against the active service set.
pub struct DependencyDeriver<'a> {
    catalog: &'a Catalog,
    active: &'a BTreeSet<String>,
}

impl<'a> DependencyDeriver<'a> {
    pub fn new(catalog: &'a Catalog, active: &'a BTreeSet<String>) -> Self {
        Self { catalog, active }
    }

    /// Edges for one active service: its declared predecessors, minus any
    /// that are inactive in this run. Inactive predecessors are dropped
    /// silently; their absence is a configuration choice, not a fault.
    pub fn dependencies_for(&self, service: &str) -> Vec<DependencyEdge> {
        self.catalog
            .predecessors_of(service)
            .iter()
            .filter(|pred| self.active.contains(pred.as_str()))
            .map(|pred| DependencyEdge {
                predecessor: pred.clone(),
                successor: service.to_string(),
            })
            .collect()
    }
}
