//! The generated service graph.
//!
//! [`ServiceGraph`] is the output of composition: only active services, with
//! every placeholder substituted and every dependency edge pointing at
//! another service present in the graph. It is freshly constructed on every
//! `compose` call and immutable once returned; it carries no behaviour
//! beyond read access and invariant validation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::common::{RestartPolicy, ServiceKind, VolumeMode},
    error::DomainError,
};

/// "Predecessor must reach a started state before successor starts."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub predecessor: String,
    pub successor: String,
}

/// An opaque, externally contributed patch fragment.
///
/// The origin label identifies the contributor (mirrored into a provenance
/// comment when the graph is projected to text); the body is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchFragment {
    pub origin: String,
    pub body: String,
}

impl PatchFragment {
    pub fn new(origin: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            body: body.into(),
        }
    }
}

/// A fully resolved volume binding (all placeholders substituted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVolume {
    pub host: String,
    pub container: String,
    pub mode: VolumeMode,
}

/// One service in the output graph, with everything resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedService {
    pub name: String,
    pub kind: ServiceKind,
    pub image: String,
    pub command: Option<String>,
    pub environment: Vec<(String, String)>,
    pub volumes: Vec<ResolvedVolume>,
    pub restart: RestartPolicy,
    /// Ordered predecessors: the permission fixup (if any) first, then the
    /// derived edges in adjacency declaration order.
    pub depends_on: Vec<String>,
    /// Opaque fragments registered at this service's dependency patch point,
    /// in registration order.
    pub extra_dependency_fragments: Vec<PatchFragment>,
}

/// The immutable composition result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceGraph {
    services: Vec<ResolvedService>,
    /// Fragments registered at the graph-level "extra services" patch point,
    /// in registration order.
    extra_service_fragments: Vec<PatchFragment>,
}

impl ServiceGraph {
    pub(crate) fn new(
        services: Vec<ResolvedService>,
        extra_service_fragments: Vec<PatchFragment>,
    ) -> Self {
        Self {
            services,
            extra_service_fragments,
        }
    }

    /// Services in emission order (catalog declaration order, each fixup
    /// immediately before its owner).
    pub fn services(&self) -> impl Iterator<Item = &ResolvedService> {
        self.services.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedService> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Every dependency edge in the graph, flattened.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.services
            .iter()
            .flat_map(|s| {
                s.depends_on.iter().map(|p| DependencyEdge {
                    predecessor: p.clone(),
                    successor: s.name.clone(),
                })
            })
            .collect()
    }

    /// Graph-level extra-service fragments, in registration order.
    pub fn extra_service_fragments(&self) -> &[PatchFragment] {
        &self.extra_service_fragments
    }

    /// Validate the graph invariants the composer guarantees: unique names
    /// and no dangling edges.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut names = HashSet::new();
        for service in &self.services {
            if !names.insert(service.name.as_str()) {
                return Err(DomainError::DuplicateService {
                    name: service.name.clone(),
                });
            }
        }
        for service in &self.services {
            for predecessor in &service.depends_on {
                if !names.contains(predecessor.as_str()) {
                    return Err(DomainError::DanglingEdge {
                        predecessor: predecessor.clone(),
                        successor: service.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str, depends_on: &[&str]) -> ResolvedService {
        ResolvedService {
            name: name.to_string(),
            kind: ServiceKind::LongRunning,
            image: "img".into(),
            command: None,
            environment: Vec::new(),
            volumes: Vec::new(),
            restart: RestartPolicy::Always,
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            extra_dependency_fragments: Vec::new(),
        }
    }

    #[test]
    fn validate_accepts_closed_graph() {
        let graph = ServiceGraph::new(
            vec![service("a", &[]), service("b", &["a"])],
            Vec::new(),
        );
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn validate_rejects_dangling_edge() {
        let graph = ServiceGraph::new(vec![service("b", &["a"])], Vec::new());
        assert!(matches!(
            graph.validate(),
            Err(DomainError::DanglingEdge { .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let graph = ServiceGraph::new(
            vec![service("a", &[]), service("a", &[])],
            Vec::new(),
        );
        assert!(matches!(
            graph.validate(),
            Err(DomainError::DuplicateService { .. })
        ));
    }

    #[test]
    fn edges_flatten_in_service_order() {
        let graph = ServiceGraph::new(
            vec![service("a", &[]), service("b", &["a"]), service("c", &["a", "b"])],
            Vec::new(),
        );
        let edges = graph.edges();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0].successor, "b");
        assert_eq!(edges[1].predecessor, "a");
        assert_eq!(edges[2].predecessor, "b");
    }
}
