//! The immutable service catalog.
//!
//! The catalog is the single static input to composition: the full list of
//! [`ServiceDefinition`]s in declaration order, the hand-authored adjacency
//! lists of *possible* dependency predecessors, the declared flag and
//! parameter names (with defaults), and the named patch points at which
//! external fragments may be spliced in.
//!
//! ## Invariants (enforced by `self_check`)
//!
//! 1. Service names are unique
//! 2. Every adjacency entry references declared services on both sides
//! 3. Every activation predicate references declared flags
//! 4. Flag, parameter and patch-point names are unique
//! 5. Dependency-patch points attach to a declared service
//! 6. The possible-dependency graph is acyclic
//! 7. Every template placeholder names a declared parameter
//!
//! A catalog that fails `self_check` is a programming-time defect
//! (`CatalogIntegrityError` in the error taxonomy), not a runtime condition.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::{entities::service::ServiceDefinition, error::DomainError, template};

/// A declared boolean feature flag with its documented default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDecl {
    pub name: String,
    pub default: bool,
}

/// A declared string/numeric parameter.
///
/// A parameter without a default is *required*: composition fails with a
/// configuration error the first time an active service needs it and the
/// configuration source does not supply it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub default: Option<String>,
}

/// Where a patch point's fragments land in the generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchAttachment {
    /// Fragments are additional service sub-graphs appended to the service map.
    Services,
    /// Fragments are additional dependency entries for the named service.
    Dependencies(String),
}

/// A named insertion slot for externally contributed, opaque fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchPoint {
    pub name: String,
    pub attachment: PatchAttachment,
}

/// Immutable catalog of services, adjacency, declarations and patch points.
///
/// Constructed once through [`CatalogBuilder`] and shared by reference across
/// any number of concurrent `compose` calls; nothing in it is ever mutated
/// after `build()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    services: Vec<ServiceDefinition>,
    /// service name -> ordered possible predecessors (declaration order is
    /// the emitted edge order).
    adjacency: HashMap<String, Vec<String>>,
    flags: Vec<FlagDecl>,
    params: Vec<ParamDecl>,
    patch_points: Vec<PatchPoint>,
}

impl Catalog {
    /// Start the builder pattern for fluent construction.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// All services, in declaration order.
    pub fn services(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.services.iter()
    }

    /// Look up one service by name.
    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.name == name)
    }

    /// The ordered possible-predecessor list for a service. Services with no
    /// adjacency entry have no possible predecessors.
    pub fn predecessors_of(&self, name: &str) -> &[String] {
        self.adjacency.get(name).map_or(&[], Vec::as_slice)
    }

    /// Declared flags, in declaration order.
    pub fn flags(&self) -> impl Iterator<Item = &FlagDecl> {
        self.flags.iter()
    }

    /// Declared parameters, in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &ParamDecl> {
        self.params.iter()
    }

    pub fn flag_decl(&self, name: &str) -> Option<&FlagDecl> {
        self.flags.iter().find(|f| f.name == name)
    }

    pub fn param_decl(&self, name: &str) -> Option<&ParamDecl> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Declared patch points, in declaration order.
    pub fn patch_points(&self) -> impl Iterator<Item = &PatchPoint> {
        self.patch_points.iter()
    }

    pub fn patch_point(&self, name: &str) -> Option<&PatchPoint> {
        self.patch_points.iter().find(|p| p.name == name)
    }

    /// Validate all catalog invariants.
    ///
    /// Runs at build time; `compose` re-runs it defensively since catalogs
    /// can also be deserialized.
    pub fn self_check(&self) -> Result<(), DomainError> {
        if self.services.is_empty() {
            return Err(DomainError::CatalogIntegrity(
                "catalog declares no services".into(),
            ));
        }

        // Invariant 1: unique service names (plus per-entry invariants)
        let mut names = HashSet::new();
        for service in &self.services {
            service.validate()?;
            if !names.insert(service.name.as_str()) {
                return Err(DomainError::DuplicateService {
                    name: service.name.clone(),
                });
            }
        }

        // Invariant 2: adjacency references resolve
        for (successor, predecessors) in &self.adjacency {
            if !names.contains(successor.as_str()) {
                return Err(DomainError::UnknownService {
                    name: successor.clone(),
                    context: "adjacency list".into(),
                });
            }
            for predecessor in predecessors {
                if !names.contains(predecessor.as_str()) {
                    return Err(DomainError::UnknownService {
                        name: predecessor.clone(),
                        context: format!("possible predecessors of '{successor}'"),
                    });
                }
            }
        }

        // Invariant 3: activation predicates reference declared flags
        let flag_names: HashSet<&str> = self.flags.iter().map(|f| f.name.as_str()).collect();
        for service in &self.services {
            for flag in service.activation.flag_names() {
                if !flag_names.contains(flag) {
                    return Err(DomainError::UnknownFlag {
                        flag: flag.to_string(),
                        service: service.name.clone(),
                    });
                }
            }
        }

        // Invariant 4: unique flag/param/patch-point names
        unique_names(self.flags.iter().map(|f| f.name.as_str()), "flag")?;
        unique_names(self.params.iter().map(|p| p.name.as_str()), "parameter")?;
        unique_names(self.patch_points.iter().map(|p| p.name.as_str()), "patch point")?;

        // Invariant 5: dependency patch points attach to declared services
        for point in &self.patch_points {
            if let PatchAttachment::Dependencies(service) = &point.attachment {
                if !names.contains(service.as_str()) {
                    return Err(DomainError::UnknownService {
                        name: service.clone(),
                        context: format!("patch point '{}'", point.name),
                    });
                }
            }
        }

        // Invariant 6: acyclic possible-dependency graph
        self.check_acyclic()?;

        // Invariant 7: every template placeholder names a declared parameter
        let param_names: HashSet<&str> = self.params.iter().map(|p| p.name.as_str()).collect();
        for service in &self.services {
            for text in service_templates(service) {
                for placeholder in template::placeholders(text) {
                    if !param_names.contains(placeholder) {
                        return Err(DomainError::CatalogIntegrity(format!(
                            "service '{}' references undeclared parameter '{placeholder}'",
                            service.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Depth-first cycle detection over the possible-dependency graph.
    fn check_acyclic(&self) -> Result<(), DomainError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            name: &'a str,
            adjacency: &'a HashMap<String, Vec<String>>,
            marks: &mut HashMap<&'a str, Mark>,
            trail: &mut Vec<&'a str>,
        ) -> Result<(), DomainError> {
            match marks.get(name) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    let mut chain: Vec<&str> = trail
                        .iter()
                        .copied()
                        .skip_while(|n| n != &name)
                        .collect();
                    chain.push(name);
                    return Err(DomainError::DependencyCycle {
                        chain: chain.join(" -> "),
                    });
                }
                None => {}
            }
            marks.insert(name, Mark::Visiting);
            trail.push(name);
            if let Some(predecessors) = adjacency.get(name) {
                for predecessor in predecessors {
                    visit(predecessor, adjacency, marks, trail)?;
                }
            }
            trail.pop();
            marks.insert(name, Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        let mut trail = Vec::new();
        for service in &self.services {
            visit(&service.name, &self.adjacency, &mut marks, &mut trail)?;
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`Catalog`].
#[derive(Default)]
pub struct CatalogBuilder {
    services: Vec<ServiceDefinition>,
    adjacency: HashMap<String, Vec<String>>,
    flags: Vec<FlagDecl>,
    params: Vec<ParamDecl>,
    patch_points: Vec<PatchPoint>,
}

impl CatalogBuilder {
    pub fn service(mut self, definition: ServiceDefinition) -> Self {
        self.services.push(definition);
        self
    }

    /// Declare the ordered possible predecessors of a service. Replaces any
    /// earlier declaration for the same service.
    pub fn depends_on<I, S>(mut self, service: impl Into<String>, predecessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adjacency.insert(
            service.into(),
            predecessors.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn flag(mut self, name: impl Into<String>, default: bool) -> Self {
        self.flags.push(FlagDecl {
            name: name.into(),
            default,
        });
        self
    }

    pub fn param(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    /// Declare a parameter with no default; the configuration source must
    /// supply it before any active service can reference it.
    pub fn required_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            default: None,
        });
        self
    }

    pub fn patch_point(mut self, name: impl Into<String>, attachment: PatchAttachment) -> Self {
        self.patch_points.push(PatchPoint {
            name: name.into(),
            attachment,
        });
        self
    }

    /// Consume the builder and construct a `Catalog`, running the full
    /// integrity self-check.
    pub fn build(self) -> Result<Catalog, DomainError> {
        let catalog = Catalog {
            services: self.services,
            adjacency: self.adjacency,
            flags: self.flags,
            params: self.params,
            patch_points: self.patch_points,
        };
        catalog.self_check()?;
        Ok(catalog)
    }
}

/// All template-bearing strings of a service definition, fixup image included.
fn service_templates(service: &ServiceDefinition) -> impl Iterator<Item = &str> {
    std::iter::once(service.image.as_str())
        .chain(service.command.as_deref())
        .chain(service.environment.iter().map(|(_, value)| value.as_str()))
        .chain(service.volumes.iter().map(|volume| volume.host.as_str()))
        .chain(service.fixup.as_ref().map(|fixup| fixup.image.as_str()))
}

fn unique_names<'a>(
    names: impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(DomainError::CatalogIntegrity(format!(
                "duplicate {what} declaration: '{name}'"
            )));
        }
    }
    Ok(())
}
