//! Service catalog entries.
//!
//! A [`ServiceDefinition`] is a static, parameterized description of one
//! schedulable unit: which image it runs, how it is started, which volumes
//! and environment it needs, and the [`Activation`] predicate deciding
//! whether it appears in generated output at all. Definitions never change
//! after catalog construction; everything configuration-dependent is
//! expressed through `{{parameter}}` placeholders resolved at composition
//! time.

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::common::{RestartPolicy, ServiceKind, VolumeBinding},
    error::DomainError,
};

/// Boolean expression over feature flags deciding whether a service is
/// included in the generated graph.
///
/// Kept deliberately small: the catalog only ever needs "always on", "one
/// flag", and "all of these flags" (workers and job runners ride on their
/// owning app's flag ANDed with a family switch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// Service is unconditionally part of the graph.
    Always,
    /// Service is active iff the named flag is true.
    Flag(String),
    /// Service is active iff every named flag is true.
    AllOf(Vec<String>),
}

impl Activation {
    /// Convenience constructor for the single-flag case.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::Flag(name.into())
    }

    /// Convenience constructor for the conjunction case.
    pub fn all_of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllOf(names.into_iter().map(Into::into).collect())
    }

    /// Every flag name this predicate references, for integrity checking.
    pub fn flag_names(&self) -> impl Iterator<Item = &str> {
        let names: Vec<&str> = match self {
            Self::Always => Vec::new(),
            Self::Flag(name) => vec![name.as_str()],
            Self::AllOf(names) => names.iter().map(String::as_str).collect(),
        };
        names.into_iter()
    }

    /// Evaluate the predicate against a flag lookup.
    ///
    /// The lookup fails for undeclared flag names; that failure propagates
    /// unchanged so the caller can surface it as a catalog-integrity defect.
    pub fn evaluate<F>(&self, mut flag: F) -> Result<bool, DomainError>
    where
        F: FnMut(&str) -> Result<bool, DomainError>,
    {
        match self {
            Self::Always => Ok(true),
            Self::Flag(name) => flag(name),
            Self::AllOf(names) => {
                for name in names {
                    if !flag(name)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

/// Companion one-shot service preparing a stateful service's persistent
/// volume before the owner starts.
///
/// Bound 1:1 to its owning [`ServiceDefinition`]: emitted whenever the owner
/// is active, absent whenever it is not. The generated service is named
/// `<owner>-permissions`, shares the owner's volume bindings, and runs a
/// recursive chown with restart policy "on first failure only".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionFixup {
    /// Image reference template, normally `{{permissions-image}}`.
    pub image: String,
    /// `uid:gid` the data directory must be owned by.
    pub unix_owner: String,
}

impl PermissionFixup {
    pub fn new(unix_owner: impl Into<String>) -> Self {
        Self {
            image: "{{permissions-image}}".to_string(),
            unix_owner: unix_owner.into(),
        }
    }

    /// The fixup service name derived from its owner's name.
    pub fn service_name(owner: &str) -> String {
        format!("{owner}-permissions")
    }

    /// The chown command run against the owner's mount points.
    pub fn command(&self, volumes: &[VolumeBinding]) -> String {
        let paths: Vec<&str> = volumes.iter().map(|v| v.container.as_str()).collect();
        format!("chown -R {} {}", self.unix_owner, paths.join(" "))
    }
}

/// Static catalog entry for one service.
///
/// ## Invariants (enforced by the builder and `Catalog::self_check`)
///
/// 1. `name` is non-empty and unique within the catalog
/// 2. `image` is non-empty
/// 3. A `fixup` is only meaningful with at least one volume binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Unique service name (e.g. "database", "app-primary").
    pub name: String,
    /// Long-running process or one-off job.
    pub kind: ServiceKind,
    /// Container image reference; may contain `{{parameter}}` placeholders.
    pub image: String,
    /// Optional start command; may contain placeholders.
    pub command: Option<String>,
    /// Ordered environment entries (name, value-or-template). Ordered so the
    /// rendered output is reproducible.
    pub environment: Vec<(String, String)>,
    /// Ordered volume bindings.
    pub volumes: Vec<VolumeBinding>,
    /// Restart policy for the generated service.
    pub restart: RestartPolicy,
    /// When this service appears in output.
    pub activation: Activation,
    /// Permission-fixup companion for stateful services; `None` for
    /// stateless ones.
    pub fixup: Option<PermissionFixup>,
}

impl ServiceDefinition {
    /// Start the builder pattern for fluent construction.
    pub fn builder(name: impl Into<String>) -> ServiceDefinitionBuilder {
        ServiceDefinitionBuilder::new(name)
    }

    /// Whether this service owns a persistent volume needing a fixup.
    pub fn is_stateful(&self) -> bool {
        self.fixup.is_some()
    }

    /// Validate the entry's local invariants.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.is_empty() {
            return Err(DomainError::InvalidDefinition(
                "service name cannot be empty".into(),
            ));
        }
        if self.image.is_empty() {
            return Err(DomainError::InvalidDefinition(format!(
                "service '{}' has no image reference",
                self.name
            )));
        }
        if self.fixup.is_some() && self.volumes.is_empty() {
            return Err(DomainError::InvalidDefinition(format!(
                "service '{}' declares a permission fixup but no volumes",
                self.name
            )));
        }
        Ok(())
    }
}

/// Builder for [`ServiceDefinition`] with validation at `build()`.
pub struct ServiceDefinitionBuilder {
    name: String,
    kind: ServiceKind,
    image: Option<String>,
    command: Option<String>,
    environment: Vec<(String, String)>,
    volumes: Vec<VolumeBinding>,
    restart: RestartPolicy,
    activation: Activation,
    fixup: Option<PermissionFixup>,
}

impl ServiceDefinitionBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ServiceKind::LongRunning,
            image: None,
            command: None,
            environment: Vec::new(),
            volumes: Vec::new(),
            restart: RestartPolicy::Always,
            activation: Activation::Always,
            fixup: None,
        }
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.push((name.into(), value.into()));
        self
    }

    pub fn volume(mut self, binding: VolumeBinding) -> Self {
        self.volumes.push(binding);
        self
    }

    pub fn restart(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }

    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn fixup(mut self, fixup: PermissionFixup) -> Self {
        self.fixup = Some(fixup);
        self
    }

    /// Mark this entry as a one-off job: one-shot kind, never restarted.
    pub fn one_shot(mut self) -> Self {
        self.kind = ServiceKind::OneShot;
        self.restart = RestartPolicy::Never;
        self
    }

    /// Consume the builder and construct a validated `ServiceDefinition`.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` if no image was set
    /// - `InvalidDefinition` if local invariants fail
    pub fn build(self) -> Result<ServiceDefinition, DomainError> {
        let definition = ServiceDefinition {
            name: self.name,
            kind: self.kind,
            image: self
                .image
                .ok_or(DomainError::MissingRequiredField { field: "image" })?,
            command: self.command,
            environment: self.environment,
            volumes: self.volumes,
            restart: self.restart,
            activation: self.activation,
            fixup: self.fixup,
        };
        definition.validate()?;
        Ok(definition)
    }
}
