//! Topology composition orchestration.
//!
//! `ComposeService` drives one generation run end to end: snapshot the
//! configuration, evaluate activations, substitute parameters, synthesize
//! permission fixups, derive dependency edges and attach patch fragments.
//! The whole pipeline is pure with respect to its inputs: the same catalog,
//! configuration snapshot and registered fragments always produce the same
//! [`ServiceGraph`], and composing never mutates anything it reads.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ports::{ConfigSource, PatchRegistry},
        services::{DependencyDeriver, FlagResolver},
    },
    domain::{
        Catalog, DomainError, PatchAttachment, PatchFragment, PermissionFixup, ResolvedService,
        ResolvedVolume, RestartPolicy, ServiceDefinition, ServiceGraph, ServiceKind, template,
    },
    error::TopoResult,
};

/// Application service owning one catalog-to-graph generation pipeline.
pub struct ComposeService {
    source: Box<dyn ConfigSource>,
    registry: Box<dyn PatchRegistry>,
}

impl ComposeService {
    pub fn new(source: Box<dyn ConfigSource>, registry: Box<dyn PatchRegistry>) -> Self {
        Self { source, registry }
    }

    /// Compose the service graph for one configuration.
    ///
    /// # Errors
    ///
    /// - catalog integrity defects (re-checked defensively, since catalogs
    ///   may have been deserialized rather than built)
    /// - configuration errors from the flag/parameter snapshot
    /// - unresolved placeholders in any active service's templates
    /// - fragments registered at a patch point the catalog never declared
    #[instrument(skip_all)]
    pub fn compose(&self, catalog: &Catalog) -> TopoResult<ServiceGraph> {
        catalog.self_check()?;

        let resolver = FlagResolver::snapshot(catalog, self.source.as_ref())?;

        // Active subset, in catalog declaration order.
        let mut active_names: BTreeSet<String> = BTreeSet::new();
        let mut active: Vec<&ServiceDefinition> = Vec::new();
        for definition in catalog.services() {
            if resolver.evaluate(&definition.activation)? {
                active_names.insert(definition.name.clone());
                active.push(definition);
            }
        }
        debug!(
            active = active.len(),
            total = catalog.services().count(),
            "activation predicates evaluated"
        );

        // Every registered patch point must be one the catalog declares.
        for point in self.registry.registered_points()? {
            if catalog.patch_point(&point).is_none() {
                return Err(DomainError::UnknownPatchPoint { name: point }.into());
            }
        }

        let deriver = DependencyDeriver::new(catalog, &active_names);

        let mut services: Vec<ResolvedService> = Vec::new();
        for definition in &active {
            let fixup_name = definition
                .fixup
                .as_ref()
                .map(|_| PermissionFixup::service_name(&definition.name));

            let resolved =
                self.resolve_service(catalog, definition, &resolver, &deriver, fixup_name)?;

            // A stateful service's fixup companion is emitted immediately
            // before its owner and shares the owner's resolved volumes.
            if let Some(fixup) = &definition.fixup {
                services.push(self.resolve_fixup(definition, fixup, &resolver, &resolved.volumes)?);
            }
            services.push(resolved);
        }

        // Graph-level extra-service fragments, in patch-point declaration
        // order then registration order within each point.
        let mut extra_service_fragments = Vec::new();
        for point in catalog.patch_points() {
            if matches!(point.attachment, PatchAttachment::Services) {
                extra_service_fragments.extend(self.registry.fragments_for(&point.name)?);
            }
        }

        let graph = ServiceGraph::new(services, extra_service_fragments);
        graph.validate()?;
        info!(
            services = graph.len(),
            edges = graph.edges().len(),
            extra_fragments = graph.extra_service_fragments().len(),
            "service graph composed"
        );
        Ok(graph)
    }

    /// Resolve one active definition: substitute every template, derive the
    /// dependency list, and collect its dependency-patch fragments.
    fn resolve_service(
        &self,
        catalog: &Catalog,
        definition: &ServiceDefinition,
        resolver: &FlagResolver,
        deriver: &DependencyDeriver<'_>,
        fixup_name: Option<String>,
    ) -> TopoResult<ResolvedService> {
        let name = definition.name.as_str();
        let lookup = |key: &str| resolver.param_for_template(key);

        let image = template::substitute(&definition.image, name, lookup)?;
        let command = definition
            .command
            .as_deref()
            .map(|c| template::substitute(c, name, lookup))
            .transpose()?;

        let mut environment = Vec::with_capacity(definition.environment.len());
        for (key, value) in &definition.environment {
            environment.push((key.clone(), template::substitute(value, name, lookup)?));
        }

        let mut volumes = Vec::with_capacity(definition.volumes.len());
        for binding in &definition.volumes {
            volumes.push(ResolvedVolume {
                host: template::substitute(&binding.host, name, lookup)?,
                container: binding.container.clone(),
                mode: binding.mode,
            });
        }

        // The fixup companion is always the first predecessor, ahead of the
        // derived edges in adjacency declaration order.
        let mut depends_on = Vec::new();
        depends_on.extend(fixup_name);
        depends_on.extend(
            deriver
                .dependencies_for(name)
                .into_iter()
                .map(|edge| edge.predecessor),
        );

        let extra_dependency_fragments = self.dependency_fragments_for(catalog, name)?;

        Ok(ResolvedService {
            name: definition.name.clone(),
            kind: definition.kind,
            image,
            command,
            environment,
            volumes,
            restart: definition.restart,
            depends_on,
            extra_dependency_fragments,
        })
    }

    /// Synthesize the permission-fixup companion for a stateful service.
    fn resolve_fixup(
        &self,
        owner: &ServiceDefinition,
        fixup: &PermissionFixup,
        resolver: &FlagResolver,
        owner_volumes: &[ResolvedVolume],
    ) -> TopoResult<ResolvedService> {
        let name = PermissionFixup::service_name(&owner.name);
        let image = template::substitute(&fixup.image, &name, |key| {
            resolver.param_for_template(key)
        })?;
        Ok(ResolvedService {
            name,
            kind: ServiceKind::OneShot,
            image,
            command: Some(fixup.command(&owner.volumes)),
            environment: Vec::new(),
            volumes: owner_volumes.to_vec(),
            restart: RestartPolicy::OnFailure,
            depends_on: Vec::new(),
            extra_dependency_fragments: Vec::new(),
        })
    }

    /// Fragments registered at the dependency patch points attached to this
    /// service. Fragments for an inactive service's points are never asked
    /// for, so they drop out of the run silently.
    fn dependency_fragments_for(
        &self,
        catalog: &Catalog,
        service: &str,
    ) -> TopoResult<Vec<PatchFragment>> {
        let mut fragments = Vec::new();
        for point in catalog.patch_points() {
            if matches!(&point.attachment, PatchAttachment::Dependencies(target) if target == service)
            {
                fragments.extend(self.registry.fragments_for(&point.name)?);
            }
        }
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::{Activation, ConfigValue, VolumeBinding};
    use crate::error::TopoformError;

    struct MapSource(HashMap<String, ConfigValue>);

    impl ConfigSource for MapSource {
        fn get(&self, name: &str) -> TopoResult<Option<ConfigValue>> {
            Ok(self.0.get(name).cloned())
        }
    }

    struct ListRegistry(Vec<(String, PatchFragment)>);

    impl PatchRegistry for ListRegistry {
        fn fragments_for(&self, point: &str) -> TopoResult<Vec<PatchFragment>> {
            Ok(self
                .0
                .iter()
                .filter(|(p, _)| p == point)
                .map(|(_, f)| f.clone())
                .collect())
        }

        fn registered_points(&self) -> TopoResult<Vec<String>> {
            let mut points: Vec<String> = Vec::new();
            for (p, _) in &self.0 {
                if !points.contains(p) {
                    points.push(p.clone());
                }
            }
            Ok(points)
        }
    }

    fn catalog() -> Catalog {
        Catalog::builder()
            .service(
                ServiceDefinition::builder("database")
                    .image("docker.io/library/mysql:{{database-version}}")
                    .env("MYSQL_ROOT_PASSWORD", "{{database-root-password}}")
                    .volume(VolumeBinding::read_write(
                        "{{data-root}}/database",
                        "/var/lib/mysql",
                    ))
                    .activation(Activation::flag("enable-database"))
                    .fixup(PermissionFixup::new("999:999"))
                    .build()
                    .unwrap(),
            )
            .service(
                ServiceDefinition::builder("app")
                    .image("example/app:1.0")
                    .activation(Activation::Always)
                    .build()
                    .unwrap(),
            )
            .depends_on("app", ["database"])
            .flag("enable-database", true)
            .param("database-version", "8.4")
            .param("data-root", "./data")
            .param("permissions-image", "docker.io/library/busybox:1.36")
            .required_param("database-root-password")
            .patch_point("extra-services", PatchAttachment::Services)
            .patch_point(
                "app-extra-dependencies",
                PatchAttachment::Dependencies("app".into()),
            )
            .build()
            .unwrap()
    }

    fn source(pairs: &[(&str, ConfigValue)]) -> Box<dyn ConfigSource> {
        Box::new(MapSource(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        ))
    }

    fn empty_registry() -> Box<dyn PatchRegistry> {
        Box::new(ListRegistry(Vec::new()))
    }

    #[test]
    fn fixup_precedes_owner_and_is_its_first_predecessor() {
        let service = ComposeService::new(
            source(&[("database-root-password", ConfigValue::Str("s3cret".into()))]),
            empty_registry(),
        );
        let graph = service.compose(&catalog()).unwrap();

        let order: Vec<&str> = graph.services().map(|s| s.name.as_str()).collect();
        assert_eq!(order, ["database-permissions", "database", "app"]);

        let fixup = graph.get("database-permissions").unwrap();
        assert_eq!(fixup.kind, ServiceKind::OneShot);
        assert_eq!(fixup.restart, RestartPolicy::OnFailure);
        assert_eq!(fixup.image, "docker.io/library/busybox:1.36");
        assert_eq!(
            fixup.command.as_deref(),
            Some("chown -R 999:999 /var/lib/mysql")
        );
        assert_eq!(fixup.volumes[0].host, "./data/database");

        let database = graph.get("database").unwrap();
        assert_eq!(database.depends_on, ["database-permissions"]);
        assert_eq!(database.image, "docker.io/library/mysql:8.4");
        assert_eq!(
            database.environment[0],
            ("MYSQL_ROOT_PASSWORD".to_string(), "s3cret".to_string())
        );
    }

    #[test]
    fn disabling_a_flag_removes_service_fixup_and_edge() {
        let service = ComposeService::new(
            source(&[("enable-database", ConfigValue::Bool(false))]),
            empty_registry(),
        );
        let graph = service.compose(&catalog()).unwrap();
        assert!(!graph.contains("database"));
        assert!(!graph.contains("database-permissions"));
        assert!(graph.get("app").unwrap().depends_on.is_empty());
    }

    #[test]
    fn missing_required_parameter_fails_only_when_needed() {
        // database inactive: nothing references database-root-password
        let service = ComposeService::new(
            source(&[("enable-database", ConfigValue::Bool(false))]),
            empty_registry(),
        );
        assert!(service.compose(&catalog()).is_ok());

        // database active: the missing password is a configuration error
        let service = ComposeService::new(source(&[]), empty_registry());
        let err = service.compose(&catalog()).unwrap_err();
        assert!(matches!(
            err,
            TopoformError::Domain(DomainError::MissingRequiredValue { .. })
        ));
        assert!(err.to_string().contains("database-root-password"));
    }

    #[test]
    fn fragments_attach_in_registration_order() {
        let registry = ListRegistry(vec![
            (
                "extra-services".into(),
                PatchFragment::new("alpha", "metrics:\n  image: metrics:1"),
            ),
            (
                "app-extra-dependencies".into(),
                PatchFragment::new("alpha", "- metrics"),
            ),
            (
                "extra-services".into(),
                PatchFragment::new("beta", "tracer:\n  image: tracer:2"),
            ),
        ]);
        let service = ComposeService::new(
            source(&[("database-root-password", ConfigValue::Str("x".into()))]),
            Box::new(registry),
        );
        let graph = service.compose(&catalog()).unwrap();

        let origins: Vec<&str> = graph
            .extra_service_fragments()
            .iter()
            .map(|f| f.origin.as_str())
            .collect();
        assert_eq!(origins, ["alpha", "beta"]);
        assert_eq!(
            graph.get("app").unwrap().extra_dependency_fragments[0].body,
            "- metrics"
        );
    }

    #[test]
    fn fragments_for_undeclared_points_are_rejected() {
        let registry = ListRegistry(vec![(
            "no-such-point".into(),
            PatchFragment::new("alpha", "x: 1"),
        )]);
        let service = ComposeService::new(
            source(&[("database-root-password", ConfigValue::Str("x".into()))]),
            Box::new(registry),
        );
        let err = service.compose(&catalog()).unwrap_err();
        assert!(matches!(
            err,
            TopoformError::Domain(DomainError::UnknownPatchPoint { .. })
        ));
    }

    #[test]
    fn compose_is_deterministic_and_repeatable() {
        let service = ComposeService::new(
            source(&[("database-root-password", ConfigValue::Str("x".into()))]),
            empty_registry(),
        );
        let catalog = catalog();
        let first = service.compose(&catalog).unwrap();
        let second = service.compose(&catalog).unwrap();
        assert_eq!(first, second);
    }
}
