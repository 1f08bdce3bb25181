//! End-to-end composition through the real adapters: the built-in catalog,
//! the in-memory config source and patch registry, and the compose projector.

use topoform_adapters::{
    ComposeProjector, InMemoryConfig, InMemoryPatchRegistry, builtin_catalog::standard_catalog,
};
use topoform_core::{
    application::ComposeService,
    domain::{Catalog, PatchFragment, RestartPolicy, ServiceGraph, ServiceKind},
};

const ALL_FLAGS: [&str; 9] = [
    "enable-database",
    "enable-search-index",
    "enable-document-store",
    "enable-cache",
    "enable-mail-relay",
    "enable-app-primary",
    "enable-app-secondary",
    "enable-workers",
    "enable-jobs",
];

/// A config with every flag off except the named ones.
fn config_enabling(enabled: &[&str]) -> InMemoryConfig {
    let config = InMemoryConfig::new();
    for flag in ALL_FLAGS {
        config.set(flag, enabled.contains(&flag)).unwrap();
    }
    config.set("database-root-password", "s3cret").unwrap();
    config
}

fn compose(config: InMemoryConfig, registry: InMemoryPatchRegistry) -> ServiceGraph {
    let catalog = standard_catalog().unwrap();
    compose_with(&catalog, config, registry).unwrap()
}

fn compose_with(
    catalog: &Catalog,
    config: InMemoryConfig,
    registry: InMemoryPatchRegistry,
) -> topoform_core::error::TopoResult<ServiceGraph> {
    ComposeService::new(Box::new(config), Box::new(registry)).compose(catalog)
}

#[test]
fn only_primary_app_yields_a_single_service_with_no_edges() {
    let graph = compose(
        config_enabling(&["enable-app-primary"]),
        InMemoryPatchRegistry::new(),
    );
    let names: Vec<&str> = graph.services().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["app-primary"]);
    assert!(graph.get("app-primary").unwrap().depends_on.is_empty());
}

#[test]
fn database_plus_primary_app_wires_the_fixup_chain() {
    let graph = compose(
        config_enabling(&["enable-database", "enable-app-primary"]),
        InMemoryPatchRegistry::new(),
    );
    let names: Vec<&str> = graph.services().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["database-permissions", "database", "app-primary"]);

    assert_eq!(
        graph.get("database").unwrap().depends_on,
        ["database-permissions"]
    );
    assert_eq!(graph.get("app-primary").unwrap().depends_on, ["database"]);

    let fixup = graph.get("database-permissions").unwrap();
    assert_eq!(fixup.kind, ServiceKind::OneShot);
    assert_eq!(fixup.restart, RestartPolicy::OnFailure);
    assert!(fixup.depends_on.is_empty());
}

#[test]
fn secondary_app_waits_on_primary_but_not_on_inactive_database() {
    let graph = compose(
        config_enabling(&["enable-app-primary", "enable-app-secondary"]),
        InMemoryPatchRegistry::new(),
    );
    let edges = &graph.get("app-secondary").unwrap().depends_on;
    assert!(edges.contains(&"app-primary".to_string()));
    assert!(!edges.contains(&"database".to_string()));
}

#[test]
fn activation_consistency_under_defaults() {
    // defaults: everything on except enable-jobs
    let config = InMemoryConfig::new();
    config.set("database-root-password", "s3cret").unwrap();
    let graph = compose(config, InMemoryPatchRegistry::new());

    for present in [
        "database",
        "database-permissions",
        "search-index",
        "cache",
        "mail-relay",
        "app-primary",
        "worker-primary",
        "app-secondary",
        "worker-secondary",
    ] {
        assert!(graph.contains(present), "{present} should be active");
    }
    for absent in ["job-primary", "job-secondary"] {
        assert!(!graph.contains(absent), "{absent} should be inactive");
    }

    // no dangling edges
    for edge in graph.edges() {
        assert!(graph.contains(&edge.predecessor));
        assert!(graph.contains(&edge.successor));
    }
}

#[test]
fn jobs_activate_with_their_family_switch_and_wait_only_on_database() {
    let graph = compose(
        config_enabling(&["enable-database", "enable-app-primary", "enable-jobs"]),
        InMemoryPatchRegistry::new(),
    );
    let job = graph.get("job-primary").unwrap();
    assert_eq!(job.kind, ServiceKind::OneShot);
    assert_eq!(job.restart, RestartPolicy::Never);
    assert_eq!(job.depends_on, ["database"]);
    assert!(!graph.contains("job-secondary"));
}

#[test]
fn removing_one_predecessor_never_reorders_the_rest() {
    let full = compose(
        config_enabling(&[
            "enable-database",
            "enable-search-index",
            "enable-cache",
            "enable-app-primary",
        ]),
        InMemoryPatchRegistry::new(),
    );
    assert_eq!(
        full.get("app-primary").unwrap().depends_on,
        ["database", "search-index", "cache"]
    );

    let without_search = compose(
        config_enabling(&["enable-database", "enable-cache", "enable-app-primary"]),
        InMemoryPatchRegistry::new(),
    );
    assert_eq!(
        without_search.get("app-primary").unwrap().depends_on,
        ["database", "cache"]
    );
}

#[test]
fn disabling_a_stateful_service_removes_its_fixup_too() {
    let graph = compose(
        config_enabling(&["enable-cache", "enable-app-primary"]),
        InMemoryPatchRegistry::new(),
    );
    assert!(graph.contains("cache-permissions"));

    let graph = compose(
        config_enabling(&["enable-app-primary"]),
        InMemoryPatchRegistry::new(),
    );
    assert!(!graph.contains("cache"));
    assert!(!graph.contains("cache-permissions"));
}

#[test]
fn parameters_substitute_into_image_command_and_environment() {
    let config = config_enabling(&["enable-database", "enable-app-primary", "enable-workers"]);
    config.set("docker-registry", "registry.example.com/").unwrap();
    config.set("app-worker-count", 8i64).unwrap();
    config.set("data-root", "/srv/topoform").unwrap();
    let graph = compose(config, InMemoryPatchRegistry::new());

    assert_eq!(
        graph.get("app-primary").unwrap().image,
        "registry.example.com/example/app:1.0"
    );
    assert_eq!(
        graph.get("worker-primary").unwrap().command.as_deref(),
        Some("app worker --concurrency 8")
    );
    assert_eq!(
        graph.get("database").unwrap().volumes[0].host,
        "/srv/topoform/database"
    );
    assert_eq!(
        graph.get("database").unwrap().environment[0].1,
        "s3cret"
    );
}

#[test]
fn patch_points_are_transparent_when_unused() {
    let quiet = compose(
        config_enabling(&["enable-app-primary"]),
        InMemoryPatchRegistry::new(),
    );
    assert!(quiet.extra_service_fragments().is_empty());

    let projector = ComposeProjector::new();
    let text = projector.project(&quiet);
    assert!(!text.contains("# patch"));

    let registry = InMemoryPatchRegistry::new();
    registry
        .register(
            "extra-services",
            PatchFragment::new("monitoring", "metrics:\n  image: metrics:1\n"),
        )
        .unwrap();
    registry
        .register(
            "app-primary-extra-dependencies",
            PatchFragment::new("monitoring", "- metrics\n"),
        )
        .unwrap();
    let patched = compose(config_enabling(&["enable-app-primary"]), registry);
    assert_eq!(patched.extra_service_fragments().len(), 1);
    assert_eq!(
        patched.get("app-primary").unwrap().extra_dependency_fragments.len(),
        1
    );

    let text = projector.project(&patched);
    assert!(text.contains("# patch: extra-services (monitoring)"));
    assert!(text.contains("\n  metrics:\n    image: metrics:1\n"));
    assert!(text.contains("depends_on:\n      # patch: extra dependencies (monitoring)\n      - metrics\n"));
}

#[test]
fn fragments_for_inactive_dependency_points_are_dropped() {
    let registry = InMemoryPatchRegistry::new();
    registry
        .register(
            "app-secondary-extra-dependencies",
            PatchFragment::new("monitoring", "- metrics\n"),
        )
        .unwrap();
    // app-secondary is inactive, so the fragment has nowhere to land
    let graph = compose(config_enabling(&["enable-app-primary"]), registry);
    assert!(!graph.contains("app-secondary"));
    let text = ComposeProjector::new().project(&graph);
    assert!(!text.contains("metrics"));
}

#[test]
fn rendered_output_is_byte_identical_across_runs() {
    let projector = ComposeProjector::new();
    let render = || {
        let config = config_enabling(&[
            "enable-database",
            "enable-cache",
            "enable-app-primary",
            "enable-workers",
        ]);
        projector.project(&compose(config, InMemoryPatchRegistry::new()))
    };
    assert_eq!(render(), render());
}

#[test]
fn missing_required_password_surfaces_with_the_parameter_name() {
    let config = InMemoryConfig::new(); // defaults activate the database
    let catalog = standard_catalog().unwrap();
    let err = compose_with(&catalog, config, InMemoryPatchRegistry::new()).unwrap_err();
    assert!(err.to_string().contains("database-root-password"));
}
