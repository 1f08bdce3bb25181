//! The built-in standard catalog.
//!
//! Eleven services: four stateful data services with permission-fixup
//! companions, a mail relay, two application tiers, their background workers,
//! and two one-shot job runners. Adjacency declaration order drives the order
//! of emitted dependency edges, so the lists below are ordered deliberately.

use topoform_core::{
    domain::{
        Activation, Catalog, PatchAttachment, PermissionFixup, ServiceDefinition, VolumeBinding,
    },
    error::TopoResult,
};

/// Build the standard catalog. The result is self-checked; a failure here is
/// a defect in this file.
pub fn standard_catalog() -> TopoResult<Catalog> {
    let catalog = Catalog::builder()
        .service(database()?)
        .service(search_index()?)
        .service(document_store()?)
        .service(cache()?)
        .service(mail_relay()?)
        .service(app_primary()?)
        .service(worker_primary()?)
        .service(app_secondary()?)
        .service(worker_secondary()?)
        .service(job_primary()?)
        .service(job_secondary()?)
        .depends_on(
            "app-primary",
            ["database", "search-index", "document-store", "cache", "mail-relay"],
        )
        .depends_on("worker-primary", ["app-primary"])
        .depends_on(
            "app-secondary",
            [
                "database",
                "search-index",
                "document-store",
                "cache",
                "mail-relay",
                "app-primary",
            ],
        )
        .depends_on("worker-secondary", ["app-secondary"])
        // Job runners only wait on the database; they connect to the other
        // stores lazily and retry on their own.
        .depends_on("job-primary", ["database"])
        .depends_on("job-secondary", ["database"])
        .flag("enable-database", true)
        .flag("enable-search-index", true)
        .flag("enable-document-store", true)
        .flag("enable-cache", true)
        .flag("enable-mail-relay", true)
        .flag("enable-app-primary", true)
        .flag("enable-app-secondary", true)
        .flag("enable-workers", true)
        .flag("enable-jobs", false)
        .param("docker-registry", "")
        .param("data-root", "./data")
        .param("database-image", "docker.io/library/mysql:8.4.2")
        .param("search-index-image", "docker.io/library/elasticsearch:7.17.13")
        .param("document-store-image", "docker.io/library/mongo:7.0.7")
        .param("cache-image", "docker.io/library/redis:7.2.4")
        .param("mail-relay-image", "docker.io/devture/exim-relay:4.96-r1-0")
        .param("app-image", "example/app:1.0")
        .param("permissions-image", "docker.io/library/busybox:1.36")
        .param("app-worker-count", "2")
        .required_param("database-root-password")
        .patch_point("extra-services", PatchAttachment::Services)
        .patch_point(
            "app-primary-extra-dependencies",
            PatchAttachment::Dependencies("app-primary".into()),
        )
        .patch_point(
            "app-secondary-extra-dependencies",
            PatchAttachment::Dependencies("app-secondary".into()),
        )
        .build()?;
    Ok(catalog)
}

fn database() -> TopoResult<ServiceDefinition> {
    Ok(ServiceDefinition::builder("database")
        .image("{{database-image}}")
        .command("mysqld --character-set-server=utf8mb4 --collation-server=utf8mb4_unicode_ci")
        .env("MYSQL_ROOT_PASSWORD", "{{database-root-password}}")
        .volume(VolumeBinding::read_write("{{data-root}}/database", "/var/lib/mysql"))
        .activation(Activation::flag("enable-database"))
        .fixup(PermissionFixup::new("999:999"))
        .build()?)
}

fn search_index() -> TopoResult<ServiceDefinition> {
    Ok(ServiceDefinition::builder("search-index")
        .image("{{search-index-image}}")
        .env("discovery.type", "single-node")
        .env("ES_JAVA_OPTS", "-Xms1g -Xmx1g")
        .volume(VolumeBinding::read_write(
            "{{data-root}}/search-index",
            "/usr/share/elasticsearch/data",
        ))
        .activation(Activation::flag("enable-search-index"))
        .fixup(PermissionFixup::new("1000:1000"))
        .build()?)
}

fn document_store() -> TopoResult<ServiceDefinition> {
    Ok(ServiceDefinition::builder("document-store")
        .image("{{document-store-image}}")
        .command("mongod --storageEngine wiredTiger")
        .volume(VolumeBinding::read_write("{{data-root}}/document-store", "/data/db"))
        .activation(Activation::flag("enable-document-store"))
        .fixup(PermissionFixup::new("999:999"))
        .build()?)
}

fn cache() -> TopoResult<ServiceDefinition> {
    Ok(ServiceDefinition::builder("cache")
        .image("{{cache-image}}")
        .command("redis-server --appendonly yes")
        .volume(VolumeBinding::read_write("{{data-root}}/cache", "/data"))
        .activation(Activation::flag("enable-cache"))
        .fixup(PermissionFixup::new("1000:1000"))
        .build()?)
}

fn mail_relay() -> TopoResult<ServiceDefinition> {
    Ok(ServiceDefinition::builder("mail-relay")
        .image("{{mail-relay-image}}")
        .env("HOSTNAME", "mail-relay")
        .activation(Activation::flag("enable-mail-relay"))
        .build()?)
}

fn app_primary() -> TopoResult<ServiceDefinition> {
    Ok(ServiceDefinition::builder("app-primary")
        .image("{{docker-registry}}{{app-image}}")
        .command("app serve --port 8000")
        .env("APP_ROLE", "primary")
        .activation(Activation::flag("enable-app-primary"))
        .build()?)
}

fn worker_primary() -> TopoResult<ServiceDefinition> {
    Ok(ServiceDefinition::builder("worker-primary")
        .image("{{docker-registry}}{{app-image}}")
        .command("app worker --concurrency {{app-worker-count}}")
        .env("APP_ROLE", "primary")
        .activation(Activation::all_of(["enable-app-primary", "enable-workers"]))
        .build()?)
}

fn app_secondary() -> TopoResult<ServiceDefinition> {
    Ok(ServiceDefinition::builder("app-secondary")
        .image("{{docker-registry}}{{app-image}}")
        .command("app serve --port 8001")
        .env("APP_ROLE", "secondary")
        .activation(Activation::flag("enable-app-secondary"))
        .build()?)
}

fn worker_secondary() -> TopoResult<ServiceDefinition> {
    Ok(ServiceDefinition::builder("worker-secondary")
        .image("{{docker-registry}}{{app-image}}")
        .command("app worker --concurrency {{app-worker-count}}")
        .env("APP_ROLE", "secondary")
        .activation(Activation::all_of(["enable-app-secondary", "enable-workers"]))
        .build()?)
}

fn job_primary() -> TopoResult<ServiceDefinition> {
    Ok(ServiceDefinition::builder("job-primary")
        .image("{{docker-registry}}{{app-image}}")
        .command("app migrate")
        .env("APP_ROLE", "primary")
        .one_shot()
        .activation(Activation::all_of(["enable-app-primary", "enable-jobs"]))
        .build()?)
}

fn job_secondary() -> TopoResult<ServiceDefinition> {
    Ok(ServiceDefinition::builder("job-secondary")
        .image("{{docker-registry}}{{app-image}}")
        .command("app migrate --tenant secondary")
        .env("APP_ROLE", "secondary")
        .one_shot()
        .activation(Activation::all_of(["enable-app-secondary", "enable-jobs"]))
        .build()?)
}
