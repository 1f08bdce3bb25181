//! Projection of a [`ServiceGraph`] into a compose-style YAML document.
//!
//! The projection is hand-built text rather than a serde round trip: patch
//! fragments are opaque and must land in the output byte-for-byte (modulo
//! re-indentation), which a YAML object model cannot guarantee. Everything
//! the projector emits itself is plain scalars, so the document stays valid
//! YAML as long as fragments are.

use std::fmt::Write;

use topoform_core::domain::{PatchFragment, ResolvedService, ServiceGraph, VolumeMode};

/// Stateless `ServiceGraph` -> YAML text projector.
#[derive(Default)]
pub struct ComposeProjector;

impl ComposeProjector {
    pub fn new() -> Self {
        Self
    }

    /// Render the full document. Service order is the graph's emission order;
    /// graph-level extra-service fragments are appended after the last
    /// service, each under a one-line provenance comment.
    pub fn project(&self, graph: &ServiceGraph) -> String {
        let mut out = String::new();
        out.push_str("services:\n");
        for service in graph.services() {
            self.project_service(&mut out, service);
        }
        for fragment in graph.extra_service_fragments() {
            push_fragment(&mut out, fragment, "  ", "extra-services");
        }
        out
    }

    fn project_service(&self, out: &mut String, service: &ResolvedService) {
        let _ = writeln!(out, "  {}:", service.name);
        let _ = writeln!(out, "    image: {}", yaml_scalar(&service.image));
        if let Some(command) = &service.command {
            let _ = writeln!(out, "    command: {}", yaml_scalar(command));
        }
        // "no" is a YAML boolean literal, so the restart value goes through
        // scalar quoting like everything else
        let _ = writeln!(out, "    restart: {}", yaml_scalar(service.restart.as_str()));

        if !service.environment.is_empty() {
            out.push_str("    environment:\n");
            for (name, value) in &service.environment {
                let _ = writeln!(out, "      {}: {}", name, yaml_scalar(value));
            }
        }

        if !service.volumes.is_empty() {
            out.push_str("    volumes:\n");
            for volume in &service.volumes {
                let suffix = match volume.mode {
                    VolumeMode::ReadWrite => "",
                    VolumeMode::ReadOnly => ":ro",
                };
                let _ = writeln!(
                    out,
                    "      - {}",
                    yaml_scalar(&format!("{}:{}{}", volume.host, volume.container, suffix))
                );
            }
        }

        // depends_on is omitted entirely when there are neither edges nor
        // fragments; an empty block is not valid compose YAML.
        if !service.depends_on.is_empty() || !service.extra_dependency_fragments.is_empty() {
            out.push_str("    depends_on:\n");
            for predecessor in &service.depends_on {
                let _ = writeln!(out, "      - {predecessor}");
            }
            for fragment in &service.extra_dependency_fragments {
                push_fragment(out, fragment, "      ", "extra dependencies");
            }
        }
    }
}

/// Splice an opaque fragment at the given indentation, under a provenance
/// comment. The fragment's own leading indentation (the common prefix of its
/// non-empty lines) is stripped first, so contributors can write fragments at
/// whatever level reads naturally in their own files.
fn push_fragment(out: &mut String, fragment: &PatchFragment, indent: &str, label: &str) {
    let _ = writeln!(out, "{indent}# patch: {label} ({})", fragment.origin);
    let strip = common_indent(&fragment.body);
    for line in fragment.body.lines() {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            // counted in chars, not bytes: fragment whitespace is opaque and
            // may be wider than one byte
            let rest = line
                .char_indices()
                .nth(strip)
                .map_or(line.len(), |(offset, _)| offset);
            let _ = writeln!(out, "{indent}{}", &line[rest..]);
        }
    }
}

/// Longest whitespace prefix shared by every non-empty line, in chars.
fn common_indent(body: &str) -> usize {
    body.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0)
}

/// Quote a scalar only when YAML would otherwise mangle it.
fn yaml_scalar(value: &str) -> String {
    let needs_quoting = value.is_empty()
        || value.starts_with(['&', '*', '!', '%', '@', '`', '"', '\'', '-', '?', '[', ']', '{', '}', '#', '|', '>'])
        || value.contains(": ")
        || value.ends_with(':')
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace)
        || matches!(
            value,
            "true" | "false" | "null" | "yes" | "no" | "on" | "off" | "~"
        );
    if needs_quoting {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topoform_core::domain::{
        ResolvedVolume, RestartPolicy, ServiceKind,
    };

    fn service(name: &str) -> ResolvedService {
        ResolvedService {
            name: name.to_string(),
            kind: ServiceKind::LongRunning,
            image: "example/app:1.0".into(),
            command: None,
            environment: Vec::new(),
            volumes: Vec::new(),
            restart: RestartPolicy::Always,
            depends_on: Vec::new(),
            extra_dependency_fragments: Vec::new(),
        }
    }

    fn graph(services: Vec<ResolvedService>, extra: Vec<PatchFragment>) -> ServiceGraph {
        // round trip through serde keeps ServiceGraph construction private
        let json = serde_json::json!({
            "services": serde_json::to_value(&services).unwrap(),
            "extra_service_fragments": serde_json::to_value(&extra).unwrap(),
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn renders_full_service_block() {
        let mut db = service("database");
        db.command = Some("mysqld --skip-name-resolve".into());
        db.environment = vec![("MYSQL_ROOT_PASSWORD".into(), "s3cret".into())];
        db.volumes = vec![ResolvedVolume {
            host: "./data/database".into(),
            container: "/var/lib/mysql".into(),
            mode: VolumeMode::ReadWrite,
        }];
        db.depends_on = vec!["database-permissions".into()];

        let text = ComposeProjector::new().project(&graph(vec![db], Vec::new()));
        let expected = "services:\n\
                        \x20 database:\n\
                        \x20   image: example/app:1.0\n\
                        \x20   command: mysqld --skip-name-resolve\n\
                        \x20   restart: always\n\
                        \x20   environment:\n\
                        \x20     MYSQL_ROOT_PASSWORD: s3cret\n\
                        \x20   volumes:\n\
                        \x20     - ./data/database:/var/lib/mysql\n\
                        \x20   depends_on:\n\
                        \x20     - database-permissions\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn depends_on_is_omitted_when_empty() {
        let text = ComposeProjector::new().project(&graph(vec![service("cache")], Vec::new()));
        assert!(!text.contains("depends_on"));
    }

    #[test]
    fn read_only_volumes_get_the_ro_suffix() {
        let mut svc = service("app");
        svc.volumes = vec![ResolvedVolume {
            host: "./conf".into(),
            container: "/etc/app".into(),
            mode: VolumeMode::ReadOnly,
        }];
        let text = ComposeProjector::new().project(&graph(vec![svc], Vec::new()));
        assert!(text.contains("- ./conf:/etc/app:ro"));
    }

    #[test]
    fn fragments_are_reindented_under_a_provenance_comment() {
        let extra = vec![PatchFragment::new(
            "monitoring.yml",
            "    metrics:\n      image: metrics:1\n",
        )];
        let text = ComposeProjector::new().project(&graph(vec![service("app")], extra));
        assert!(text.contains("  # patch: extra-services (monitoring.yml)\n"));
        assert!(text.contains("\n  metrics:\n    image: metrics:1\n"));
    }

    #[test]
    fn fragments_with_wide_whitespace_indent_still_splice() {
        // U+00A0 is whitespace but two bytes wide; stripping must not land
        // mid-character
        let extra = vec![PatchFragment::new(
            "wide.yml",
            " a: 1\n\u{a0}b: 2\n",
        )];
        let text = ComposeProjector::new().project(&graph(vec![service("app")], extra));
        assert!(text.contains("\n  a: 1\n  b: 2\n"), "text: {text}");
    }

    #[test]
    fn dependency_fragments_land_inside_depends_on() {
        let mut svc = service("app");
        svc.depends_on = vec!["database".into()];
        svc.extra_dependency_fragments = vec![PatchFragment::new("monitoring.yml", "- metrics\n")];
        let text = ComposeProjector::new().project(&graph(vec![svc], Vec::new()));
        assert!(text.contains(
            "    depends_on:\n      - database\n      # patch: extra dependencies (monitoring.yml)\n      - metrics\n"
        ));
    }

    #[test]
    fn ambiguous_scalars_are_quoted() {
        assert_eq!(yaml_scalar("no"), "\"no\"");
        assert_eq!(yaml_scalar(""), "\"\"");
        assert_eq!(yaml_scalar("a: b"), "\"a: b\"");
        assert_eq!(yaml_scalar("plain-value"), "plain-value");
        assert_eq!(yaml_scalar("app serve --port 8000"), "app serve --port 8000");
    }
}
