//! Parameter substitution for catalog templates.
//!
//! Catalog strings (image references, commands, environment values, host
//! paths) may contain `{{parameter-name}}` placeholders. Substitution is
//! *total*: every placeholder must resolve or the whole operation fails with
//! the offending placeholder name. Substituted values are inserted verbatim
//! and never rescanned, so configuration values cannot inject further
//! placeholders.

use crate::domain::error::DomainError;

/// Substitute every `{{name}}` placeholder in `template`.
///
/// The lookup returns `Ok(None)` for names it does not know; that becomes an
/// `UnresolvedParameter` error carrying the placeholder and the service being
/// resolved. Lookup errors (e.g. a declared-but-missing required parameter)
/// propagate unchanged.
pub fn substitute<F>(template: &str, service: &str, mut lookup: F) -> Result<String, DomainError>
where
    F: FnMut(&str) -> Result<Option<String>, DomainError>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            // An opening marker with no close is a malformed template, which
            // is a catalog defect rather than a configuration gap.
            return Err(DomainError::CatalogIntegrity(format!(
                "unterminated placeholder in template of service '{service}'"
            )));
        };
        let name = after[..end].trim();
        match lookup(name)? {
            Some(value) => out.push_str(&value),
            None => {
                return Err(DomainError::UnresolvedParameter {
                    placeholder: name.to_string(),
                    service: service.to_string(),
                });
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// All placeholder names referenced by a template, in order of appearance.
/// Malformed templates yield the names found before the defect.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else { break };
        names.push(after[..end].trim());
        rest = &after[end + 2..];
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed<'a>(
        pairs: &'a [(&'a str, &'a str)],
    ) -> impl FnMut(&str) -> Result<Option<String>, DomainError> + 'a {
        move |name| {
            Ok(pairs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.to_string()))
        }
    }

    #[test]
    fn substitutes_multiple_placeholders() {
        let out = substitute(
            "{{registry}}/app:{{tag}}",
            "app",
            fixed(&[("registry", "docker.io"), ("tag", "1.0")]),
        )
        .unwrap();
        assert_eq!(out, "docker.io/app:1.0");
    }

    #[test]
    fn whitespace_inside_braces_is_tolerated() {
        let out = substitute("{{ name }}", "svc", fixed(&[("name", "x")])).unwrap();
        assert_eq!(out, "x");
    }

    #[test]
    fn unknown_placeholder_fails_with_its_name() {
        let err = substitute("{{missing}}", "database", fixed(&[])).unwrap_err();
        match err {
            DomainError::UnresolvedParameter { placeholder, service } => {
                assert_eq!(placeholder, "missing");
                assert_eq!(service, "database");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unterminated_placeholder_is_a_catalog_defect() {
        let err = substitute("{{oops", "svc", fixed(&[("oops", "x")])).unwrap_err();
        assert!(matches!(err, DomainError::CatalogIntegrity(_)));
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let out = substitute("{{a}}", "svc", fixed(&[("a", "{{b}}")])).unwrap();
        assert_eq!(out, "{{b}}");
    }

    #[test]
    fn literal_text_passes_through() {
        let out = substitute("no placeholders here", "svc", fixed(&[])).unwrap();
        assert_eq!(out, "no placeholders here");
    }

    #[test]
    fn placeholders_are_listed_in_order() {
        assert_eq!(placeholders("{{a}}-{{ b }}/{{c}}"), vec!["a", "b", "c"]);
    }
}
