//! YAML deployment-file configuration source.

use std::{collections::HashMap, path::Path};

use tracing::debug;

use topoform_core::{
    application::{ApplicationError, ports::ConfigSource},
    domain::ConfigValue,
    error::TopoResult,
};

/// Configuration source backed by a flat YAML mapping.
///
/// The file is a single mapping of names to scalars:
///
/// ```yaml
/// enable-search-index: false
/// database-root-password: s3cret
/// app-worker-count: 4
/// ```
///
/// The whole file is read once at construction; lookups never touch the
/// filesystem again, which keeps the resolver's snapshot semantics honest
/// even if the file changes mid-run.
#[derive(Debug)]
pub struct YamlFileConfig {
    values: HashMap<String, ConfigValue>,
}

impl YamlFileConfig {
    /// Load and parse the deployment file.
    ///
    /// # Errors
    ///
    /// `ApplicationError::SourceFailure` when the file cannot be read or is
    /// not a mapping of scalars.
    pub fn load(path: &Path) -> TopoResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ApplicationError::SourceFailure {
            reason: format!("cannot read '{}': {}", path.display(), e),
        })?;
        let values = Self::parse(&text).map_err(|reason| ApplicationError::SourceFailure {
            reason: format!("invalid deployment file '{}': {}", path.display(), reason),
        })?;
        debug!(path = %path.display(), entries = values.len(), "deployment file loaded");
        Ok(Self { values })
    }

    /// Parse the file body. Split out so tests can skip the filesystem.
    fn parse(text: &str) -> Result<HashMap<String, ConfigValue>, String> {
        if text.trim().is_empty() {
            return Ok(HashMap::new());
        }
        let raw: HashMap<String, serde_yaml::Value> =
            serde_yaml::from_str(text).map_err(|e| e.to_string())?;
        let mut values = HashMap::with_capacity(raw.len());
        for (name, value) in raw {
            let value = match value {
                serde_yaml::Value::Bool(b) => ConfigValue::Bool(b),
                serde_yaml::Value::Number(n) => match n.as_i64() {
                    Some(i) => ConfigValue::Integer(i),
                    None => return Err(format!("'{name}' is not an integer or scalar")),
                },
                serde_yaml::Value::String(s) => ConfigValue::Str(s),
                other => {
                    return Err(format!(
                        "'{name}' must be a boolean, integer or string, got {other:?}"
                    ));
                }
            };
            values.insert(name, value);
        }
        Ok(values)
    }
}

impl ConfigSource for YamlFileConfig {
    fn get(&self, name: &str) -> TopoResult<Option<ConfigValue>> {
        Ok(self.values.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_flat_scalar_mapping() {
        let values = YamlFileConfig::parse(
            "enable-cache: false\napp-worker-count: 4\ndata-root: /srv/data\n",
        )
        .unwrap();
        assert_eq!(values["enable-cache"], ConfigValue::Bool(false));
        assert_eq!(values["app-worker-count"], ConfigValue::Integer(4));
        assert_eq!(values["data-root"], ConfigValue::Str("/srv/data".into()));
    }

    #[test]
    fn empty_file_is_an_empty_source() {
        assert!(YamlFileConfig::parse("  \n").unwrap().is_empty());
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = YamlFileConfig::parse("database:\n  password: x\n").unwrap_err();
        assert!(err.contains("database"));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "enable-mail-relay: false").unwrap();
        let source = YamlFileConfig::load(file.path()).unwrap();
        assert_eq!(
            source.get("enable-mail-relay").unwrap(),
            Some(ConfigValue::Bool(false))
        );
    }

    #[test]
    fn missing_file_is_a_source_failure() {
        let err = YamlFileConfig::load(Path::new("/no/such/deployment.yml")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
