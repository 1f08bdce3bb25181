//! Flag and parameter resolution.
//!
//! The resolver snapshots the external configuration source against the
//! catalog's declarations exactly once per generation run. Every later
//! lookup is served from the snapshot, which gives the referential
//! stability the composer relies on: identical inputs within one run,
//! identical answers, no matter how often or in what order the composer
//! asks.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    application::ports::ConfigSource,
    domain::{Activation, Catalog, ConfigValue, DomainError},
    error::TopoResult,
};

/// Immutable flag/parameter snapshot for one generation run.
#[derive(Debug)]
pub struct FlagResolver {
    flags: HashMap<String, bool>,
    /// `None` marks a declared required parameter the source did not supply;
    /// the failure is raised on first lookup, not at snapshot time, so that
    /// configurations which never activate the consuming service still
    /// compose.
    params: HashMap<String, Option<String>>,
}

impl FlagResolver {
    /// Resolve every declared flag and parameter against the source.
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidValueType` if a configured value has the wrong
    ///   shape (a string where a boolean flag is expected, a boolean where a
    ///   parameter is expected)
    /// - any failure of the source itself, propagated verbatim
    pub fn snapshot(catalog: &Catalog, source: &dyn ConfigSource) -> TopoResult<Self> {
        let mut flags = HashMap::new();
        for decl in catalog.flags() {
            let value = match source.get(&decl.name)? {
                Some(ConfigValue::Bool(b)) => b,
                Some(other) => {
                    return Err(DomainError::InvalidValueType {
                        name: decl.name.clone(),
                        expected: "boolean",
                        found: other.type_name(),
                    }
                    .into());
                }
                None => decl.default,
            };
            flags.insert(decl.name.clone(), value);
        }

        let mut params = HashMap::new();
        for decl in catalog.params() {
            let value = match source.get(&decl.name)? {
                Some(value) => match value.as_param() {
                    Some(s) => Some(s),
                    None => {
                        return Err(DomainError::InvalidValueType {
                            name: decl.name.clone(),
                            expected: "string or integer",
                            found: value.type_name(),
                        }
                        .into());
                    }
                },
                None => decl.default.clone(),
            };
            params.insert(decl.name.clone(), value);
        }

        debug!(
            flags = flags.len(),
            params = params.len(),
            "configuration snapshot taken"
        );
        Ok(Self { flags, params })
    }

    /// Resolve a declared boolean flag.
    pub fn flag(&self, name: &str) -> Result<bool, DomainError> {
        self.flags
            .get(name)
            .copied()
            .ok_or_else(|| DomainError::UndeclaredName {
                name: name.to_string(),
            })
    }

    /// Resolve a declared parameter to its value.
    ///
    /// # Errors
    ///
    /// - `UndeclaredName` for names the catalog never declared
    /// - `MissingRequiredValue` for declared parameters with neither a
    ///   configured value nor a default
    pub fn param(&self, name: &str) -> Result<&str, DomainError> {
        match self.params.get(name) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(DomainError::MissingRequiredValue {
                name: name.to_string(),
            }),
            None => Err(DomainError::UndeclaredName {
                name: name.to_string(),
            }),
        }
    }

    /// Parameter lookup for template substitution: undeclared names are
    /// `Ok(None)` (so substitution can report the placeholder), missing
    /// required values are still hard errors.
    pub fn param_for_template(&self, name: &str) -> Result<Option<String>, DomainError> {
        match self.params.get(name) {
            Some(Some(value)) => Ok(Some(value.clone())),
            Some(None) => Err(DomainError::MissingRequiredValue {
                name: name.to_string(),
            }),
            None => Ok(None),
        }
    }

    /// Evaluate an activation predicate against the snapshot.
    pub fn evaluate(&self, activation: &Activation) -> Result<bool, DomainError> {
        activation.evaluate(|name| self.flag(name))
    }
}
