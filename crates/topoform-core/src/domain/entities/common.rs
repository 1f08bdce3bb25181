//! Small shared value types used across the domain.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A configuration value as supplied by the external configuration source.
///
/// The untagged representation means a YAML/JSON document maps naturally:
/// `true` becomes `Bool`, `42` becomes `Integer`, everything else `Str`.
/// Variant order matters for untagged deserialization - booleans and integers
/// must be tried before the catch-all string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Str(String),
}

impl ConfigValue {
    /// Boolean view; `None` for non-boolean values.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Render the value as a parameter string.
    ///
    /// Integers become decimal strings so that numeric parameters (worker
    /// counts, ports) can be written unquoted in configuration files.
    /// Booleans are not valid parameter values and return `None`.
    pub fn as_param(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Bool(_) => None,
        }
    }

    /// Human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Str(_) => "string",
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Restart policy for a service, in container-runtime terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartPolicy {
    /// Long-running services: restart whenever the process exits.
    Always,
    /// One-shot preparation services (permission fixups): retry on the first
    /// failure only, never restart after success.
    OnFailure,
    /// One-shot jobs: run once, never restart.
    Never,
}

impl RestartPolicy {
    /// The literal used by compose-style documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::OnFailure => "on-failure",
            Self::Never => "no",
        }
    }
}

/// Whether a service is a long-running process or a one-off job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    LongRunning,
    OneShot,
}

/// Access mode for a volume binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeMode {
    ReadWrite,
    ReadOnly,
}

/// A (host-path, mount-path, mode) volume binding.
///
/// The host path may contain `{{parameter}}` placeholders; the mount path is
/// always literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBinding {
    pub host: String,
    pub container: String,
    pub mode: VolumeMode,
}

impl VolumeBinding {
    pub fn read_write(host: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
            mode: VolumeMode::ReadWrite,
        }
    }

    pub fn read_only(host: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
            mode: VolumeMode::ReadOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_value_as_param() {
        assert_eq!(ConfigValue::from("x").as_param().as_deref(), Some("x"));
        assert_eq!(ConfigValue::from(7i64).as_param().as_deref(), Some("7"));
        assert_eq!(ConfigValue::from(true).as_param(), None);
    }

    #[test]
    fn config_value_as_bool() {
        assert_eq!(ConfigValue::from(true).as_bool(), Some(true));
        assert_eq!(ConfigValue::from("true").as_bool(), None);
    }

    #[test]
    fn restart_policy_compose_literals() {
        assert_eq!(RestartPolicy::Always.as_str(), "always");
        assert_eq!(RestartPolicy::OnFailure.as_str(), "on-failure");
        assert_eq!(RestartPolicy::Never.as_str(), "no");
    }
}
