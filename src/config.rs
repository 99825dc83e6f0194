//! Request-scoped extractor configuration.
//!
//! Nothing here is global: a configuration is passed with every request, so
//! two requests with different settings never see each other's state.
//!
//! ```yaml
//! schemaVersion: "0.4.0"
//! package: { org: acme, name: orders, version: 1.0.0 }
//! modules:
//!   - { org: ballerina, name: http, version: 2.10.0, clients: [Client], listeners: [Listener] }
//! annotations: { id: lenient, label: strict }
//! anonymousIds: deterministic
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ConfigError;
use crate::hir::{ModuleDescriptor, ModuleId};
use crate::model::{AnonymousIds, SCHEMA_VERSION};

/// How a display annotation field without a usable value is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Leniency {
    /// Missing and malformed both default to empty, silently
    #[default]
    Lenient,
    /// A present field without a usable value raises a warning
    Strict,
}

/// Per-field leniency of the `@display` annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationPolicy {
    pub id: Leniency,
    pub label: Leniency,
}

impl AnnotationPolicy {
    pub fn strict() -> Self {
        Self {
            id: Leniency::Strict,
            label: Leniency::Strict,
        }
    }

    pub fn for_field(&self, field: &str) -> Leniency {
        match field {
            "id" => self.id,
            "label" => self.label,
            _ => Leniency::Lenient,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractorConfig {
    pub schema_version: SmolStr,
    /// Package the analyzed files belong to
    pub package: ModuleId,
    /// Descriptors of imported modules
    pub modules: Vec<ModuleDescriptor>,
    pub annotations: AnnotationPolicy,
    pub anonymous_ids: AnonymousIds,
    /// Treat `*Client` types of undescribed modules as client classes
    pub assume_clients_by_name: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.into(),
            package: ModuleId::new("local", "app", "0.1.0"),
            modules: Vec::new(),
            annotations: AnnotationPolicy::default(),
            anonymous_ids: AnonymousIds::default(),
            assume_clients_by_name: true,
        }
    }
}

impl ExtractorConfig {
    pub fn for_package(package: ModuleId) -> Self {
        Self {
            package,
            ..Self::default()
        }
    }

    pub fn with_module(mut self, module: ModuleDescriptor) -> Self {
        self.modules.push(module);
        self
    }

    pub fn with_annotations(mut self, policy: AnnotationPolicy) -> Self {
        self.annotations = policy;
        self
    }

    pub fn with_anonymous_ids(mut self, mode: AnonymousIds) -> Self {
        self.anonymous_ids = mode;
        self
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read a configuration file; the format is chosen by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = std::fs::read_to_string(path)?;
        let config = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        tracing::debug!(
            path = %path.display(),
            package = %config.package,
            modules = config.modules.len(),
            "loaded extractor config"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_defaults_fill_missing_fields() {
        let config = ExtractorConfig::from_yaml_str(
            "package: { org: acme, name: orders, version: 1.0.0 }\nannotations: { label: strict }\n",
        )
        .unwrap();
        assert_eq!(config.package.to_string(), "acme/orders:1.0.0");
        assert_eq!(config.annotations.label, Leniency::Strict);
        assert_eq!(config.annotations.id, Leniency::Lenient);
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(config.anonymous_ids, AnonymousIds::Deterministic);
        assert!(config.assume_clients_by_name);
    }

    #[test]
    fn test_json_modules() {
        let config = ExtractorConfig::from_json_str(
            r#"{"modules": [{"org": "ballerina", "name": "http", "version": "2.10.0", "clients": ["Client"]}], "anonymousIds": "random"}"#,
        )
        .unwrap();
        assert_eq!(config.modules[0].clients, vec![SmolStr::new("Client")]);
        assert_eq!(config.anonymous_ids, AnonymousIds::Random);
    }

    #[test]
    fn test_policy_for_unknown_field_is_lenient() {
        assert_eq!(AnnotationPolicy::strict().for_field("id"), Leniency::Strict);
        assert_eq!(AnnotationPolicy::strict().for_field("color"), Leniency::Lenient);
    }
}
