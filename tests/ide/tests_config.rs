//! Extractor configuration files.

use std::io::Write;

use crate::helpers::source_fixtures::*;
use modelgen::config::Leniency;
use modelgen::model::{AnonymousIds, EntityDetail};
use modelgen::{ConfigError, ExtractError, ExtractorConfig, Span, extract_source};
use rstest::rstest;
use tempfile::NamedTempFile;

const YAML: &str = r#"
schemaVersion: "0.4.0"
package: { org: acme, name: shop, version: 1.0.0 }
modules:
  - { org: ballerina, name: http, version: 2.10.0, clients: [Client], listeners: [Listener] }
annotations: { label: strict }
anonymousIds: random
"#;

const JSON: &str = r#"{
  "package": { "org": "acme", "name": "shop", "version": "1.0.0" },
  "modules": [
    { "org": "ballerina", "name": "http", "version": "2.10.0", "clients": ["Client"], "listeners": ["Listener"] }
  ],
  "annotations": { "label": "strict" },
  "anonymousIds": "random"
}"#;

fn write_config(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[rstest]
#[case::yaml(YAML, ".yaml")]
#[case::yml(YAML, ".yml")]
#[case::json(JSON, ".json")]
fn test_load_config_file(#[case] content: &str, #[case] suffix: &str) {
    let file = write_config(content, suffix);
    let config = ExtractorConfig::from_file(file.path()).unwrap();

    assert_eq!(config.package.to_string(), "acme/shop:1.0.0");
    assert_eq!(config.modules.len(), 1);
    assert_eq!(config.annotations.label, Leniency::Strict);
    assert_eq!(config.annotations.id, Leniency::Lenient);
    assert_eq!(config.anonymous_ids, AnonymousIds::Random);
}

#[test]
fn test_unknown_extension_is_rejected() {
    let file = write_config(YAML, ".toml");
    let err = ExtractorConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "toml"));
}

#[test]
fn test_missing_fields_take_defaults() {
    let config = ExtractorConfig::from_yaml_str("package: { org: acme, name: shop }").unwrap();
    assert_eq!(config.schema_version, ExtractorConfig::default().schema_version);
    assert!(config.modules.is_empty());
    assert_eq!(config.anonymous_ids, AnonymousIds::Deterministic);
}

#[test]
fn test_config_error_converts_into_extract_error() {
    let err: ExtractError = ExtractorConfig::from_json_str("{ not json").unwrap_err().into();
    assert!(matches!(err, ExtractError::Config(_)));
    assert!(!err.is_recoverable());
}

#[test]
fn test_strict_label_warns_on_malformed_display() {
    let config = ExtractorConfig::from_yaml_str(YAML).unwrap();
    let model = extract_source(
        SERVICE_MALFORMED_DISPLAY,
        FILE,
        Span::from_coords(0, 0, 8, 0),
        &config,
    )
    .unwrap();

    let EntityDetail::Service { annotation, .. } = &model.entities[0].detail else {
        panic!("expected service");
    };
    assert!(annotation.is_empty());
    assert_eq!(model.diagnostics.len(), 1);
    assert_eq!(model.diagnostics[0].severity, modelgen::Severity::Warning);
}
