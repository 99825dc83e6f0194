//! Helpers for building hosts and inspecting extracted models.

use modelgen::hir::ModuleDescriptor;
use modelgen::model::id::is_random_id;
use modelgen::{Entity, ExtractorConfig, Model, ModuleId, Span, extract_source};

use super::source_fixtures::FILE;

/// Configuration used by most tests: package `acme/shop` with the http
/// module described.
pub fn shop_config() -> ExtractorConfig {
    ExtractorConfig::for_package(ModuleId::new("acme", "shop", "1.0.0")).with_module(
        ModuleDescriptor::new("ballerina", "http", "2.10.0")
            .with_clients(["Client"])
            .with_listeners(["Listener"])
            .with_types(["Response", "Request"]),
    )
}

/// Span covering the whole of `source`.
pub fn whole(source: &str) -> Span {
    let lines = source.lines().count();
    Span::from_coords(0, 0, lines, 0)
}

/// Extract the whole of `source` with [`shop_config`].
pub fn extract_whole(source: &str) -> Model {
    extract_source(source, FILE, whole(source), &shop_config()).expect("extraction should succeed")
}

/// First entity with `label`, anywhere in the tree.
pub fn find<'a>(model: &'a Model, label: &str) -> &'a Entity {
    model
        .walk()
        .find(|e| e.label == label)
        .unwrap_or_else(|| panic!("no entity labelled `{label}`"))
}

/// Serialized model with every random id replaced by a placeholder.
pub fn normalized_json(model: &Model) -> String {
    let mut json = model.to_json().expect("model serializes");
    for entity in model.walk() {
        if is_random_id(&entity.id) {
            json = json.replace(entity.id.as_str(), "<random>");
        }
    }
    json
}
