//! Repeated extraction of unchanged input.

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;
use modelgen::model::id::is_random_id;
use modelgen::model::{AnonymousIds, EntityKind};
use modelgen::{Span, extract_source};

#[test]
fn test_extraction_is_idempotent() {
    for source in [SERVICE_TWO_RESOURCES, SERVICE_UNINVOKED_CLIENT, CALLS_AND_TYPES] {
        let first = extract_whole(source);
        let second = extract_whole(source);
        assert_eq!(first, second);
    }
}

#[test]
fn test_random_ids_only_for_control_flow() {
    let config = shop_config().with_anonymous_ids(AnonymousIds::Random);
    let first = extract_source(CALLS_AND_TYPES, FILE, whole(CALLS_AND_TYPES), &config).unwrap();
    let second = extract_source(CALLS_AND_TYPES, FILE, whole(CALLS_AND_TYPES), &config).unwrap();

    for entity in first.walk() {
        assert_eq!(
            is_random_id(&entity.id),
            entity.kind() == EntityKind::ControlFlow,
            "{}",
            entity.label
        );
    }
    assert_ne!(first, second);
    assert_eq!(normalized_json(&first), normalized_json(&second));
}

#[test]
fn test_ids_agree_between_whole_file_and_narrow_span() {
    let whole_model = extract_whole(CALLS_AND_TYPES);
    let narrow = extract_source(
        CALLS_AND_TYPES,
        FILE,
        Span::from_coords(16, 10, 16, 10),
        &shop_config(),
    )
    .unwrap();

    let load = &narrow.entities[0];
    assert_eq!(load.label, "load");
    assert_eq!(whole_model.entity(&load.id), Some(load));
}
