//! Partial-failure containment and span scoping.

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;
use modelgen::hir::{Severity, codes};
use modelgen::{ExtractError, Span, extract_source};

#[test]
fn test_broken_function_does_not_abort_extraction() {
    let model = extract_whole(BROKEN_AND_VALID);

    let labels: Vec<_> = model.entities.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["valid"]);

    assert_eq!(model.diagnostics.len(), 1);
    let diagnostic = &model.diagnostics[0];
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.code.as_deref(), Some(codes::SUBTREE_EXTRACTION));
    let span = diagnostic.span.as_ref().expect("diagnostic span");
    assert_eq!(span.start.line, 0);
    assert_eq!(span.start.column, 0);
}

#[test]
fn test_garbage_between_items_is_reported_once() {
    let source = "function a() {\n}\n%%% ??? %%%\nfunction b() {\n}\n";
    let model = extract_whole(source);
    let labels: Vec<_> = model.entities.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["a", "b"]);
    let malformed = model
        .diagnostics
        .iter()
        .filter(|d| d.code.as_deref() == Some(codes::MALFORMED_SYNTAX))
        .count();
    assert_eq!(malformed, 1);
}

#[test]
fn test_entities_stay_inside_the_located_construct() {
    // cursor on `main`
    let model = extract_source(
        CALLS_AND_TYPES,
        FILE,
        Span::from_coords(7, 10, 7, 10),
        &shop_config(),
    )
    .unwrap();
    let main = &model.entities[0];
    assert_eq!(main.label, "main");
    assert_eq!(model.entities.len(), 1);
    for entity in model.walk() {
        assert!(main.span.contains(&entity.span), "{} escapes main", entity.label);
    }
    // `load` and `audit` are outside the span, so calls to them are dropped
    for reference in &model.references {
        if let Some(target) = reference.target_entity() {
            assert!(model.entity(target).is_some());
        }
    }
}

#[test]
fn test_span_past_end_of_file_is_not_found() {
    let err = extract_source(
        MAIN_TWO_PARAMS,
        FILE,
        Span::from_coords(40, 0, 41, 0),
        &shop_config(),
    )
    .unwrap_err();
    assert!(matches!(err, ExtractError::NotFound { .. }));
    assert!(err.is_recoverable());
}

#[test]
fn test_empty_file_yields_empty_model() {
    let model = extract_source("", FILE, Span::from_coords(0, 0, 0, 0), &shop_config()).unwrap();
    assert!(model.is_empty());
    assert!(model.references.is_empty());
}

#[test]
fn test_malformed_statement_is_reported_without_losing_siblings() {
    let source = "service /s on ep {\n    resource function get a() {\n        int x = ;\n    }\n    resource function get b() {\n    }\n}\n";
    let model = extract_whole(source);

    let labels: Vec<_> = model.walk().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["s", "get a", "get b"]);

    assert_eq!(model.diagnostics.len(), 1);
    let diagnostic = &model.diagnostics[0];
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.code.as_deref(), Some(codes::MALFORMED_SYNTAX));
    let span = diagnostic.span.as_ref().expect("diagnostic span");
    assert!(find(&model, "get a").span.contains(span));
    assert_eq!(span.start.line, 2);
    assert!(model.diagnostics.iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn test_malformed_condition_in_function_is_reported() {
    let model = extract_whole("function f() {\n    if {\n    }\n}\nfunction g() {\n}\n");
    assert!(!model.diagnostics.is_empty());
    assert!(model.diagnostics.iter().any(|d| d.severity == Severity::Error));
    let labels: Vec<_> = model.entities.iter().map(|e| e.label.as_str()).collect();
    assert!(labels.contains(&"g"));
}
