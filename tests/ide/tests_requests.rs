//! Extraction requests against the analysis host.

use std::sync::Arc;

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;
use modelgen::ide::{AnalysisHost, ExtractionRequest, ModelCache, RequestParams};
use modelgen::model::AnonymousIds;
use modelgen::{ExtractError, ModuleId, SemanticModel, Span};
use modelgen::parser::{AstNode, SourceFile, parse};

fn host_with(source: &str, version: i32) -> AnalysisHost {
    let host = AnalysisHost::new(shop_config());
    host.set_file_content(FILE, source, Some(version));
    host
}

#[test]
fn test_response_for_current_version() {
    let host = host_with(SERVICE_TWO_RESOURCES, 4);
    let request = ExtractionRequest::new(FILE, whole(SERVICE_TWO_RESOURCES)).with_version(4);
    let response = host.analysis().respond(&request);

    assert!(response.error.is_none());
    assert!(!response.partial);
    assert_eq!(response.model.unwrap().entities.len(), 1);
}

#[test]
fn test_partial_response_keeps_valid_entities() {
    let host = host_with(BROKEN_AND_VALID, 1);
    let request = ExtractionRequest::new(FILE, whole(BROKEN_AND_VALID));
    let response = host.analysis().respond(&request);

    assert!(response.partial);
    assert_eq!(response.diagnostics.len(), 1);
    let model = response.model.expect("partial responses carry a model");
    assert_eq!(model.entities[0].label, "valid");
}

#[test]
fn test_stale_location_is_recoverable() {
    let host = host_with(MAIN_TWO_PARAMS, 2);
    let request = ExtractionRequest::new(FILE, whole(MAIN_TWO_PARAMS)).with_version(1);

    let err = host.analysis().extract(&request).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::StaleLocation {
            requested: 1,
            current: Some(2)
        }
    ));
    let response = host.analysis().respond(&request);
    assert!(response.model.is_none());
    assert!(response.error.unwrap().recoverable);
}

#[test]
fn test_stale_semantic_model_is_rejected() {
    let host = host_with(MAIN_TWO_PARAMS, 5);
    let file = SourceFile::cast(parse(MAIN_TWO_PARAMS).syntax()).unwrap();
    let lagging = SemanticModel::builder(ModuleId::new("acme", "shop", "1.0.0"))
        .revision(Some(4))
        .build(&file);
    assert!(host.set_semantic(FILE, Arc::new(lagging)));

    let err = host
        .analysis()
        .extract(&ExtractionRequest::new(FILE, whole(MAIN_TWO_PARAMS)))
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::StaleSemanticModel {
            semantic: Some(4),
            document: Some(5)
        }
    ));
    assert!(err.is_recoverable());
}

#[test]
fn test_span_outside_document_is_not_found() {
    let host = host_with(MAIN_TWO_PARAMS, 1);
    let request = ExtractionRequest::new(FILE, Span::from_coords(99, 0, 99, 1));
    let err = host.analysis().extract(&request).unwrap_err();
    assert!(matches!(err, ExtractError::NotFound { .. }));
}

#[test]
fn test_request_params_override_host_config() {
    let host = host_with(CALLS_AND_TYPES, 1);
    let params = RequestParams {
        anonymous_ids: Some(AnonymousIds::Random),
        ..RequestParams::default()
    };
    let request = ExtractionRequest::new(FILE, whole(CALLS_AND_TYPES)).with_params(params);
    let analysis = host.analysis();

    let random = analysis.extract(&request).unwrap();
    let again = analysis.extract(&request).unwrap();
    assert_ne!(random, again);
    assert_eq!(normalized_json(&random), normalized_json(&again));
}

#[test]
fn test_cache_follows_document_edits() {
    let host = host_with(MAIN_TWO_PARAMS, 1);
    let cache = ModelCache::new();
    let span = Span::from_coords(0, 0, 1, 0);
    let request = ExtractionRequest::new(FILE, span);

    let first = cache.get_or_extract(&host.analysis(), &request).unwrap();
    assert!(Arc::ptr_eq(
        &first,
        &cache.get_or_extract(&host.analysis(), &request).unwrap()
    ));

    host.set_file_content(FILE, "function main() {\n}\n", Some(2));
    let second = cache.get_or_extract(&host.analysis(), &request).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(second.entities[0].children.is_empty());
}

#[test]
fn test_response_json_envelope() {
    let host = host_with(SERVICE_UNINVOKED_CLIENT, 1);
    let response = host
        .analysis()
        .respond(&ExtractionRequest::new(FILE, whole(SERVICE_UNINVOKED_CLIENT)));
    let json: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();

    assert_eq!(json["partial"], false);
    assert!(json.get("error").is_none());
    assert_eq!(json["model"]["entities"][0]["id"], "acme:shop:billing");
}
