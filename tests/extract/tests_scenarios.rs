//! Whole-file extraction scenarios.

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;
use modelgen::model::{EntityDetail, EntityKind, FunctionRole, ParamLocation, RefKind};

// =============================================================================
// SERVICES
// =============================================================================

#[test]
fn test_service_with_two_resources() {
    let model = extract_whole(SERVICE_TWO_RESOURCES);

    assert_eq!(model.entities.len(), 1);
    let service = &model.entities[0];
    assert_eq!(service.kind(), EntityKind::Service);
    assert_eq!(service.id, "acme:shop:orders");
    assert_eq!(service.label, "orders");

    let resources: Vec<_> = service
        .children
        .iter()
        .map(|child| match &child.detail {
            EntityDetail::Function {
                role: FunctionRole::Resource,
                accessor,
                resource_path,
                ..
            } => (accessor.as_deref(), resource_path.as_deref()),
            other => panic!("expected resource, got {other:?}"),
        })
        .collect();
    assert_eq!(resources, vec![(Some("get"), Some("items")), (Some("post"), Some("items"))]);

    assert!(model.references.is_empty());
    assert!(model.diagnostics.is_empty());
}

#[test]
fn test_resource_payload_parameter() {
    let model = extract_whole(SERVICE_TWO_RESOURCES);
    let order = find(&model, "order");
    assert!(matches!(
        &order.detail,
        EntityDetail::Parameter {
            location: Some(ParamLocation::Body),
            is_required: true,
            types,
        } if types == &vec!["json".to_string()]
    ));
}

#[test]
fn test_service_type_names_listener_module() {
    let model = extract_whole(SERVICE_TWO_RESOURCES);
    let EntityDetail::Service {
        base_path,
        service_type,
        ..
    } = &model.entities[0].detail
    else {
        panic!("expected service");
    };
    assert_eq!(base_path, "/orders");
    assert_eq!(service_type.as_deref(), Some("ballerina/http:2.10.0"));
}

#[test]
fn test_uninvoked_client_field_is_a_dependency() {
    let model = extract_whole(SERVICE_UNINVOKED_CLIENT);
    let service = &model.entities[0];
    let ledger = find(&model, "ledger");

    assert!(matches!(
        &ledger.detail,
        EntityDetail::Connection { invoked: false, .. }
    ));
    let edges: Vec<_> = model.outgoing(&service.id).collect();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, RefKind::DependsOn);
    assert_eq!(edges[0].target_entity(), Some(&ledger.id));
}

// =============================================================================
// FUNCTIONS
// =============================================================================

#[test]
fn test_entry_point_parameters() {
    let model = extract_whole(MAIN_TWO_PARAMS);
    let main = &model.entities[0];

    let EntityDetail::Function { role, returns, .. } = &main.detail else {
        panic!("expected function");
    };
    assert_eq!(*role, FunctionRole::EntryPoint);
    assert!(returns.is_empty());

    let params: Vec<_> = main
        .children
        .iter()
        .filter_map(|child| match &child.detail {
            EntityDetail::Parameter {
                is_required,
                location,
                ..
            } => Some((child.label.as_str(), *is_required, *location)),
            _ => None,
        })
        .collect();
    assert_eq!(params, vec![("region", true, None), ("retries", false, None)]);
}

// =============================================================================
// ANNOTATIONS
// =============================================================================

#[test]
fn test_malformed_display_annotation_falls_back() {
    let model = extract_whole(SERVICE_MALFORMED_DISPLAY);
    let service = &model.entities[0];

    let EntityDetail::Service { annotation, .. } = &service.detail else {
        panic!("expected service");
    };
    assert!(annotation.is_empty());
    assert_eq!(service.id, "acme:shop:catalog");
    assert_eq!(service.label, "catalog");
    assert!(model.diagnostics.is_empty());
}

#[test]
fn test_display_annotation_overrides_identity() {
    let source = "@display { label: \"Catalog API\", id: \"catalog-svc\" }\nservice /catalog on ep {\n}\n";
    let model = extract_whole(source);
    let service = &model.entities[0];
    assert_eq!(service.id, "catalog-svc");
    assert_eq!(service.label, "Catalog API");
}

#[test]
fn test_model_json_shape() {
    let model = extract_whole(SERVICE_UNINVOKED_CLIENT);
    let json: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();

    assert_eq!(json["schemaVersion"], model.schema_version.as_str());
    assert_eq!(json["entities"][0]["kind"], "service");
    assert_eq!(json["entities"][0]["basePath"], "/billing");
    assert_eq!(json["references"][0]["kind"], "depends-on");
    assert_eq!(json["entities"][0]["span"]["filePath"], FILE);
}

// =============================================================================
// LISTENERS AND TESTS
// =============================================================================

#[test]
fn test_declared_listener_is_attached_to_service() {
    let model = extract_whole(LISTENER_AND_TESTS);
    let listener = find(&model, "ep");
    let service = find(&model, "health");

    assert_eq!(
        listener.detail,
        EntityDetail::Listener {
            type_name: "http:Listener".to_string(),
            module: Some("ballerina/http:2.10.0".to_string()),
            args: vec!["9090".to_string()],
        }
    );
    let attached: Vec<_> = model
        .references
        .iter()
        .filter(|r| r.kind == RefKind::AttachedTo)
        .collect();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].source, service.id);
    assert_eq!(attached[0].target_entity(), Some(&listener.id));
    assert!(model.diagnostics.is_empty());
}

#[test]
fn test_test_functions_carry_groups() {
    let model = extract_whole(LISTENER_AND_TESTS);
    let groups_of = |label: &str| match &find(&model, label).detail {
        EntityDetail::Function {
            role: FunctionRole::Test,
            groups,
            ..
        } => groups.clone(),
        other => panic!("expected test function, got {other:?}"),
    };
    assert_eq!(groups_of("testPing"), vec!["smoke", "api"]);
    assert_eq!(groups_of("testDefaults"), vec!["DEFAULT_GROUP"]);

    let json = serde_json::to_value(find(&model, "testPing")).unwrap();
    assert_eq!(json["role"], "test");
    assert_eq!(json["groups"][0], "smoke");
}
