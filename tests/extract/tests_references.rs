//! Reference resolution across a file and against other packages.

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;
use modelgen::hir::{TypeKind, TypeSymbol};
use modelgen::model::{EntityDetail, RefKind, ReferenceTarget};
use modelgen::{ExtractorConfig, ModuleId, Span, extract_source};
use rstest::rstest;

#[test]
fn test_calls_from_nested_blocks_belong_to_the_function() {
    let model = extract_whole(CALLS_AND_TYPES);
    let main = find(&model, "main");
    let load = find(&model, "load");
    let audit = find(&model, "audit");
    let api = find(&model, "api");

    let calls: Vec<_> = model
        .outgoing(&main.id)
        .filter(|r| r.kind == RefKind::Calls)
        .filter_map(|r| r.target_entity().cloned())
        .collect();
    assert!(calls.contains(&load.id));
    assert!(calls.contains(&audit.id));
    assert!(calls.contains(&api.id));
}

#[test]
fn test_invoked_connection_has_no_dependency_edge() {
    let model = extract_whole(CALLS_AND_TYPES);
    let api = find(&model, "api");
    assert!(matches!(
        &api.detail,
        EntityDetail::Connection { invoked: true, type_name, .. } if type_name == "http:Client"
    ));
    assert!(!model.references.iter().any(|r| r.kind == RefKind::DependsOn));
}

#[test]
fn test_return_edges_local_and_external() {
    let model = extract_whole(CALLS_AND_TYPES);
    let order = find(&model, "Order");
    let load = find(&model, "load");
    let audit = find(&model, "audit");

    let returns_of = |id: &str| -> Vec<ReferenceTarget> {
        model
            .outgoing(id)
            .filter(|r| r.kind == RefKind::Returns)
            .map(|r| r.target.clone())
            .collect()
    };
    assert_eq!(returns_of(&load.id), vec![ReferenceTarget::Entity(order.id.clone())]);
    assert_eq!(
        returns_of(&audit.id),
        vec![ReferenceTarget::External(
            "ballerina/http:http:2.10.0:Response".to_string()
        )]
    );
}

#[test]
fn test_every_reference_carries_a_site() {
    let model = extract_whole(CALLS_AND_TYPES);
    assert!(!model.references.is_empty());
    for reference in &model.references {
        let span = reference.span.as_ref().expect("reference span");
        assert_eq!(&*span.file_path, FILE);
        assert!(model.entity(&reference.source).is_some());
    }
}

#[test]
fn test_cross_package_return_types() {
    let config = ExtractorConfig::for_package(ModuleId::new("acme", "shop", "1.0.0"));
    let model = extract_source(CROSS_PACKAGE, FILE, whole(CROSS_PACKAGE), &config).unwrap();
    let report = find(&model, "report");

    let EntityDetail::Function { returns, .. } = &report.detail else {
        panic!("expected function");
    };
    assert_eq!(
        returns,
        &vec![
            "acme/shop.util:util:1.0.0:Summary".to_string(),
            "partner/ledger:ledger::Entry".to_string(),
            "string".to_string(),
        ]
    );
}

// =============================================================================
// PACKAGE CLASSIFICATION
// =============================================================================

#[rstest]
#[case::same_package("acme", "shop", "1.0.0", "acme/shop:1.0.0:Order")]
#[case::other_version_still_local("acme", "shop", "2.0.0", "acme/shop:2.0.0:Order")]
#[case::submodule_is_external("acme", "shop.util", "1.0.0", "acme/shop.util:util:1.0.0:Order")]
#[case::other_org("partner", "shop", "1.0.0", "partner/shop:shop:1.0.0:Order")]
fn test_reference_entity_name(
    #[case] org: &str,
    #[case] name: &str,
    #[case] version: &str,
    #[case] expected: &str,
) {
    let module = ModuleId::new(org, name, version);
    let ty = TypeSymbol::Reference {
        name: "Order".into(),
        prefix: module.default_prefix(),
        module,
        kind: TypeKind::Record,
    };
    let current = ModuleId::new("acme", "shop", "1.0.0");
    assert_eq!(ty.reference_entity_name(&current), expected);
}

#[test]
fn test_narrow_span_keeps_external_edges() {
    // cursor on the name of `audit`: `Order` is outside the span, the
    // external return type is not
    let model = extract_source(
        CALLS_AND_TYPES,
        FILE,
        Span::from_coords(20, 10, 20, 10),
        &shop_config(),
    )
    .unwrap();
    assert_eq!(model.entities[0].label, "audit");
    assert!(model.references.iter().all(|r| r.target_entity().is_none()));
    assert!(model.references.iter().any(|r| r.kind == RefKind::Returns));
}
