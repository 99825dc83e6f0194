//! `@display { id: .., label: .. }` side channel and `@test:Config` groups.

use crate::config::{AnnotationPolicy, Leniency};
use crate::hir::{Diagnostic, DiagnosticCollector, codes};
use crate::model::DisplayAnnotation;
use crate::parser::{Annotation, AstNode, Expr, MappingField};

use super::SourceMap;

const DISPLAY: &str = "display";

/// Group of a test function that names none.
pub const DEFAULT_TEST_GROUP: &str = "DEFAULT_GROUP";

/// Read the display annotation among `annotations`.
///
/// A missing annotation or field yields an empty string. A field that is
/// present without a usable value does too; under [`Leniency::Strict`] it
/// additionally raises a warning when `diagnostics` is given.
pub fn read_display(
    annotations: impl IntoIterator<Item = Annotation>,
    policy: &AnnotationPolicy,
    source: &SourceMap<'_>,
    mut diagnostics: Option<&mut DiagnosticCollector>,
) -> DisplayAnnotation {
    let Some(body) = annotations
        .into_iter()
        .find(|a| a.is_unqualified(DISPLAY))
        .and_then(|a| a.body())
    else {
        return DisplayAnnotation::default();
    };

    let mut read = |key: &str| -> String {
        let Some(field) = body.field(key) else {
            return String::new();
        };
        match field_value(&field) {
            Some(value) => value,
            None => {
                if policy.for_field(key) == Leniency::Strict {
                    if let Some(diagnostics) = diagnostics.as_deref_mut() {
                        diagnostics.add(
                            Diagnostic::warning(format!(
                                "display annotation field `{key}` has no usable value"
                            ))
                            .with_span(source.span(field.syntax()))
                            .with_code(codes::MALFORMED_ANNOTATION_FIELD),
                        );
                    }
                }
                String::new()
            }
        }
    };

    let id = read("id");
    let label = read("label");
    DisplayAnnotation { id, label }
}

/// Literal value of `key: value`, quotes removed.
fn field_value(field: &MappingField) -> Option<String> {
    if !field.has_colon() {
        return None;
    }
    match field.value()? {
        Expr::Literal(literal) if !literal.is_nil() => Some(literal.value().trim().to_string()),
        _ => None,
    }
}

/// Whether `annotations` mark a test function.
pub fn is_test_config(annotations: impl IntoIterator<Item = Annotation>) -> bool {
    annotations.into_iter().any(|a| a.is("test", "Config"))
}

/// String literals listed under `groups` in `@test:Config`, or
/// [`DEFAULT_TEST_GROUP`] when there are none.
pub fn test_groups(annotations: impl IntoIterator<Item = Annotation>) -> Vec<String> {
    let mut groups: Vec<String> = annotations
        .into_iter()
        .filter(|a| a.is("test", "Config"))
        .filter_map(|a| a.body())
        .filter_map(|body| body.field("groups"))
        .filter_map(|field| field.value())
        .filter_map(|value| match value {
            Expr::List(list) => Some(list),
            _ => None,
        })
        .flat_map(|list| list.elements().collect::<Vec<_>>())
        .filter_map(|element| match element {
            Expr::Literal(literal) if literal.is_string() => Some(literal.value()),
            _ => None,
        })
        .collect();
    if groups.is_empty() {
        groups.push(DEFAULT_TEST_GROUP.to_string());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::LineIndex;
    use crate::parser::{Item, SourceFile, parse};

    fn display_of(source: &str, policy: AnnotationPolicy) -> (DisplayAnnotation, Vec<Diagnostic>) {
        let root = SourceFile::cast(parse(source).syntax()).unwrap();
        let index = LineIndex::new(source);
        let map = SourceMap::new("main.bal", &index);
        let Some(Item::Service(service)) = root.items().next() else {
            panic!("expected service");
        };
        let mut diagnostics = DiagnosticCollector::new();
        let display = read_display(service.annotations(), &policy, &map, Some(&mut diagnostics));
        (display, diagnostics.finish())
    }

    #[test]
    fn test_reads_id_and_label() {
        let (display, diagnostics) = display_of(
            "@display { label: \"Orders\", id: \"orders-1\" }\nservice /o on ep { }",
            AnnotationPolicy::default(),
        );
        assert_eq!(display.label, "Orders");
        assert_eq!(display.id, "orders-1");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_missing_value_is_lenient_by_default() {
        let (display, diagnostics) = display_of(
            "@display { label: }\nservice /o on ep { }",
            AnnotationPolicy::default(),
        );
        assert_eq!(display, DisplayAnnotation::default());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_strict_field_warns_but_keeps_going() {
        let (display, diagnostics) = display_of(
            "@display { label: , id: \"x\" }\nservice /o on ep { }",
            AnnotationPolicy {
                id: Leniency::Lenient,
                label: Leniency::Strict,
            },
        );
        assert_eq!(display.label, "");
        assert_eq!(display.id, "x");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_deref(), Some(codes::MALFORMED_ANNOTATION_FIELD));
    }

    #[test]
    fn test_other_annotations_are_ignored() {
        let (display, _) = display_of(
            "@http:ServiceConfig { label: \"nope\" }\nservice /o on ep { }",
            AnnotationPolicy::strict(),
        );
        assert!(display.is_empty());
    }

    fn function_annotations(source: &str) -> Vec<Annotation> {
        let root = SourceFile::cast(parse(source).syntax()).unwrap();
        let Some(Item::Function(function)) = root.items().next() else {
            panic!("expected function");
        };
        function.annotations().collect()
    }

    #[test]
    fn test_groups_are_read_from_test_config() {
        let annotations = function_annotations(
            "@test:Config { groups: [\"fast\", \"db\", 3], enable: true }\nfunction t() { }",
        );
        assert!(is_test_config(annotations.clone()));
        assert_eq!(test_groups(annotations), vec!["fast", "db"]);
    }

    #[test]
    fn test_groups_default_when_unspecified() {
        for source in [
            "@test:Config {}\nfunction t() { }",
            "@test:Config\nfunction t() { }",
            "@test:Config { groups: [] }\nfunction t() { }",
        ] {
            assert_eq!(test_groups(function_annotations(source)), vec![DEFAULT_TEST_GROUP]);
        }
        assert!(!is_test_config(function_annotations("@display {}\nfunction t() { }")));
    }
}
