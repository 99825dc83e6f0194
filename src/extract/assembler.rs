//! Model assembler: enforce id uniqueness and edge integrity.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::SourceSpan;
use crate::hir::{Diagnostic, RelatedInfo, codes};
use crate::model::{Entity, Model, Reference, ReferenceTarget};

/// Build the final model.
///
/// Siblings sharing an id collapse into the last one, kept at the first
/// one's position. An entity reusing an id already taken elsewhere in the
/// tree is dropped, along with its subtree, and reported as a warning.
/// References whose source or entity target is not in the model are
/// dropped, as are repeated `(source, target, kind)` triples.
pub fn assemble(
    schema_version: SmolStr,
    entities: Vec<Entity>,
    references: Vec<Reference>,
    mut diagnostics: Vec<Diagnostic>,
) -> Model {
    let mut seen: FxHashMap<SmolStr, SourceSpan> = FxHashMap::default();
    let top = dedupe_siblings(entities);
    for entity in &top {
        seen.insert(entity.id.clone(), entity.span.clone());
    }
    let entities: Vec<Entity> = top
        .into_iter()
        .map(|mut entity| {
            entity.children = prune(entity.children, &mut seen, &mut diagnostics);
            entity
        })
        .collect();

    let before = references.len();
    let references: Vec<Reference> = references
        .into_iter()
        .filter(|r| seen.contains_key(&r.source))
        .filter(|r| match &r.target {
            ReferenceTarget::Entity(target) => seen.contains_key(target),
            ReferenceTarget::External(_) => true,
        })
        .collect::<Vec<_>>();
    let mut triples = IndexSet::new();
    let references: Vec<Reference> = references
        .into_iter()
        .filter(|r| triples.insert((r.source.clone(), r.target.clone(), r.kind)))
        .collect();
    if references.len() < before {
        tracing::debug!(
            dropped = before - references.len(),
            "dropped dangling or repeated references"
        );
    }

    Model::new(schema_version, entities, references, diagnostics)
}

fn dedupe_siblings(entities: Vec<Entity>) -> Vec<Entity> {
    let mut by_id: IndexMap<SmolStr, Entity> = IndexMap::with_capacity(entities.len());
    for entity in entities {
        if let Some(previous) = by_id.insert(entity.id.clone(), entity) {
            tracing::trace!(id = %previous.id, "sibling replaced by a later one with the same id");
        }
    }
    by_id.into_values().collect()
}

fn prune(
    children: Vec<Entity>,
    seen: &mut FxHashMap<SmolStr, SourceSpan>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Entity> {
    let mut kept = Vec::new();
    for mut child in dedupe_siblings(children) {
        if let Some(first) = seen.get(&child.id) {
            tracing::warn!(id = %child.id, "duplicate entity id dropped");
            diagnostics.push(
                Diagnostic::warning(format!("duplicate entity id `{}` dropped", child.id))
                    .with_span(child.span.clone())
                    .with_code(codes::DUPLICATE_ENTITY)
                    .with_related(RelatedInfo {
                        span: first.clone(),
                        message: "first defined here".to_string(),
                    }),
            );
            continue;
        }
        seen.insert(child.id.clone(), child.span.clone());
        child.children = prune(std::mem::take(&mut child.children), seen, diagnostics);
        kept.push(child);
    }
    kept
}
