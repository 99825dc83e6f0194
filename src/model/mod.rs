//! Entity graph produced by one extraction pass.
//!
//! The [`Model`] is the root aggregate: ordered top-level [`Entity`] trees,
//! the [`Reference`] edges between them, an adjacency index keyed by source
//! entity, the diagnostics of the pass and a schema version tag. It is built
//! once by the assembler and never mutated afterwards.

mod entity;
pub mod id;
mod reference;

pub use entity::{
    Construct, DisplayAnnotation, Entity, EntityDetail, EntityKind, EntityWalk, FunctionRole,
    ParamLocation, TypeDefKind,
};
pub use id::AnonymousIds;
pub use reference::{RefKind, Reference, ReferenceTarget};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::hir::Diagnostic;

/// Schema version stamped on models unless configured otherwise.
pub const SCHEMA_VERSION: &str = "0.4.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub schema_version: SmolStr,
    pub entities: Vec<Entity>,
    pub references: Vec<Reference>,
    /// Source entity id → indices into `references`
    pub adjacency: IndexMap<SmolStr, Vec<usize>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Model {
    /// Build a model from already de-duplicated parts.
    pub(crate) fn new(
        schema_version: SmolStr,
        entities: Vec<Entity>,
        references: Vec<Reference>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let mut adjacency: IndexMap<SmolStr, Vec<usize>> = IndexMap::new();
        for (index, reference) in references.iter().enumerate() {
            adjacency
                .entry(reference.source.clone())
                .or_default()
                .push(index);
        }
        Self {
            schema_version,
            entities,
            references,
            adjacency,
            diagnostics,
        }
    }

    /// A model with no entities, only diagnostics.
    pub fn empty(schema_version: impl Into<SmolStr>, diagnostics: Vec<Diagnostic>) -> Self {
        Self::new(schema_version.into(), Vec::new(), Vec::new(), diagnostics)
    }

    /// Every entity, depth first in document order.
    pub fn walk(&self) -> EntityWalk<'_> {
        EntityWalk::over(&self.entities)
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.walk().find(|e| e.id == id)
    }

    /// Outgoing edges of `id`.
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &Reference> {
        self.adjacency
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.references.get(index))
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
