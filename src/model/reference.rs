use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::SourceSpan;

/// Kind of a directed edge between entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefKind {
    Calls,
    DependsOn,
    Returns,
    TypedBy,
    SendsTo,
    ReceivesFrom,
    /// Service attached to a listener
    AttachedTo,
}

/// Where an edge points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceTarget {
    /// An entity in the same model
    Entity(SmolStr),
    /// A type or module outside the extracted scope, by its model name
    External(String),
}

/// A directed edge from an entity to another entity or an external target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub source: SmolStr,
    pub target: ReferenceTarget,
    pub kind: RefKind,
    /// Site the edge was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
}

impl Reference {
    pub fn to_entity(source: impl Into<SmolStr>, target: impl Into<SmolStr>, kind: RefKind) -> Self {
        Self {
            source: source.into(),
            target: ReferenceTarget::Entity(target.into()),
            kind,
            span: None,
        }
    }

    pub fn to_external(source: impl Into<SmolStr>, target: impl Into<String>, kind: RefKind) -> Self {
        Self {
            source: source.into(),
            target: ReferenceTarget::External(target.into()),
            kind,
            span: None,
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn target_entity(&self) -> Option<&SmolStr> {
        match &self.target {
            ReferenceTarget::Entity(id) => Some(id),
            ReferenceTarget::External(_) => None,
        }
    }
}
