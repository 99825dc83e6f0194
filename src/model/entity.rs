use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::SourceSpan;

/// Kind tag of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Service,
    Function,
    Parameter,
    Connection,
    Listener,
    TypeDefinition,
    Field,
    ControlFlow,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Service => "service",
            EntityKind::Function => "function",
            EntityKind::Parameter => "parameter",
            EntityKind::Connection => "connection",
            EntityKind::Listener => "listener",
            EntityKind::TypeDefinition => "typeDefinition",
            EntityKind::Field => "field",
            EntityKind::ControlFlow => "controlFlow",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `id`/`label` pair read from a `@display` annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayAnnotation {
    pub id: String,
    pub label: String,
}

impl DisplayAnnotation {
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.label.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FunctionRole {
    EntryPoint,
    Module,
    Resource,
    Remote,
    Worker,
    Method,
    /// Module function carrying `@test:Config`
    Test,
}

/// Where a resource parameter is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    Path,
    Query,
    Body,
    Header,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeDefKind {
    Record,
    Class,
    ClientClass,
    Alias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Construct {
    If,
    Else,
    While,
    Foreach,
    Lock,
    Fork,
}

/// Kind-specific payload. Serialized inline with a `kind` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EntityDetail {
    Service {
        base_path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        service_type: Option<String>,
        #[serde(default)]
        annotation: DisplayAnnotation,
    },
    Function {
        role: FunctionRole,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accessor: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resource_path: Option<String>,
        #[serde(default)]
        returns: Vec<String>,
        /// Test groups, for [`FunctionRole::Test`] only
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        groups: Vec<String>,
    },
    Parameter {
        types: Vec<String>,
        is_required: bool,
        #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
        location: Option<ParamLocation>,
    },
    Connection {
        type_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        module: Option<String>,
        invoked: bool,
    },
    /// A module-level `listener` declaration
    Listener {
        type_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        module: Option<String>,
        /// Constructor arguments as written
        #[serde(default)]
        args: Vec<String>,
    },
    TypeDefinition {
        type_kind: TypeDefKind,
    },
    Field {
        types: Vec<String>,
        is_optional: bool,
    },
    ControlFlow {
        construct: Construct,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<String>,
    },
}

impl EntityDetail {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityDetail::Service { .. } => EntityKind::Service,
            EntityDetail::Function { .. } => EntityKind::Function,
            EntityDetail::Parameter { .. } => EntityKind::Parameter,
            EntityDetail::Connection { .. } => EntityKind::Connection,
            EntityDetail::Listener { .. } => EntityKind::Listener,
            EntityDetail::TypeDefinition { .. } => EntityKind::TypeDefinition,
            EntityDetail::Field { .. } => EntityKind::Field,
            EntityDetail::ControlFlow { .. } => EntityKind::ControlFlow,
        }
    }
}

/// A named, positioned fact extracted from source code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: SmolStr,
    pub label: String,
    pub span: SourceSpan,
    #[serde(flatten)]
    pub detail: EntityDetail,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Entity>,
}

impl Entity {
    pub fn new(
        id: impl Into<SmolStr>,
        label: impl Into<String>,
        span: SourceSpan,
        detail: EntityDetail,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            span,
            detail,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Entity>) -> Self {
        self.children = children;
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.detail.kind()
    }

    /// This entity and all of its descendants, depth first.
    pub fn walk(&self) -> EntityWalk<'_> {
        EntityWalk { stack: vec![self] }
    }
}

/// Depth-first iterator over an entity tree.
pub struct EntityWalk<'a> {
    stack: Vec<&'a Entity>,
}

impl<'a> EntityWalk<'a> {
    pub(crate) fn over(roots: &'a [Entity]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for EntityWalk<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<Self::Item> {
        let entity = self.stack.pop()?;
        self.stack.extend(entity.children.iter().rev());
        Some(entity)
    }
}
