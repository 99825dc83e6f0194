//! Resolved type symbols and referenced-type naming.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::module::ModuleId;

/// Kind of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Record,
    Class,
    ClientClass,
    Listener,
    Alias,
    Other,
}

/// A type descriptor after resolution against a semantic context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeSymbol {
    /// A named type defined in some module
    Reference {
        name: SmolStr,
        module: ModuleId,
        /// Module prefix used for external naming
        prefix: SmolStr,
        kind: TypeKind,
    },
    Union(Vec<TypeSymbol>),
    Array(Box<TypeSymbol>),
    /// `T?`, equivalent to `T|()`
    Optional(Box<TypeSymbol>),
    Nil,
    /// `int`, `string`, `json`, `map`, ...
    Builtin(SmolStr),
    /// Could not be resolved; holds the source text of the type expression
    Unresolved(String),
}

impl TypeSymbol {
    /// `{org}/{name}:{version}:{Name}` for named types, structural text otherwise.
    pub fn signature(&self) -> String {
        match self {
            TypeSymbol::Reference { name, module, .. } => {
                if module.version.is_empty() {
                    format!("{}/{}:{}", module.org, module.name, name)
                } else {
                    format!("{}/{}:{}:{}", module.org, module.name, module.version, name)
                }
            }
            TypeSymbol::Union(members) => members
                .iter()
                .map(TypeSymbol::signature)
                .collect::<Vec<_>>()
                .join("|"),
            TypeSymbol::Array(element) => format!("{}[]", element.signature()),
            TypeSymbol::Optional(inner) => format!("{}?", inner.signature()),
            TypeSymbol::Nil => "()".to_string(),
            TypeSymbol::Builtin(name) => name.to_string(),
            TypeSymbol::Unresolved(text) => text.clone(),
        }
    }

    /// Name under which a referenced type appears in the model.
    ///
    /// Types of the current package keep their signature. Types of any other
    /// package are qualified with the module prefix:
    /// `{org}/{name}:{prefix}:{version}:{Name}`.
    pub fn reference_entity_name(&self, current: &ModuleId) -> String {
        match self {
            TypeSymbol::Reference {
                name,
                module,
                prefix,
                ..
            } if !module.same_package(current) => {
                format!(
                    "{}/{}:{}:{}:{}",
                    module.org, module.name, prefix, module.version, name
                )
            }
            other => other.signature(),
        }
    }

    /// Names of every type this descriptor refers to, flattened.
    pub fn referenced_type_names(&self, current: &ModuleId) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(current, &mut names);
        names
    }

    fn collect_names(&self, current: &ModuleId, out: &mut Vec<String>) {
        match self {
            TypeSymbol::Reference { .. } => out.push(self.reference_entity_name(current)),
            TypeSymbol::Union(members) => {
                for member in members {
                    member.collect_names(current, out);
                }
            }
            TypeSymbol::Optional(inner) => {
                inner.collect_names(current, out);
                out.push("null".to_string());
            }
            TypeSymbol::Array(element) => match element.as_ref() {
                TypeSymbol::Reference { .. } => out.push(element.reference_entity_name(current)),
                _ => out.push(self.signature()),
            },
            TypeSymbol::Nil => out.push("null".to_string()),
            TypeSymbol::Builtin(name) => out.push(name.to_string()),
            TypeSymbol::Unresolved(text) => out.push(text.clone()),
        }
    }

    /// Every named type reachable through unions, optionals and arrays.
    pub fn references(&self) -> Vec<&TypeSymbol> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a TypeSymbol>) {
        match self {
            TypeSymbol::Reference { .. } => out.push(self),
            TypeSymbol::Union(members) => members.iter().for_each(|m| m.collect_references(out)),
            TypeSymbol::Array(inner) | TypeSymbol::Optional(inner) => inner.collect_references(out),
            TypeSymbol::Nil | TypeSymbol::Builtin(_) | TypeSymbol::Unresolved(_) => {}
        }
    }

    /// The client class this type denotes, looking through `T?` and `T|error`.
    pub fn client_class(&self) -> Option<&TypeSymbol> {
        match self {
            TypeSymbol::Reference {
                kind: TypeKind::ClientClass,
                ..
            } => Some(self),
            TypeSymbol::Optional(inner) => inner.client_class(),
            TypeSymbol::Union(members) => members.iter().find_map(TypeSymbol::client_class),
            _ => None,
        }
    }

    pub fn module(&self) -> Option<&ModuleId> {
        match self {
            TypeSymbol::Reference { module, .. } => Some(module),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, TypeSymbol::Unresolved(_))
    }
}
