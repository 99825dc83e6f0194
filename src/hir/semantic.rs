//! Semantic context: symbol lookup and type resolution for one file.
//!
//! The extractor only talks to [`SemanticContext`]. A host with a real
//! compiler front end can implement the trait over its own semantic model;
//! [`SemanticModel`] is the built-in implementation, derived from the parsed
//! file plus descriptors of the modules it imports.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use text_size::TextRange;

use super::module::{ModuleDescriptor, ModuleId};
use super::types::{TypeKind, TypeSymbol};
use crate::parser::{AstNode, Expr, Item, SourceFile, TypeDesc, TypeRef};

/// Builtin type names that never resolve to a module.
const BUILTIN_TYPES: &[&str] = &[
    "any", "anydata", "boolean", "byte", "decimal", "error", "float", "function", "future",
    "handle", "int", "json", "map", "never", "object", "readonly", "record", "stream", "string",
    "table", "typedesc", "xml",
];

/// Kind of a module-level symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Type(TypeKind),
    Variable,
    Listener,
}

/// A module-level declaration visible to the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    pub kind: SymbolKind,
    /// Range of the declaring node
    pub range: TextRange,
    /// Declared or inferred type of variables and listeners
    pub ty: Option<TypeSymbol>,
}

/// Symbol resolution as seen by the extractor.
pub trait SemanticContext: Send + Sync {
    /// Identity of the package being analyzed.
    fn current_module(&self) -> &ModuleId;

    /// Document version this context was computed from, if known.
    fn revision(&self) -> Option<i32>;

    /// Resolve a type descriptor. Never fails: unknown types come back as
    /// [`TypeSymbol::Unresolved`] carrying the source text.
    fn resolve_type(&self, ty: &TypeDesc) -> TypeSymbol;

    /// Module-level symbol by unqualified name.
    fn symbol(&self, name: &str) -> Option<&Symbol>;

    /// Module imported under `prefix`.
    fn module_for_prefix(&self, prefix: &str) -> Option<&ModuleId>;

    /// Type of an initializer expression, where it can be told syntactically.
    fn type_of_expr(&self, expr: &Expr) -> Option<TypeSymbol> {
        match expr.clone().unwrap_transparent() {
            Expr::New(new_expr) => new_expr
                .type_ref()
                .map(|ty| self.resolve_type(&TypeDesc::Ref(ty))),
            Expr::NameRef(name_ref) if name_ref.prefix().is_none() => name_ref
                .name()
                .and_then(|name| self.symbol(&name))
                .and_then(|symbol| symbol.ty.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct ImportedModule {
    id: ModuleId,
    /// Prefix used when naming this module's types
    module_prefix: SmolStr,
    descriptor: Option<ModuleDescriptor>,
}

/// Built-in semantic context over a single parsed file.
#[derive(Debug, Clone)]
pub struct SemanticModel {
    module: ModuleId,
    revision: Option<i32>,
    imports: FxHashMap<SmolStr, ImportedModule>,
    symbols: FxHashMap<SmolStr, Symbol>,
    assume_clients_by_name: bool,
}

impl SemanticModel {
    /// Build the model for `file`, which belongs to `module`.
    pub fn build(file: &SourceFile, module: ModuleId, known: &[ModuleDescriptor]) -> Self {
        Self::builder(module).known_modules(known).build(file)
    }

    pub fn builder(module: ModuleId) -> SemanticModelBuilder {
        SemanticModelBuilder {
            module,
            known: Vec::new(),
            revision: None,
            assume_clients_by_name: true,
        }
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    fn resolve_ref(&self, ty: &TypeRef) -> TypeSymbol {
        let fallback = || TypeSymbol::Unresolved(ty.source_text());
        if ty.is_var() {
            return fallback();
        }
        let Some(qualified) = ty.qualified_name() else {
            return fallback();
        };
        let name = SmolStr::new(qualified.name());

        if let Some(prefix) = qualified.prefix() {
            let Some(imported) = self.imports.get(prefix.as_str()) else {
                return fallback();
            };
            let kind = imported
                .descriptor
                .as_ref()
                .and_then(|d| d.kind_of(&name))
                .unwrap_or_else(|| self.guess_kind(&name));
            return TypeSymbol::Reference {
                name,
                module: imported.id.clone(),
                prefix: imported.module_prefix.clone(),
                kind,
            };
        }

        if let Some(Symbol {
            kind: SymbolKind::Type(kind),
            ..
        }) = self.symbols.get(&name)
        {
            return TypeSymbol::Reference {
                name,
                prefix: self.module.default_prefix(),
                module: self.module.clone(),
                kind: *kind,
            };
        }
        if BUILTIN_TYPES.contains(&name.as_str()) {
            return TypeSymbol::Builtin(name);
        }
        fallback()
    }

    /// Kind of a type from a module with no descriptor.
    fn guess_kind(&self, name: &str) -> TypeKind {
        if self.assume_clients_by_name && name.ends_with("Client") {
            TypeKind::ClientClass
        } else if self.assume_clients_by_name && name.ends_with("Listener") {
            TypeKind::Listener
        } else {
            TypeKind::Other
        }
    }
}

impl SemanticContext for SemanticModel {
    fn current_module(&self) -> &ModuleId {
        &self.module
    }

    fn revision(&self) -> Option<i32> {
        self.revision
    }

    fn resolve_type(&self, ty: &TypeDesc) -> TypeSymbol {
        match ty {
            TypeDesc::Ref(ty) => self.resolve_ref(ty),
            TypeDesc::Union(union) => {
                TypeSymbol::Union(union.members().map(|m| self.resolve_type(&m)).collect())
            }
            TypeDesc::Array(array) => TypeSymbol::Array(Box::new(
                array
                    .element()
                    .map(|e| self.resolve_type(&e))
                    .unwrap_or_else(|| TypeSymbol::Unresolved(array.source_text())),
            )),
            TypeDesc::Optional(optional) => TypeSymbol::Optional(Box::new(
                optional
                    .inner()
                    .map(|i| self.resolve_type(&i))
                    .unwrap_or_else(|| TypeSymbol::Unresolved(optional.source_text())),
            )),
            TypeDesc::Paren(paren) => paren
                .inner()
                .map(|i| self.resolve_type(&i))
                .unwrap_or_else(|| TypeSymbol::Unresolved(paren.source_text())),
            TypeDesc::Nil(_) => TypeSymbol::Nil,
            TypeDesc::Record(_) => TypeSymbol::Builtin("record".into()),
        }
    }

    fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    fn module_for_prefix(&self, prefix: &str) -> Option<&ModuleId> {
        self.imports.get(prefix).map(|m| &m.id)
    }
}

/// Options for [`SemanticModel`] construction.
#[derive(Debug, Clone)]
pub struct SemanticModelBuilder {
    module: ModuleId,
    known: Vec<ModuleDescriptor>,
    revision: Option<i32>,
    assume_clients_by_name: bool,
}

impl SemanticModelBuilder {
    pub fn known_modules(mut self, known: &[ModuleDescriptor]) -> Self {
        self.known.extend_from_slice(known);
        self
    }

    pub fn revision(mut self, revision: Option<i32>) -> Self {
        self.revision = revision;
        self
    }

    /// Treat `*Client` / `*Listener` types of undescribed modules as client
    /// classes and listeners.
    pub fn assume_clients_by_name(mut self, enabled: bool) -> Self {
        self.assume_clients_by_name = enabled;
        self
    }

    pub fn build(self, file: &SourceFile) -> SemanticModel {
        let mut model = SemanticModel {
            module: self.module,
            revision: self.revision,
            imports: FxHashMap::default(),
            symbols: FxHashMap::default(),
            assume_clients_by_name: self.assume_clients_by_name,
        };

        for import in file.imports() {
            let (Some(module_name), Some(prefix)) = (import.module_name(), import.prefix()) else {
                continue;
            };
            let org = module_name
                .org()
                .map(SmolStr::new)
                .unwrap_or_else(|| model.module.org.clone());
            let name = SmolStr::new(module_name.name());
            let descriptor = self
                .known
                .iter()
                .find(|d| d.org == org && d.name == name)
                .cloned();
            let id = match &descriptor {
                Some(d) => d.id(),
                None if org == model.module.org
                    && name.starts_with(&format!("{}.", model.module.name)) =>
                {
                    ModuleId::new(org, name, model.module.version.clone())
                }
                None => ModuleId::new(org, name, ""),
            };
            let module_prefix = descriptor
                .as_ref()
                .map(ModuleDescriptor::prefix)
                .unwrap_or_else(|| id.default_prefix());
            model.imports.insert(
                SmolStr::new(prefix),
                ImportedModule {
                    id,
                    module_prefix,
                    descriptor,
                },
            );
        }

        // Types first so declarations below can refer to them in any order.
        for item in file.items() {
            let (name, kind) = match &item {
                Item::TypeDef(def) => {
                    let kind = match def.type_desc() {
                        Some(TypeDesc::Record(_)) => TypeKind::Record,
                        _ => TypeKind::Alias,
                    };
                    (def.name(), SymbolKind::Type(kind))
                }
                Item::Class(class) => {
                    let kind = if class.is_client() {
                        TypeKind::ClientClass
                    } else {
                        TypeKind::Class
                    };
                    (class.name(), SymbolKind::Type(kind))
                }
                Item::Function(function) => (function.name(), SymbolKind::Function),
                _ => continue,
            };
            let Some(name) = name.and_then(|n| n.text()) else {
                continue;
            };
            model.insert(name, kind, item.syntax().text_range(), None);
        }

        for item in file.items() {
            let (name, kind, declared, initializer) = match &item {
                Item::ModuleVar(var) => (
                    var.name(),
                    SymbolKind::Variable,
                    var.type_desc(),
                    var.initializer(),
                ),
                Item::Listener(listener) => (
                    listener.name(),
                    SymbolKind::Listener,
                    listener.type_desc(),
                    listener.initializer(),
                ),
                _ => continue,
            };
            let Some(name) = name.and_then(|n| n.text()) else {
                continue;
            };
            let ty = declared
                .map(|d| model.resolve_type(&d))
                .filter(TypeSymbol::is_resolved)
                .or_else(|| initializer.and_then(|init| model.type_of_expr(&init)));
            model.insert(name, kind, item.syntax().text_range(), ty);
        }

        tracing::debug!(
            module = %model.module,
            imports = model.imports.len(),
            symbols = model.symbols.len(),
            "built semantic model"
        );
        model
    }
}

impl SemanticModel {
    fn insert(&mut self, name: String, kind: SymbolKind, range: TextRange, ty: Option<TypeSymbol>) {
        let name = SmolStr::new(name);
        self.symbols.insert(
            name.clone(),
            Symbol {
                name,
                kind,
                range,
                ty,
            },
        );
    }
}
