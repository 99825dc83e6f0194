//! Stable identities of services, functions and type definitions.
//!
//! Computed from the syntax tree alone so that an entity gets the same id
//! whether it is visited directly or reached as a reference target from a
//! narrower span.

use smol_str::SmolStr;

use crate::config::ExtractorConfig;
use crate::model::{DisplayAnnotation, EntityKind, FunctionRole, id};
use crate::parser::{AstNode, ClassDef, FunctionDef, ServiceDecl, SyntaxKind, WorkerDecl};

use super::SourceMap;
use super::annotation::{is_test_config, read_display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub id: SmolStr,
    pub label: String,
    /// Path as written, `/` when absent
    pub base_path: String,
    pub display: DisplayAnnotation,
}

/// Id and label of a service, numbering repeated paths in document order.
pub fn service_identity(
    decl: &ServiceDecl,
    source: &SourceMap<'_>,
    config: &ExtractorConfig,
) -> ServiceIdentity {
    let raw_path = decl.path().map(|p| p.text()).unwrap_or_default();
    let key = id::service_path_key(&raw_path);
    let occurrence = decl
        .syntax()
        .parent()
        .map(|root| {
            root.children()
                .filter(|n| n.text_range().start() <= decl.syntax().text_range().start())
                .filter_map(ServiceDecl::cast)
                .filter(|s| id::service_path_key(&s.path().map(|p| p.text()).unwrap_or_default()) == key)
                .count()
        })
        .unwrap_or(1)
        .max(1);

    let display = read_display(decl.annotations(), &config.annotations, source, None);
    let package = &config.package;

    let id = if display.id.is_empty() {
        id::service_id(&package.org, &package.name, &raw_path, occurrence)
    } else {
        SmolStr::new(&display.id)
    };

    let suffix = if occurrence > 1 {
        occurrence.to_string()
    } else {
        String::new()
    };
    let label = if !display.label.is_empty() && uuid::Uuid::parse_str(&display.label).is_err() {
        display.label.clone()
    } else {
        let trimmed = raw_path.trim().trim_start_matches('/').trim();
        if trimmed.is_empty() {
            format!("{} Component{}", package.name, suffix)
        } else {
            format!("{trimmed}{suffix}")
        }
    };

    ServiceIdentity {
        id,
        label,
        base_path: if raw_path.is_empty() {
            "/".to_string()
        } else {
            raw_path
        },
        display,
    }
}

/// Owner of a function definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Module,
    Service(SmolStr),
    Class(SmolStr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionIdentity {
    pub id: SmolStr,
    pub label: String,
    pub role: FunctionRole,
    pub accessor: Option<String>,
    pub resource_path: Option<String>,
}

/// Owner of `func`, computed from its ancestors.
pub fn owner_of(func: &FunctionDef, source: &SourceMap<'_>, config: &ExtractorConfig) -> Owner {
    let Some(owner) = func
        .syntax()
        .parent()
        .filter(|p| p.kind() == SyntaxKind::OBJECT_BODY)
        .and_then(|body| body.parent())
    else {
        return Owner::Module;
    };
    if let Some(service) = ServiceDecl::cast(owner.clone()) {
        return Owner::Service(service_identity(&service, source, config).id);
    }
    match ClassDef::cast(owner) {
        Some(class) => Owner::Class(class_id(&class, source)),
        None => Owner::Module,
    }
}

/// Identity of a function, `None` for nameless functions and for plain
/// methods of services, which are not extracted.
pub fn function_identity(
    func: &FunctionDef,
    owner: &Owner,
    source: &SourceMap<'_>,
) -> Option<FunctionIdentity> {
    let name = func.name()?.text()?;
    let content = || id::content_id(EntityKind::Function, &source.span(func.syntax()), &name);

    let identity = match owner {
        Owner::Module => FunctionIdentity {
            id: content(),
            role: if is_test_config(func.annotations()) {
                FunctionRole::Test
            } else if name == "main" {
                FunctionRole::EntryPoint
            } else {
                FunctionRole::Module
            },
            label: name,
            accessor: None,
            resource_path: None,
        },
        Owner::Service(parent) | Owner::Class(parent) if func.is_resource() => {
            let path = func
                .resource_path()
                .map(|p| p.text())
                .unwrap_or_else(|| ".".to_string());
            FunctionIdentity {
                id: id::resource_id(parent, &path, &name),
                label: format!("{name} {path}"),
                role: FunctionRole::Resource,
                accessor: Some(name),
                resource_path: Some(path),
            }
        }
        Owner::Service(parent) | Owner::Class(parent) if func.is_remote() => FunctionIdentity {
            id: id::remote_id(parent, &name),
            role: FunctionRole::Remote,
            label: name,
            accessor: None,
            resource_path: None,
        },
        Owner::Service(_) => return None,
        Owner::Class(_) => FunctionIdentity {
            id: content(),
            role: FunctionRole::Method,
            label: name,
            accessor: None,
            resource_path: None,
        },
    };
    Some(identity)
}

pub fn class_id(class: &ClassDef, source: &SourceMap<'_>) -> SmolStr {
    let name = class.name().and_then(|n| n.text()).unwrap_or_default();
    id::content_id(EntityKind::TypeDefinition, &source.span(class.syntax()), &name)
}

pub fn worker_id(worker: &WorkerDecl, source: &SourceMap<'_>) -> Option<SmolStr> {
    let name = worker.name()?.text()?;
    Some(id::content_id(
        EntityKind::Function,
        &source.span(worker.syntax()),
        &name,
    ))
}

/// Id of the function or worker whose body contains `node`.
pub fn enclosing_function_id(
    node: &crate::parser::SyntaxNode,
    source: &SourceMap<'_>,
    config: &ExtractorConfig,
) -> Option<SmolStr> {
    for ancestor in node.ancestors() {
        if let Some(worker) = WorkerDecl::cast(ancestor.clone()) {
            return worker_id(&worker, source);
        }
        if let Some(func) = FunctionDef::cast(ancestor) {
            let owner = owner_of(&func, source, config);
            return function_identity(&func, &owner, source).map(|i| i.id);
        }
    }
    None
}
