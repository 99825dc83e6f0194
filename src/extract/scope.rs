//! Lexical lookup of client declarations behind action receivers.

use smol_str::SmolStr;

use crate::config::ExtractorConfig;
use crate::hir::{SemanticContext, TypeSymbol};
use crate::model::{EntityKind, id};
use crate::parser::{
    Annotation, AstNode, Block, Expr, FunctionDef, ModuleVarDecl, ObjectField, Param,
    SyntaxKind, SyntaxNode, TypeDesc, VarDecl,
};

use super::SourceMap;
use super::annotation::read_display;

/// A variable that may hold a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Local(VarDecl),
    Param(Param),
    Field(ObjectField),
    Module(ModuleVarDecl),
}

impl Declaration {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::VAR_DECL => VarDecl::cast(node).map(Declaration::Local),
            SyntaxKind::PARAM => Param::cast(node).map(Declaration::Param),
            SyntaxKind::OBJECT_FIELD => ObjectField::cast(node).map(Declaration::Field),
            SyntaxKind::MODULE_VAR_DECL => ModuleVarDecl::cast(node).map(Declaration::Module),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Declaration::Local(d) => d.syntax(),
            Declaration::Param(d) => d.syntax(),
            Declaration::Field(d) => d.syntax(),
            Declaration::Module(d) => d.syntax(),
        }
    }

    pub fn name(&self) -> Option<String> {
        match self {
            Declaration::Local(d) => d.name(),
            Declaration::Param(d) => d.name(),
            Declaration::Field(d) => d.name(),
            Declaration::Module(d) => d.name(),
        }
        .and_then(|n| n.text())
    }

    pub fn type_desc(&self) -> Option<TypeDesc> {
        match self {
            Declaration::Local(d) => d.type_desc(),
            Declaration::Param(d) => d.type_desc(),
            Declaration::Field(d) => d.type_desc(),
            Declaration::Module(d) => d.type_desc(),
        }
    }

    pub fn initializer(&self) -> Option<Expr> {
        match self {
            Declaration::Local(d) => d.initializer(),
            Declaration::Param(d) => d.default_value(),
            Declaration::Field(d) => d.initializer(),
            Declaration::Module(d) => d.initializer(),
        }
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        match self {
            Declaration::Local(d) => d.annotations().collect(),
            Declaration::Param(d) => d.annotations().collect(),
            Declaration::Field(d) => d.annotations().collect(),
            Declaration::Module(d) => d.annotations().collect(),
        }
    }

    /// Declared type, or the type of the initializer for `var`.
    pub fn resolved_type(&self, semantic: &dyn SemanticContext) -> Option<TypeSymbol> {
        let declared = self
            .type_desc()
            .map(|ty| semantic.resolve_type(&ty))
            .filter(TypeSymbol::is_resolved);
        declared.or_else(|| self.initializer().and_then(|init| semantic.type_of_expr(&init)))
    }

    /// The client class this declaration holds, if any.
    pub fn client_type(&self, semantic: &dyn SemanticContext) -> Option<TypeSymbol> {
        self.resolved_type(semantic)
            .and_then(|ty| ty.client_class().cloned())
    }

    /// Id of the connection entity: the display id, or a content address.
    /// A parameter has no connection of its own; actions on it target the
    /// parameter entity.
    pub fn entity_id(&self, source: &SourceMap<'_>, config: &ExtractorConfig) -> SmolStr {
        if let Declaration::Param(_) = self {
            return id::content_id(
                EntityKind::Parameter,
                &source.span(self.syntax()),
                &self.name().unwrap_or_default(),
            );
        }
        let display = read_display(self.annotations(), &config.annotations, source, None);
        if !display.id.is_empty() {
            return SmolStr::new(display.id);
        }
        id::content_id(
            EntityKind::Connection,
            &source.span(self.syntax()),
            &self.name().unwrap_or_default(),
        )
    }
}

/// Declaration a client action's receiver refers to.
///
/// `name` looks through enclosing blocks (earlier statements only), then
/// the enclosing function's parameters, then module variables; `self.name` looks at the fields of the enclosing
/// service or class.
pub fn receiver_declaration(receiver: &Expr) -> Option<Declaration> {
    match receiver.clone().unwrap_transparent() {
        Expr::NameRef(name_ref) if !name_ref.is_self() && name_ref.prefix().is_none() => {
            let name = name_ref.name()?;
            lookup_variable(name_ref.syntax(), &name)
        }
        Expr::FieldAccess(access) => {
            let is_self = matches!(access.receiver(), Some(Expr::NameRef(r)) if r.is_self());
            if !is_self {
                return None;
            }
            let name = access.field()?.text()?;
            lookup_field(access.syntax(), &name)
        }
        _ => None,
    }
}

fn lookup_variable(from: &SyntaxNode, name: &str) -> Option<Declaration> {
    let offset = from.text_range().start();
    for ancestor in from.ancestors() {
        match ancestor.kind() {
            SyntaxKind::BLOCK => {
                let found = Block::cast(ancestor.clone())?
                    .syntax()
                    .children()
                    .filter(|n| n.kind() == SyntaxKind::VAR_DECL)
                    .filter(|n| n.text_range().end() <= offset)
                    .filter_map(VarDecl::cast)
                    .filter(|d| d.name().and_then(|n| n.text()).as_deref() == Some(name))
                    .last();
                if let Some(decl) = found {
                    return Some(Declaration::Local(decl));
                }
            }
            SyntaxKind::FUNCTION_DEF => {
                let found = FunctionDef::cast(ancestor.clone())?
                    .params()
                    .into_iter()
                    .find(|p| p.name().and_then(|n| n.text()).as_deref() == Some(name));
                if let Some(param) = found {
                    return Some(Declaration::Param(param));
                }
            }
            SyntaxKind::SOURCE_FILE => {
                return ancestor
                    .children()
                    .filter_map(ModuleVarDecl::cast)
                    .find(|d| d.name().and_then(|n| n.text()).as_deref() == Some(name))
                    .map(Declaration::Module);
            }
            _ => {}
        }
    }
    None
}

fn lookup_field(from: &SyntaxNode, name: &str) -> Option<Declaration> {
    from.ancestors()
        .find(|n| n.kind() == SyntaxKind::OBJECT_BODY)?
        .children()
        .filter_map(ObjectField::cast)
        .find(|f| f.name().and_then(|n| n.text()).as_deref() == Some(name))
        .map(Declaration::Field)
}

/// Whether any remote method call or client resource access uses `decl` as
/// its receiver, searched within the declaring function, service or file.
pub fn has_invocation_references(decl: &Declaration) -> bool {
    let boundary = match decl {
        Declaration::Local(_) | Declaration::Param(_) => {
            &[SyntaxKind::FUNCTION_DEF, SyntaxKind::SOURCE_FILE][..]
        }
        Declaration::Field(_) => &[
            SyntaxKind::SERVICE_DECL,
            SyntaxKind::CLASS_DEF,
            SyntaxKind::SOURCE_FILE,
        ][..],
        Declaration::Module(_) => &[SyntaxKind::SOURCE_FILE][..],
    };
    let Some(scope) = decl
        .syntax()
        .ancestors()
        .find(|n| boundary.contains(&n.kind()))
    else {
        return false;
    };

    scope
        .descendants()
        .filter_map(|node| action_receiver(&node))
        .any(|receiver| receiver_declaration(&receiver).as_ref() == Some(decl))
}

/// Receiver of a remote method call or client resource access.
pub fn action_receiver(node: &SyntaxNode) -> Option<Expr> {
    match Expr::cast(node.clone())? {
        Expr::RemoteCall(call) => call.receiver(),
        Expr::ResourceAccess(access) => access.receiver(),
        _ => None,
    }
}
