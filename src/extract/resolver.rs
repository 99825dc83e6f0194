//! Reference resolver: reference sites → edges.
//!
//! Targets that cannot be resolved are omitted without a diagnostic.

use smol_str::SmolStr;

use crate::config::ExtractorConfig;
use crate::hir::{SemanticContext, SymbolKind, TypeSymbol};
use crate::model::{EntityKind, RefKind, Reference, id};
use crate::parser::{
    AstNode, CallExpr, Expr, FunctionDef, MethodCall, Name, ReceiveAction, SendAction, SyntaxKind,
    SyntaxNode, WorkerDecl,
};

use super::SourceMap;
use super::identity;
use super::scope::{action_receiver, receiver_declaration};
use super::visitor::{ReferenceSite, SiteKind};

/// Resolve every site, in order.
pub fn resolve(
    sites: &[ReferenceSite],
    semantic: &dyn SemanticContext,
    source: &SourceMap<'_>,
    config: &ExtractorConfig,
) -> Vec<Reference> {
    let resolver = Resolver {
        semantic,
        source,
        config,
    };
    let references: Vec<Reference> = sites.iter().flat_map(|site| resolver.site(site)).collect();
    tracing::debug!(
        sites = sites.len(),
        references = references.len(),
        "resolved references"
    );
    references
}

enum ListenerTarget {
    Local(SmolStr),
    Imported(String),
}

struct Resolver<'a> {
    semantic: &'a dyn SemanticContext,
    source: &'a SourceMap<'a>,
    config: &'a ExtractorConfig,
}

impl Resolver<'_> {
    fn site(&self, site: &ReferenceSite) -> Vec<Reference> {
        let span = self.source.span(&site.node);
        let edge = |target: SmolStr, kind: RefKind| {
            Reference::to_entity(site.source.clone(), target, kind).with_span(span.clone())
        };
        match &site.kind {
            SiteKind::Call => self
                .callee(&site.node)
                .map(|target| edge(target, RefKind::Calls))
                .into_iter()
                .collect(),
            SiteKind::ClientAction => self
                .client(&site.node)
                .map(|target| edge(target, RefKind::Calls))
                .into_iter()
                .collect(),
            SiteKind::DependsOn { target } => vec![edge(target.clone(), RefKind::DependsOn)],
            SiteKind::Listener => self
                .listener(&site.node)
                .map(|target| match target {
                    ListenerTarget::Local(id) => edge(id, RefKind::AttachedTo),
                    ListenerTarget::Imported(name) => {
                        Reference::to_external(site.source.clone(), name, RefKind::AttachedTo)
                            .with_span(span.clone())
                    }
                })
                .into_iter()
                .collect(),
            SiteKind::Send => SendAction::cast(site.node.clone())
                .and_then(|send| send.worker())
                .and_then(|worker| self.worker_target(&site.node, &worker))
                .map(|target| edge(target, RefKind::SendsTo))
                .into_iter()
                .collect(),
            SiteKind::Receive => ReceiveAction::cast(site.node.clone())
                .and_then(|receive| receive.worker())
                .and_then(|worker| self.worker_target(&site.node, &worker))
                .map(|target| edge(target, RefKind::ReceivesFrom))
                .into_iter()
                .collect(),
            SiteKind::Type { kind, ty } => ty
                .references()
                .into_iter()
                .map(|reference| match self.local_type(reference) {
                    Some(target) => edge(target, *kind),
                    None => Reference::to_external(
                        site.source.clone(),
                        reference.reference_entity_name(self.semantic.current_module()),
                        *kind,
                    )
                    .with_span(span.clone()),
                })
                .collect(),
        }
    }

    /// Function called by `f(..)` or `self.m(..)`.
    fn callee(&self, node: &SyntaxNode) -> Option<SmolStr> {
        if let Some(call) = CallExpr::cast(node.clone()) {
            let Expr::NameRef(name_ref) = call.callee()? else {
                return None;
            };
            if name_ref.prefix().is_some() {
                return None;
            }
            let name = name_ref.name()?;
            let symbol = self.semantic.symbol(&name)?;
            if symbol.kind != SymbolKind::Function {
                return None;
            }
            return Some(id::content_id(
                EntityKind::Function,
                &self.source.span_of_range(symbol.range),
                &name,
            ));
        }

        let call = MethodCall::cast(node.clone())?;
        let method = call.method()?.text()?;
        let body = node
            .ancestors()
            .find(|n| n.kind() == SyntaxKind::OBJECT_BODY)?;
        let function = body
            .children()
            .filter_map(FunctionDef::cast)
            .find(|f| f.name().and_then(|n| n.text()).as_deref() == Some(method.as_str()))?;
        let owner = identity::owner_of(&function, self.source, self.config);
        identity::function_identity(&function, &owner, self.source).map(|i| i.id)
    }

    /// Listener declaration named after a service's `on`. Inline
    /// `new X(..)` listeners have no declaration and yield nothing.
    fn listener(&self, node: &SyntaxNode) -> Option<ListenerTarget> {
        let Expr::NameRef(name_ref) = Expr::cast(node.clone())? else {
            return None;
        };
        let name = name_ref.name()?;
        if let Some(prefix) = name_ref.prefix() {
            return Some(ListenerTarget::Imported(format!("{prefix}:{name}")));
        }
        let symbol = self.semantic.symbol(&name)?;
        if symbol.kind != SymbolKind::Listener {
            return None;
        }
        Some(ListenerTarget::Local(id::content_id(
            EntityKind::Listener,
            &self.source.span_of_range(symbol.range),
            &name,
        )))
    }

    /// Connection a client action is performed on.
    fn client(&self, node: &SyntaxNode) -> Option<SmolStr> {
        let receiver = action_receiver(node)?;
        let decl = receiver_declaration(&receiver)?;
        decl.client_type(self.semantic)?;
        Some(decl.entity_id(self.source, self.config))
    }

    /// Worker named in a send/receive, or the enclosing function for
    /// `function`.
    fn worker_target(&self, node: &SyntaxNode, worker: &Name) -> Option<SmolStr> {
        let name = worker.text()?;
        let function = node.ancestors().find_map(FunctionDef::cast)?;
        if name == "function" {
            let owner = identity::owner_of(&function, self.source, self.config);
            return identity::function_identity(&function, &owner, self.source).map(|i| i.id);
        }
        let target = function
            .syntax()
            .descendants()
            .filter_map(WorkerDecl::cast)
            .find(|w| w.name().and_then(|n| n.text()).as_deref() == Some(name.as_str()))?;
        identity::worker_id(&target, self.source)
    }

    /// Entity id of a type defined in the analyzed file.
    fn local_type(&self, reference: &TypeSymbol) -> Option<SmolStr> {
        let TypeSymbol::Reference { name, module, .. } = reference else {
            return None;
        };
        if module != self.semantic.current_module() {
            return None;
        }
        let symbol = self.semantic.symbol(name)?;
        matches!(symbol.kind, SymbolKind::Type(_)).then(|| {
            id::content_id(
                EntityKind::TypeDefinition,
                &self.source.span_of_range(symbol.range),
                name,
            )
        })
    }
}
