//! Entity visitor: syntax subtree → entities plus the sites that will later
//! become references.
//!
//! Dispatch is a match over the closed AST enums. A construct that cannot be
//! turned into an entity yields a diagnostic spanning that construct and the
//! walk moves on to its siblings.

use rowan::{NodeOrToken, WalkEvent};
use smol_str::SmolStr;

use crate::base::SourceSpan;
use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::hir::{Diagnostic, DiagnosticCollector, SemanticContext, SymbolKind, TypeSymbol, codes};
use crate::model::{
    Construct, DisplayAnnotation, Entity, EntityDetail, EntityKind, FunctionRole, ParamLocation,
    RefKind, TypeDefKind, id,
};
use crate::parser::{
    Annotation, AstNode, Block, ClassDef, ElseClause, Expr, ForkStmt, FunctionDef, IfStmt, Item,
    ListenerDecl, ObjectMember, Param, PathParam, RecordField, ServiceDecl, SourceFile, Stmt, SyntaxKind,
    SyntaxNode, TypeDef, TypeDesc, WorkerDecl,
};

use super::SourceMap;
use super::annotation::{read_display, test_groups};
use super::identity::{self, Owner};
use super::scope::{Declaration, has_invocation_references};

/// What a reference site points at, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteKind {
    /// `f(..)` or `self.m(..)`
    Call,
    /// `c->m(..)` or `c->/path.get(..)`
    ClientAction,
    /// A declared type used by a parameter, field or return
    Type { kind: RefKind, ty: TypeSymbol },
    /// Un-invoked client declaration
    DependsOn { target: SmolStr },
    /// Listener expression after `on`
    Listener,
    /// `x -> w`
    Send,
    /// `<- w`
    Receive,
}

/// A place in the tree that may produce a reference from `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    pub source: SmolStr,
    pub kind: SiteKind,
    pub node: SyntaxNode,
}

/// Result of visiting one subtree.
#[derive(Debug, Default)]
pub struct Visit {
    pub entities: Vec<Entity>,
    pub sites: Vec<ReferenceSite>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extract entities from the subtree rooted at `node`.
pub fn visit(
    node: &SyntaxNode,
    semantic: &dyn SemanticContext,
    source: &SourceMap<'_>,
    config: &ExtractorConfig,
) -> Visit {
    let mut visitor = Visitor {
        semantic,
        source,
        config,
        sites: Vec::new(),
        diagnostics: DiagnosticCollector::new(),
    };
    visitor.report_malformed(node);
    let entities = visitor.root(node);
    visitor.report_syntax_errors(node);
    tracing::debug!(
        kind = ?node.kind(),
        entities = entities.len(),
        sites = visitor.sites.len(),
        errors = visitor.diagnostics.error_count(),
        warnings = visitor.diagnostics.warning_count(),
        "visited subtree"
    );
    Visit {
        entities,
        sites: visitor.sites,
        diagnostics: visitor.diagnostics.finish(),
    }
}

struct Visitor<'a> {
    semantic: &'a dyn SemanticContext,
    source: &'a SourceMap<'a>,
    config: &'a ExtractorConfig,
    sites: Vec<ReferenceSite>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Visitor<'a> {
    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    fn root(&mut self, node: &SyntaxNode) -> Vec<Entity> {
        match node.kind() {
            SyntaxKind::SOURCE_FILE => match SourceFile::cast(node.clone()) {
                Some(file) => file.items().flat_map(|item| self.item(item)).collect(),
                None => Vec::new(),
            },
            SyntaxKind::OBJECT_FIELD | SyntaxKind::VAR_DECL => {
                let Some(decl) = Declaration::cast(node.clone()) else {
                    return Vec::new();
                };
                let owner = self.owner_of_declaration(&decl);
                self.declaration(&decl, owner.as_ref()).into_iter().collect()
            }
            SyntaxKind::IF_STMT
            | SyntaxKind::WHILE_STMT
            | SyntaxKind::FOREACH_STMT
            | SyntaxKind::LOCK_STMT
            | SyntaxKind::FORK_STMT => match Stmt::cast(node.clone()) {
                Some(stmt) => self.standalone_statement(&stmt),
                None => Vec::new(),
            },
            SyntaxKind::WORKER_DECL => WorkerDecl::cast(node.clone())
                .and_then(|worker| self.guarded(|v| v.worker(&worker)))
                .into_iter()
                .collect(),
            _ => match Item::cast(node.clone()) {
                Some(item) => self.item(item),
                None => Vec::new(),
            },
        }
    }

    fn item(&mut self, item: Item) -> Vec<Entity> {
        let entity = match item {
            Item::Service(service) => self.guarded(|v| v.service(&service)),
            Item::Function(function) => {
                let owner = identity::owner_of(&function, self.source, self.config);
                self.guarded(|v| v.function(&function, &owner)).flatten()
            }
            Item::TypeDef(def) => self.guarded(|v| v.type_def(&def)),
            Item::Class(class) => self.guarded(|v| v.class(&class)),
            Item::ModuleVar(var) => self.declaration(&Declaration::Module(var), None),
            Item::Listener(listener) => self.guarded(|v| v.listener(&listener)),
            Item::Import(_) => None,
        };
        entity.into_iter().collect()
    }

    /// Run one construct's extraction; a failure is recorded and yields `None`.
    fn guarded<T>(
        &mut self,
        extract: impl FnOnce(&mut Self) -> Result<T, ExtractError>,
    ) -> Option<T> {
        match extract(self) {
            Ok(value) => Some(value),
            Err(ExtractError::SubtreeExtraction {
                construct,
                span,
                message,
            }) => {
                self.diagnostics.subtree_failure(
                    span,
                    codes::SUBTREE_EXTRACTION,
                    format!("cannot extract {construct}: {message}"),
                );
                None
            }
            Err(other) => {
                tracing::warn!(error = %other, "unexpected error while visiting");
                self.diagnostics.add(Diagnostic::error(other.to_string()));
                None
            }
        }
    }

    /// One diagnostic per outermost ERROR node in the subtree.
    fn report_malformed(&mut self, root: &SyntaxNode) {
        let mut errors = Vec::new();
        let mut preorder = root.preorder();
        while let Some(event) = preorder.next() {
            if let WalkEvent::Enter(node) = event {
                if node.kind() == SyntaxKind::ERROR {
                    errors.push(node);
                    preorder.skip_subtree();
                }
            }
        }
        for error in errors {
            let text = error.text().to_string();
            let text = text.trim();
            let excerpt: String = text.chars().take(40).collect();
            self.diagnostics.subtree_failure(
                self.source.span(&error),
                codes::MALFORMED_SYNTAX,
                format!("unrecognized syntax `{excerpt}`"),
            );
        }
    }

    /// One diagnostic per parse error inside the subtree that neither an
    /// ERROR node nor a failed construct already reports. Annotation bodies
    /// are read leniently and are skipped.
    fn report_syntax_errors(&mut self, root: &SyntaxNode) {
        let scope = root.text_range();
        let failed: Vec<SourceSpan> = self
            .diagnostics
            .diagnostics()
            .iter()
            .filter(|d| d.code.as_deref() == Some(codes::SUBTREE_EXTRACTION))
            .filter_map(|d| d.span.clone())
            .collect();

        for error in self.source.syntax_errors() {
            if !scope.contains_range(error.range) {
                continue;
            }
            let node = match root.covering_element(error.range) {
                NodeOrToken::Node(node) => node,
                NodeOrToken::Token(token) => match token.parent() {
                    Some(parent) => parent,
                    None => continue,
                },
            };
            if node
                .ancestors()
                .any(|n| matches!(n.kind(), SyntaxKind::ERROR | SyntaxKind::ANNOTATION))
            {
                continue;
            }
            let construct = node
                .ancestors()
                .find(|n| is_construct(n.kind()))
                .unwrap_or_else(|| root.clone());
            let construct_span = self.source.span(&construct);
            if failed.iter().any(|span| construct_span.contains(span)) {
                continue;
            }
            self.diagnostics.subtree_failure(
                self.source.span_of_range(error.range),
                codes::MALFORMED_SYNTAX,
                format!("syntax error: {}", error.message),
            );
        }
    }

    fn display(&mut self, annotations: impl IntoIterator<Item = Annotation>) -> DisplayAnnotation {
        read_display(
            annotations,
            &self.config.annotations,
            self.source,
            Some(&mut self.diagnostics),
        )
    }

    fn type_names(&self, ty: &TypeSymbol) -> Vec<String> {
        ty.referenced_type_names(self.semantic.current_module())
    }

    fn site(&mut self, source: &SmolStr, kind: SiteKind, node: &SyntaxNode) {
        self.sites.push(ReferenceSite {
            source: source.clone(),
            kind,
            node: node.clone(),
        });
    }

    // ------------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------------

    fn service(&mut self, decl: &ServiceDecl) -> Result<Entity, ExtractError> {
        let span = self.source.span(decl.syntax());
        if decl.body().is_none() {
            return Err(ExtractError::subtree("service", span, "service has no body"));
        }
        self.display(decl.annotations());
        let identity = identity::service_identity(decl, self.source, self.config);
        let service_type = self.service_type(decl);
        let owner = Owner::Service(identity.id.clone());

        for listener in decl.listeners() {
            self.site(&identity.id, SiteKind::Listener, listener.syntax());
        }

        let mut children = Vec::new();
        for member in decl.members() {
            match member {
                ObjectMember::Function(function) => {
                    if let Some(Some(entity)) = self.guarded(|v| v.function(&function, &owner)) {
                        children.push(entity);
                    }
                }
                ObjectMember::Field(field) => {
                    let decl = Declaration::Field(field);
                    children.extend(self.declaration(&decl, Some(&identity.id)));
                }
            }
        }

        Ok(Entity::new(
            identity.id,
            identity.label,
            span,
            EntityDetail::Service {
                base_path: identity.base_path,
                service_type,
                annotation: identity.display,
            },
        )
        .with_children(children))
    }

    fn listener(&mut self, decl: &ListenerDecl) -> Result<Entity, ExtractError> {
        let span = self.source.span(decl.syntax());
        let Some(name) = decl.name().and_then(|n| n.text()) else {
            return Err(ExtractError::subtree("listener", span, "listener has no name"));
        };
        let id = id::content_id(EntityKind::Listener, &span, &name);
        let display = self.display(decl.annotations());

        let resolved = self
            .semantic
            .symbol(&name)
            .filter(|s| s.kind == SymbolKind::Listener)
            .and_then(|s| s.ty.clone());
        let type_name = match decl.type_desc() {
            Some(TypeDesc::Ref(ty)) if ty.is_var() => resolved.as_ref().map(TypeSymbol::signature),
            Some(ty) => Some(ty.source_text()),
            None => resolved.as_ref().map(TypeSymbol::signature),
        }
        .unwrap_or_default();

        let args = match decl.initializer().map(Expr::unwrap_transparent) {
            Some(Expr::New(new_expr)) => new_expr
                .arg_list()
                .map(|list| list.args().map(|arg| arg.source_text()).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        let label = if display.label.is_empty() {
            name
        } else {
            display.label
        };
        Ok(Entity::new(
            id,
            label,
            span,
            EntityDetail::Listener {
                type_name,
                module: resolved
                    .as_ref()
                    .and_then(TypeSymbol::module)
                    .map(ToString::to_string),
                args,
            },
        ))
    }

    /// Module of the first listener, else its written form.
    fn service_type(&self, decl: &ServiceDecl) -> Option<String> {
        let listener = decl.listeners().into_iter().next()?;
        let resolved = match listener.clone().unwrap_transparent() {
            Expr::New(new_expr) => match new_expr.type_ref() {
                Some(ty) => Some(self.semantic.resolve_type(&TypeDesc::Ref(ty))),
                None => {
                    return decl
                        .type_desc()
                        .map(|ty| ty.source_text())
                        .or_else(|| Some(listener.source_text()));
                }
            },
            Expr::NameRef(name_ref) if name_ref.prefix().is_none() => name_ref
                .name()
                .and_then(|name| self.semantic.symbol(&name))
                .filter(|s| matches!(s.kind, SymbolKind::Listener | SymbolKind::Variable))
                .and_then(|s| s.ty.clone()),
            _ => None,
        };
        match resolved.as_ref().and_then(TypeSymbol::module) {
            Some(module) => Some(module.to_string()),
            None => Some(listener.source_text()),
        }
    }

    // ------------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------------

    /// `Ok(None)` for plain service methods, which are not modeled.
    fn function(&mut self, func: &FunctionDef, owner: &Owner) -> Result<Option<Entity>, ExtractError> {
        let span = self.source.span(func.syntax());
        if func.name().and_then(|n| n.text()).is_none() {
            let at = func
                .keyword()
                .map(|k| self.source.span_of_range(k.text_range()))
                .unwrap_or(span);
            return Err(ExtractError::subtree("function", at, "function has no name"));
        }
        let Some(identity) = identity::function_identity(func, owner, self.source) else {
            return Ok(None);
        };
        let resource = identity.role == FunctionRole::Resource;

        let mut children = Vec::new();
        if let Some(path) = func.resource_path() {
            for param in path.path_params() {
                children.extend(self.path_param(&param));
            }
        }
        for param in func.params() {
            children.extend(self.param(&param, resource));
        }

        let returns = match func.return_type().and_then(|r| r.type_desc()) {
            Some(ty) => {
                let resolved = self.semantic.resolve_type(&ty);
                let names = self.type_names(&resolved);
                self.site(
                    &identity.id,
                    SiteKind::Type {
                        kind: RefKind::Returns,
                        ty: resolved,
                    },
                    ty.syntax(),
                );
                names
            }
            None => Vec::new(),
        };

        if let Some(body) = func.body() {
            children.extend(self.block(&body, &identity.id));
        }
        let groups = match identity.role {
            FunctionRole::Test => test_groups(func.annotations()),
            _ => Vec::new(),
        };

        Ok(Some(
            Entity::new(
                identity.id,
                identity.label,
                span,
                EntityDetail::Function {
                    role: identity.role,
                    accessor: identity.accessor,
                    resource_path: identity.resource_path,
                    returns,
                    groups,
                },
            )
            .with_children(children),
        ))
    }

    fn param(&mut self, param: &Param, resource: bool) -> Option<Entity> {
        let name = param.name()?.text()?;
        let span = self.source.span(param.syntax());
        let id = id::content_id(EntityKind::Parameter, &span, &name);
        let types = self.typed(&id, param.type_desc());
        let location = resource.then(|| {
            let annotations: Vec<Annotation> = param.annotations().collect();
            if annotations.iter().any(|a| a.is("http", "Payload")) {
                ParamLocation::Body
            } else if annotations.iter().any(|a| a.is("http", "Header")) {
                ParamLocation::Header
            } else {
                ParamLocation::Query
            }
        });
        Some(Entity::new(
            id,
            name,
            span,
            EntityDetail::Parameter {
                types,
                is_required: !param.is_defaultable() && !param.is_rest(),
                location,
            },
        ))
    }

    fn path_param(&mut self, param: &PathParam) -> Option<Entity> {
        let name = param.name()?.text()?;
        let span = self.source.span(param.syntax());
        let id = id::content_id(EntityKind::Parameter, &span, &name);
        let types = self.typed(&id, param.type_desc());
        Some(Entity::new(
            id,
            name,
            span,
            EntityDetail::Parameter {
                types,
                is_required: true,
                location: Some(ParamLocation::Path),
            },
        ))
    }

    /// Resolve a declared type, record a `typed-by` site, return its names.
    fn typed(&mut self, source: &SmolStr, ty: Option<TypeDesc>) -> Vec<String> {
        let Some(ty) = ty else {
            return Vec::new();
        };
        let resolved = self.semantic.resolve_type(&ty);
        let names = self.type_names(&resolved);
        self.site(
            source,
            SiteKind::Type {
                kind: RefKind::TypedBy,
                ty: resolved,
            },
            ty.syntax(),
        );
        names
    }

    fn worker(&mut self, worker: &WorkerDecl) -> Result<Entity, ExtractError> {
        let span = self.source.span(worker.syntax());
        let Some(name) = worker.name().and_then(|n| n.text()) else {
            return Err(ExtractError::subtree("worker", span, "worker has no name"));
        };
        let id = id::content_id(EntityKind::Function, &span, &name);

        let returns = match worker.return_type().and_then(|r| r.type_desc()) {
            Some(ty) => {
                let resolved = self.semantic.resolve_type(&ty);
                let names = self.type_names(&resolved);
                self.site(
                    &id,
                    SiteKind::Type {
                        kind: RefKind::Returns,
                        ty: resolved,
                    },
                    ty.syntax(),
                );
                names
            }
            None => Vec::new(),
        };
        let children = match worker.body() {
            Some(body) => self.block(&body, &id),
            None => Vec::new(),
        };

        Ok(Entity::new(
            id,
            name,
            span,
            EntityDetail::Function {
                role: FunctionRole::Worker,
                accessor: None,
                resource_path: None,
                returns,
                groups: Vec::new(),
            },
        )
        .with_children(children))
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    /// Entities of the statements in `block`; sites are attributed to `owner`.
    fn block(&mut self, block: &Block, owner: &SmolStr) -> Vec<Entity> {
        let mut entities = Vec::new();
        for stmt in block.statements() {
            entities.extend(self.statement(&stmt, owner));
        }
        entities
    }

    fn statement(&mut self, stmt: &Stmt, owner: &SmolStr) -> Vec<Entity> {
        match stmt {
            Stmt::Block(block) => self.block(block, owner),
            Stmt::VarDecl(var) => {
                self.scan(var.syntax(), owner);
                self.declaration(&Declaration::Local(var.clone()), Some(owner))
                    .into_iter()
                    .collect()
            }
            Stmt::Assign(_) | Stmt::Expr(_) | Stmt::Return(_) => {
                self.scan(stmt.syntax(), owner);
                Vec::new()
            }
            Stmt::If(if_stmt) => vec![self.if_stmt(if_stmt, owner)],
            Stmt::While(while_stmt) => {
                if let Some(condition) = while_stmt.condition() {
                    self.scan(condition.syntax(), owner);
                }
                let condition = while_stmt.condition().map(|c| c.source_text());
                vec![self.control_flow(
                    stmt.syntax(),
                    Construct::While,
                    condition,
                    while_stmt.body(),
                    owner,
                )]
            }
            Stmt::Foreach(foreach) => {
                if let Some(iterable) = foreach.iterable() {
                    self.scan(iterable.syntax(), owner);
                }
                let condition = foreach.iterable().map(|c| c.source_text());
                vec![self.control_flow(
                    stmt.syntax(),
                    Construct::Foreach,
                    condition,
                    foreach.body(),
                    owner,
                )]
            }
            Stmt::Lock(lock) => vec![self.control_flow(
                stmt.syntax(),
                Construct::Lock,
                None,
                lock.body(),
                owner,
            )],
            Stmt::Fork(fork) => vec![self.fork(fork)],
            Stmt::Worker(worker) => self.guarded(|v| v.worker(worker)).into_iter().collect(),
            Stmt::Break(_) | Stmt::Continue(_) => Vec::new(),
        }
    }

    /// A control-flow statement visited on its own: sites come from the
    /// statement entity itself.
    fn standalone_statement(&mut self, stmt: &Stmt) -> Vec<Entity> {
        let span = self.source.span(stmt.syntax());
        let construct = match stmt {
            Stmt::If(_) => Construct::If,
            Stmt::While(_) => Construct::While,
            Stmt::Foreach(_) => Construct::Foreach,
            Stmt::Lock(_) => Construct::Lock,
            Stmt::Fork(_) => Construct::Fork,
            _ => return self.statement(stmt, &SmolStr::default()),
        };
        let owner = self.anonymous_id(&span, construct);
        let first_site = self.sites.len();
        let entities = self.statement(stmt, &owner);
        // random ids differ per call; point the sites at the emitted entity
        if let Some(entity) = entities.first() {
            for site in &mut self.sites[first_site..] {
                if site.source == owner {
                    site.source = entity.id.clone();
                }
            }
        }
        entities
    }

    fn anonymous_id(&self, span: &SourceSpan, construct: Construct) -> SmolStr {
        id::anonymous_id(
            EntityKind::ControlFlow,
            span,
            construct_name(construct),
            self.config.anonymous_ids,
        )
    }

    fn control_flow(
        &mut self,
        node: &SyntaxNode,
        construct: Construct,
        condition: Option<String>,
        body: Option<Block>,
        owner: &SmolStr,
    ) -> Entity {
        let span = self.source.span(node);
        let id = self.anonymous_id(&span, construct);
        let children = match body {
            Some(body) => self.block(&body, owner),
            None => Vec::new(),
        };
        Entity::new(
            id,
            construct_name(construct),
            span,
            EntityDetail::ControlFlow {
                construct,
                condition,
            },
        )
        .with_children(children)
    }

    fn if_stmt(&mut self, if_stmt: &IfStmt, owner: &SmolStr) -> Entity {
        if let Some(condition) = if_stmt.condition() {
            self.scan(condition.syntax(), owner);
        }
        let condition = if_stmt.condition().map(|c| c.source_text());
        let mut entity = self.control_flow(
            if_stmt.syntax(),
            Construct::If,
            condition,
            if_stmt.then_branch(),
            owner,
        );
        if let Some(else_clause) = if_stmt.else_clause() {
            entity.children.push(self.else_clause(&else_clause, owner));
        }
        entity
    }

    fn else_clause(&mut self, clause: &ElseClause, owner: &SmolStr) -> Entity {
        let mut entity = self.control_flow(
            clause.syntax(),
            Construct::Else,
            None,
            clause.block(),
            owner,
        );
        if let Some(nested) = clause.else_if() {
            entity.children.push(self.if_stmt(&nested, owner));
        }
        entity
    }

    fn fork(&mut self, fork: &ForkStmt) -> Entity {
        let span = self.source.span(fork.syntax());
        let id = self.anonymous_id(&span, Construct::Fork);
        let workers = fork
            .workers()
            .filter_map(|worker| self.guarded(|v| v.worker(&worker)))
            .collect();
        Entity::new(
            id,
            construct_name(Construct::Fork),
            span,
            EntityDetail::ControlFlow {
                construct: Construct::Fork,
                condition: None,
            },
        )
        .with_children(workers)
    }

    /// Record call, action and worker-message sites inside an expression.
    fn scan(&mut self, node: &SyntaxNode, owner: &SmolStr) {
        if owner.is_empty() {
            return;
        }
        for descendant in node.descendants() {
            let kind = match descendant.kind() {
                SyntaxKind::CALL_EXPR => SiteKind::Call,
                SyntaxKind::METHOD_CALL if is_self_method_call(&descendant) => SiteKind::Call,
                SyntaxKind::REMOTE_METHOD_CALL | SyntaxKind::CLIENT_RESOURCE_ACCESS => {
                    SiteKind::ClientAction
                }
                SyntaxKind::SEND_ACTION => SiteKind::Send,
                SyntaxKind::RECEIVE_ACTION => SiteKind::Receive,
                _ => continue,
            };
            self.site(owner, kind, &descendant);
        }
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    /// Entity that un-invoked clients declared at `decl` depend from.
    fn owner_of_declaration(&self, decl: &Declaration) -> Option<SmolStr> {
        match decl {
            Declaration::Local(_) => {
                identity::enclosing_function_id(decl.syntax(), self.source, self.config)
            }
            Declaration::Field(_) => {
                let owner = decl
                    .syntax()
                    .parent()
                    .filter(|p| p.kind() == SyntaxKind::OBJECT_BODY)
                    .and_then(|body| body.parent())?;
                if let Some(service) = ServiceDecl::cast(owner.clone()) {
                    return Some(identity::service_identity(&service, self.source, self.config).id);
                }
                ClassDef::cast(owner).map(|class| identity::class_id(&class, self.source))
            }
            Declaration::Param(_) | Declaration::Module(_) => None,
        }
    }

    /// A Connection for client-typed declarations, nothing otherwise.
    fn declaration(&mut self, decl: &Declaration, owner: Option<&SmolStr>) -> Option<Entity> {
        let client = decl.client_type(self.semantic)?;
        let name = decl.name()?;
        let span = self.source.span(decl.syntax());
        let id = decl.entity_id(self.source, self.config);
        let display = self.display(decl.annotations());
        let invoked = has_invocation_references(decl);

        let type_name = match decl.type_desc() {
            Some(TypeDesc::Ref(ty)) if ty.is_var() => client.signature(),
            Some(ty) => ty.source_text(),
            None => client.signature(),
        };

        if !invoked {
            if let Some(owner) = owner {
                tracing::trace!(connection = %id, %owner, "client never invoked");
                self.site(
                    owner,
                    SiteKind::DependsOn { target: id.clone() },
                    decl.syntax(),
                );
            }
        }

        let label = if display.label.is_empty() {
            name
        } else {
            display.label
        };
        Some(Entity::new(
            id,
            label,
            span,
            EntityDetail::Connection {
                type_name,
                module: client.module().map(ToString::to_string),
                invoked,
            },
        ))
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    fn type_def(&mut self, def: &TypeDef) -> Result<Entity, ExtractError> {
        let span = self.source.span(def.syntax());
        let Some(name) = def.name().and_then(|n| n.text()) else {
            return Err(ExtractError::subtree("type", span, "type definition has no name"));
        };
        let id = id::content_id(EntityKind::TypeDefinition, &span, &name);

        let (type_kind, children) = match def.type_desc() {
            Some(TypeDesc::Record(record)) => {
                let fields = record
                    .fields()
                    .filter_map(|field| self.record_field(&field))
                    .collect();
                (TypeDefKind::Record, fields)
            }
            other => {
                self.typed(&id, other);
                (TypeDefKind::Alias, Vec::new())
            }
        };

        Ok(
            Entity::new(id, name, span, EntityDetail::TypeDefinition { type_kind })
                .with_children(children),
        )
    }

    fn record_field(&mut self, field: &RecordField) -> Option<Entity> {
        let name = field.name()?.text()?;
        let span = self.source.span(field.syntax());
        let id = id::content_id(EntityKind::Field, &span, &name);
        let types = self.typed(&id, field.type_desc());
        Some(Entity::new(
            id,
            name,
            span,
            EntityDetail::Field {
                types,
                is_optional: field.is_optional(),
            },
        ))
    }

    fn class(&mut self, class: &ClassDef) -> Result<Entity, ExtractError> {
        let span = self.source.span(class.syntax());
        let Some(name) = class.name().and_then(|n| n.text()) else {
            return Err(ExtractError::subtree("class", span, "class has no name"));
        };
        let id = identity::class_id(class, self.source);
        let owner = Owner::Class(id.clone());

        let mut children = Vec::new();
        for member in class.members() {
            match member {
                ObjectMember::Field(field) => {
                    let decl = Declaration::Field(field.clone());
                    if let Some(connection) = self.declaration(&decl, Some(&id)) {
                        children.push(connection);
                        continue;
                    }
                    let Some(field_name) = field.name().and_then(|n| n.text()) else {
                        continue;
                    };
                    let field_span = self.source.span(field.syntax());
                    let field_id = id::content_id(EntityKind::Field, &field_span, &field_name);
                    let types = self.typed(&field_id, field.type_desc());
                    children.push(Entity::new(
                        field_id,
                        field_name,
                        field_span,
                        EntityDetail::Field {
                            types,
                            is_optional: false,
                        },
                    ));
                }
                ObjectMember::Function(function) => {
                    if let Some(Some(entity)) = self.guarded(|v| v.function(&function, &owner)) {
                        children.push(entity);
                    }
                }
            }
        }

        let type_kind = if class.is_client() {
            TypeDefKind::ClientClass
        } else {
            TypeDefKind::Class
        };
        Ok(
            Entity::new(id, name, span, EntityDetail::TypeDefinition { type_kind })
                .with_children(children),
        )
    }
}

fn is_construct(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::SERVICE_DECL
            | SyntaxKind::FUNCTION_DEF
            | SyntaxKind::CLASS_DEF
            | SyntaxKind::TYPE_DEF
            | SyntaxKind::WORKER_DECL
            | SyntaxKind::LISTENER_DECL
    )
}

fn construct_name(construct: Construct) -> &'static str {
    match construct {
        Construct::If => "if",
        Construct::Else => "else",
        Construct::While => "while",
        Construct::Foreach => "foreach",
        Construct::Lock => "lock",
        Construct::Fork => "fork",
    }
}

fn is_self_method_call(node: &SyntaxNode) -> bool {
    match Expr::cast(node.clone()) {
        Some(Expr::MethodCall(call)) => {
            matches!(call.receiver(), Some(Expr::NameRef(r)) if r.is_self())
        }
        _ => false,
    }
}
