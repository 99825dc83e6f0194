use super::*;

ast_enum!(
    /// An expression or action
    Expr {
        Literal(Literal) = LITERAL,
        NameRef(NameRef) = NAME_REF,
        FieldAccess(FieldAccess) = FIELD_ACCESS,
        Index(IndexExpr) = INDEX_EXPR,
        Call(CallExpr) = CALL_EXPR,
        MethodCall(MethodCall) = METHOD_CALL,
        RemoteCall(RemoteMethodCall) = REMOTE_METHOD_CALL,
        ResourceAccess(ClientResourceAccess) = CLIENT_RESOURCE_ACCESS,
        Send(SendAction) = SEND_ACTION,
        Receive(ReceiveAction) = RECEIVE_ACTION,
        New(NewExpr) = NEW_EXPR,
        Check(CheckExpr) = CHECK_EXPR,
        Unary(UnaryExpr) = UNARY_EXPR,
        Binary(BinaryExpr) = BINARY_EXPR,
        Paren(ParenExpr) = PAREN_EXPR,
        List(ListExpr) = LIST_EXPR,
        Mapping(MappingConstructor) = MAPPING_CONSTRUCTOR,
    }
);

impl Expr {
    /// Peel `check`, parentheses and unary wrappers.
    pub fn unwrap_transparent(self) -> Expr {
        let mut current = self;
        loop {
            let inner = match &current {
                Expr::Check(e) => e.expr(),
                Expr::Paren(e) => e.inner(),
                Expr::Unary(e) => e.operand(),
                _ => None,
            };
            match inner {
                Some(next) => current = next,
                None => return current,
            }
        }
    }
}

ast_node!(Literal, LITERAL);

impl Literal {
    /// Literal text with string quotes removed
    pub fn value(&self) -> String {
        let text = self.source_text();
        if text.starts_with('"') || text.starts_with('`') {
            unquote(&text)
        } else {
            text
        }
    }

    pub fn is_string(&self) -> bool {
        has_token(&self.0, SyntaxKind::STRING)
    }

    /// `()` or `null`
    pub fn is_nil(&self) -> bool {
        has_token(&self.0, SyntaxKind::L_PAREN) || has_token(&self.0, SyntaxKind::NULL_KW)
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    first_child_method!(qualified_name, QualifiedName);
    has_token_method!(is_self, SELF_KW, "self.client");

    /// Unqualified identifier, `self` for the self reference
    pub fn name(&self) -> Option<String> {
        if self.is_self() {
            return Some("self".to_string());
        }
        self.qualified_name().map(|qn| qn.name())
    }

    pub fn prefix(&self) -> Option<String> {
        self.qualified_name().and_then(|qn| qn.prefix())
    }
}

ast_node!(FieldAccess, FIELD_ACCESS);

impl FieldAccess {
    first_child_method!(receiver, Expr);
    first_child_method!(field, Name);
}

ast_node!(IndexExpr, INDEX_EXPR);

impl IndexExpr {
    children_method!(exprs, Expr);
}

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    first_child_method!(callee, Expr);
    first_child_method!(arg_list, ArgList);
}

ast_node!(MethodCall, METHOD_CALL);

impl MethodCall {
    first_child_method!(receiver, Expr);
    first_child_method!(method, Name);
    first_child_method!(arg_list, ArgList);
}

ast_node!(RemoteMethodCall, REMOTE_METHOD_CALL);

impl RemoteMethodCall {
    first_child_method!(receiver, Expr);
    first_child_method!(method, Name);
    first_child_method!(arg_list, ArgList);
}

ast_node!(ClientResourceAccess, CLIENT_RESOURCE_ACCESS);

impl ClientResourceAccess {
    first_child_method!(receiver, Expr);
    first_child_method!(method, Name);
    first_child_method!(arg_list, ArgList);

    /// Accessed path as written, e.g. `/users/[id]`
    pub fn path_text(&self) -> String {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::RESOURCE_PATH)
            .map(|n| compact_text(&n).replace(' ', ""))
            .unwrap_or_default()
    }
}

ast_node!(SendAction, SEND_ACTION);

impl SendAction {
    first_child_method!(value, Expr);
    first_child_method!(worker, Name);
}

ast_node!(ReceiveAction, RECEIVE_ACTION);

impl ReceiveAction {
    first_child_method!(worker, Name);
}

ast_node!(NewExpr, NEW_EXPR);

impl NewExpr {
    first_child_method!(type_ref, TypeRef);
    first_child_method!(arg_list, ArgList);
}

ast_node!(CheckExpr, CHECK_EXPR);

impl CheckExpr {
    has_token_method!(is_panic, CHECKPANIC_KW, "checkpanic f()");
    first_child_method!(expr, Expr);
}

ast_node!(UnaryExpr, UNARY_EXPR);

impl UnaryExpr {
    first_child_method!(operand, Expr);

    pub fn op(&self) -> Option<SyntaxKind> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
            .map(|t| t.kind())
    }
}

ast_node!(BinaryExpr, BINARY_EXPR);

impl BinaryExpr {
    children_method!(operands, Expr);
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    first_child_method!(inner, Expr);
}

ast_node!(ListExpr, LIST_EXPR);

impl ListExpr {
    children_method!(elements, Expr);
}

ast_node!(ArgList, ARG_LIST);

impl ArgList {
    children_method!(args, Expr);
}
