use super::*;

ast_node!(Block, BLOCK);

impl Block {
    children_method!(statements, Stmt);
}

ast_enum!(
    /// A statement inside a function or worker body
    Stmt {
        Block(Block) = BLOCK,
        VarDecl(VarDecl) = VAR_DECL,
        Assign(AssignStmt) = ASSIGN_STMT,
        Expr(ExprStmt) = EXPR_STMT,
        If(IfStmt) = IF_STMT,
        While(WhileStmt) = WHILE_STMT,
        Foreach(ForeachStmt) = FOREACH_STMT,
        Lock(LockStmt) = LOCK_STMT,
        Fork(ForkStmt) = FORK_STMT,
        Worker(WorkerDecl) = WORKER_DECL,
        Return(ReturnStmt) = RETURN_STMT,
        Break(BreakStmt) = BREAK_STMT,
        Continue(ContinueStmt) = CONTINUE_STMT,
    }
);

ast_node!(VarDecl, VAR_DECL);

impl VarDecl {
    children_method!(annotations, Annotation);
    has_token_method!(is_final, FINAL_KW, "final int x = 1;");
    first_child_method!(type_desc, TypeDesc);
    first_child_method!(name, Name);
    child_after_token_method!(initializer, Expr, EQ, "Initializer after `=`.");
}

ast_node!(AssignStmt, ASSIGN_STMT);

impl AssignStmt {
    children_method!(exprs, Expr);

    pub fn target(&self) -> Option<Expr> {
        self.exprs().next()
    }

    pub fn value(&self) -> Option<Expr> {
        self.exprs().nth(1)
    }
}

ast_node!(ExprStmt, EXPR_STMT);

impl ExprStmt {
    first_child_method!(expr, Expr);
}

ast_node!(IfStmt, IF_STMT);

impl IfStmt {
    first_child_method!(condition, Expr);
    first_child_method!(then_branch, Block);
    first_child_method!(else_clause, ElseClause);
}

ast_node!(ElseClause, ELSE_CLAUSE);

impl ElseClause {
    // `else if ...`
    first_child_method!(else_if, IfStmt);
    // `else { ... }`
    first_child_method!(block, Block);
}

ast_node!(WhileStmt, WHILE_STMT);

impl WhileStmt {
    first_child_method!(condition, Expr);
    first_child_method!(body, Block);
}

ast_node!(ForeachStmt, FOREACH_STMT);

impl ForeachStmt {
    first_child_method!(type_desc, TypeDesc);
    first_child_method!(name, Name);
    child_after_token_method!(iterable, Expr, IN_KW, "Expression after `in`.");
    first_child_method!(body, Block);
}

ast_node!(LockStmt, LOCK_STMT);

impl LockStmt {
    first_child_method!(body, Block);
}

ast_node!(ForkStmt, FORK_STMT);

impl ForkStmt {
    children_method!(workers, WorkerDecl);
}

ast_node!(WorkerDecl, WORKER_DECL);

impl WorkerDecl {
    children_method!(annotations, Annotation);
    first_child_method!(name, Name);
    first_child_method!(return_type, ReturnType);
    first_child_method!(body, Block);
}

ast_node!(ReturnStmt, RETURN_STMT);

impl ReturnStmt {
    first_child_method!(expr, Expr);
}

ast_node!(BreakStmt, BREAK_STMT);
ast_node!(ContinueStmt, CONTINUE_STMT);
