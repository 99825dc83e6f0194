//! Recursive descent parser for the service language
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.
//!
//! Trivia is attached to the enclosing node rather than to the node that
//! follows it, so every composite node's range starts at its first token and
//! ends at its last one.

use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse service-language source code into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens);
    parser.parse_source_file();
    parser.finish()
}

use SyntaxKind::*;

const ITEM_RECOVERY: &[SyntaxKind] = &[
    IMPORT_KW,
    SERVICE_KW,
    FUNCTION_KW,
    TYPE_KW,
    CLASS_KW,
    LISTENER_KW,
    AT,
    PUBLIC_KW,
    ISOLATED_KW,
    CONFIGURABLE_KW,
];

const MEMBER_RECOVERY: &[SyntaxKind] = &[
    FUNCTION_KW,
    RESOURCE_KW,
    REMOTE_KW,
    AT,
    R_BRACE,
    PUBLIC_KW,
    PRIVATE_KW,
    ISOLATED_KW,
    FINAL_KW,
];

const STMT_RECOVERY: &[SyntaxKind] = &[
    R_BRACE, IF_KW, WHILE_KW, FOREACH_KW, LOCK_KW, FORK_KW, WORKER_KW, RETURN_KW,
];

const ITEM_QUALIFIERS: &[SyntaxKind] = &[
    PUBLIC_KW,
    PRIVATE_KW,
    ISOLATED_KW,
    FINAL_KW,
    CONFIGURABLE_KW,
    CLIENT_KW,
];

const MEMBER_QUALIFIERS: &[SyntaxKind] = &[
    PUBLIC_KW,
    PRIVATE_KW,
    ISOLATED_KW,
    FINAL_KW,
    REMOTE_KW,
    RESOURCE_KW,
];

/// Binding power of a binary operator, `None` if `kind` is not one.
fn binary_bp(kind: SyntaxKind) -> Option<u8> {
    let bp = match kind {
        PIPE_PIPE => 1,
        AMP_AMP => 2,
        EQ_EQ | BANG_EQ => 3,
        LT | GT | LT_EQ | GT_EQ => 4,
        DOT_DOT_LT | DOT_DOT_DOT => 5,
        PLUS | MINUS => 6,
        STAR | SLASH | PERCENT => 7,
        _ => return None,
    };
    Some(bp)
}

/// Identifiers and keywords may both appear as member or path-segment names.
fn is_name_like(kind: SyntaxKind) -> bool {
    kind == IDENT || kind.is_keyword()
}

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    /// Set while parsing `if`/`while`/`foreach` headers, where `{` opens the body.
    no_mapping: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            no_mapping: false,
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    /// Index of the `n`th non-trivia token at or after the cursor.
    fn peek_index(&self, n: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(self.pos)
            .filter(|(_, t)| !t.kind.is_trivia())
            .nth(n)
            .map(|(idx, _)| idx)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.peek_index(n)
            .map(|idx| self.tokens[idx].kind)
            .unwrap_or(SyntaxKind::ERROR)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        !self.at_eof() && kinds.contains(&self.current_kind())
    }

    fn at_eof(&self) -> bool {
        self.peek_index(0).is_none()
    }

    fn at_type_start(&self) -> bool {
        self.at_any(&[IDENT, VAR_KW, L_PAREN, RECORD_KW])
    }

    fn at_expr_start(&self) -> bool {
        self.at_any(&[
            INTEGER,
            DECIMAL,
            STRING,
            TRUE_KW,
            FALSE_KW,
            NULL_KW,
            IDENT,
            SELF_KW,
            NEW_KW,
            L_PAREN,
            L_BRACKET,
            L_BRACE,
            BANG,
            MINUS,
            PLUS,
            CHECK_KW,
            CHECKPANIC_KW,
            START_KW,
            WAIT_KW,
            LEFT_ARROW,
            QUESTION,
        ])
    }

    // =========================================================================
    // Speculative lookahead
    // =========================================================================

    /// Scan a type descriptor starting at lookahead `n` without building
    /// anything. Returns the lookahead index just past it.
    fn scan_type(&self, n: usize) -> Option<usize> {
        let mut m = self.scan_postfix_type(n)?;
        while self.nth(m) == PIPE {
            m = self.scan_postfix_type(m + 1)?;
        }
        Some(m)
    }

    fn scan_postfix_type(&self, n: usize) -> Option<usize> {
        let mut m = self.scan_primary_type(n)?;
        loop {
            match self.nth(m) {
                QUESTION => m += 1,
                L_BRACKET if self.nth(m + 1) == R_BRACKET => m += 2,
                L_BRACKET if self.nth(m + 1) == INTEGER && self.nth(m + 2) == R_BRACKET => {
                    m += 3
                }
                _ => return Some(m),
            }
        }
    }

    fn scan_primary_type(&self, n: usize) -> Option<usize> {
        match self.nth(n) {
            IDENT => {
                let mut m = if self.nth(n + 1) == COLON && self.nth(n + 2) == IDENT {
                    n + 3
                } else {
                    n + 1
                };
                if self.nth(m) == LT {
                    m = self.scan_type(m + 1)?;
                    while self.nth(m) == COMMA {
                        m = self.scan_type(m + 1)?;
                    }
                    if self.nth(m) != GT {
                        return None;
                    }
                    m += 1;
                }
                Some(m)
            }
            VAR_KW => Some(n + 1),
            L_PAREN if self.nth(n + 1) == R_PAREN => Some(n + 2),
            L_PAREN => {
                let m = self.scan_type(n + 1)?;
                (self.nth(m) == R_PAREN).then_some(m + 1)
            }
            _ => None,
        }
    }

    /// `T name =` or `T name;` at the cursor.
    fn looks_like_var_decl(&self) -> bool {
        if self.at_any(&[FINAL_KW, VAR_KW]) {
            return true;
        }
        match self.scan_type(0) {
            Some(m) => self.nth(m) == IDENT && matches!(self.nth(m + 1), EQ | SEMICOLON),
            None => false,
        }
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) {
        self.skip_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {:?}", kind));
            false
        }
    }

    fn skip_trivia(&mut self) {
        while self
            .tokens
            .get(self.pos)
            .map(|t| t.kind.is_trivia())
            .unwrap_or(false)
        {
            let token = &self.tokens[self.pos];
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = match self.peek_index(0) {
            Some(idx) => {
                let token = &self.tokens[idx];
                TextRange::at(token.offset, TextSize::of(token.text))
            }
            None => TextRange::empty(self.end_offset()),
        };
        self.errors.push(SyntaxError::new(message, range));
    }

    fn end_offset(&self) -> TextSize {
        self.tokens
            .last()
            .map(|t| t.offset + TextSize::of(t.text))
            .unwrap_or_default()
    }

    fn error_recover(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        self.start_node(ERROR);
        // Always consume at least one token to make progress
        let mut consumed = false;
        while !self.at_eof() && !self.at_any(recovery) {
            self.bump();
            consumed = true;
        }
        if !consumed && !self.at_eof() {
            self.bump();
        }
        self.finish_node();
    }

    /// Wrap everything since `cp` (annotations, qualifiers) plus the following
    /// junk in a single ERROR node.
    fn recover_at(
        &mut self,
        cp: Checkpoint,
        start: usize,
        message: impl Into<String>,
        recovery: &[SyntaxKind],
    ) {
        self.error(message);
        self.builder.start_node_at(cp, ERROR.into());
        let mut consumed = self.pos != start;
        while !self.at_eof() && !self.at_any(recovery) {
            self.bump();
            consumed = true;
        }
        if !consumed && !self.at_eof() {
            self.bump();
        }
        self.finish_node();
    }

    /// Skip a broken statement, including its terminating `;`.
    fn recover_statement(&mut self, message: impl Into<String>) {
        self.error(message);
        self.start_node(ERROR);
        let mut consumed = false;
        while !self.at_eof() {
            if consumed && self.at_any(STMT_RECOVERY) {
                break;
            }
            let kind = self.current_kind();
            self.bump();
            consumed = true;
            if kind == SEMICOLON {
                break;
            }
        }
        self.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.skip_trivia();
        self.builder.start_node(kind.into());
    }

    fn start_node_at(&mut self, cp: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(cp, kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.skip_trivia();
        self.builder.checkpoint()
    }

    fn with_mapping<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let prev = std::mem::replace(&mut self.no_mapping, false);
        let result = f(self);
        self.no_mapping = prev;
        result
    }

    // =========================================================================
    // Module level
    // =========================================================================

    /// SourceFile = ModuleMember*
    fn parse_source_file(&mut self) {
        self.builder.start_node(SOURCE_FILE.into());

        while !self.at_eof() {
            let before = self.peek_index(0);
            self.parse_module_member();
            if self.peek_index(0) == before && !self.at_eof() {
                self.error_recover(
                    format!("unexpected token: {:?}", self.current_kind()),
                    ITEM_RECOVERY,
                );
            }
        }

        self.skip_trivia();
        self.finish_node();
    }

    /// ModuleMember = Annotation* Qualifier* (Import | Service | Function | TypeDef | Class | Listener | ModuleVar)
    fn parse_module_member(&mut self) {
        let cp = self.checkpoint();
        let start = self.pos;
        self.parse_annotations();
        self.parse_qualifiers(ITEM_QUALIFIERS);

        match self.current_kind() {
            _ if self.at_eof() => {
                if self.pos != start {
                    self.recover_at(cp, start, "expected declaration", ITEM_RECOVERY);
                }
            }
            IMPORT_KW => self.parse_import(cp),
            SERVICE_KW => self.parse_service(cp),
            FUNCTION_KW => self.parse_function(cp, false),
            TYPE_KW => self.parse_type_def(cp),
            CLASS_KW => self.parse_class(cp),
            LISTENER_KW => self.parse_listener(cp),
            _ if self.at_type_start() => self.parse_var_like(cp, MODULE_VAR_DECL),
            kind => self.recover_at(
                cp,
                start,
                format!("unexpected token: {:?}", kind),
                ITEM_RECOVERY,
            ),
        }
    }

    fn parse_qualifiers(&mut self, allowed: &[SyntaxKind]) -> Vec<SyntaxKind> {
        let mut seen = Vec::new();
        while self.at_any(allowed) {
            seen.push(self.current_kind());
            self.bump();
        }
        seen
    }

    /// Import = 'import' ModuleName ('as' Name)? ';'
    fn parse_import(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, IMPORT_DECL);
        self.bump();

        if self.at(IDENT) {
            self.start_node(MODULE_NAME);
            self.bump();
            if self.eat(SLASH) {
                self.expect(IDENT);
            }
            while self.eat(DOT) {
                self.expect(IDENT);
            }
            self.finish_node();
        } else {
            self.error("expected module name");
        }

        if self.at(AS_KW) {
            self.start_node(IMPORT_PREFIX);
            self.bump();
            self.parse_name();
            self.finish_node();
        }

        self.expect(SEMICOLON);
        self.finish_node();
    }

    /// Service = 'service' TypeDesc? ServicePath? 'on' ListenerList ObjectBody
    fn parse_service(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, SERVICE_DECL);
        self.bump();

        if self.at(IDENT) {
            self.parse_type_desc();
        }
        if self.at_any(&[SLASH, STRING]) {
            self.parse_service_path();
        }

        if self.expect(ON_KW) {
            self.start_node(LISTENER_LIST);
            self.parse_condition();
            while self.eat(COMMA) {
                self.parse_condition();
            }
            self.finish_node();
        }

        if self.at(L_BRACE) {
            self.parse_object_body();
        } else {
            self.error("expected service body");
        }

        self.finish_node();
    }

    /// ServicePath = STRING | ('/' IDENT?)+
    fn parse_service_path(&mut self) {
        self.start_node(SERVICE_PATH);
        if self.at(STRING) {
            self.bump();
        } else {
            while self.eat(SLASH) {
                self.eat(IDENT);
            }
        }
        self.finish_node();
    }

    /// ObjectBody = '{' ObjectMember* '}'
    fn parse_object_body(&mut self) {
        self.start_node(OBJECT_BODY);
        self.bump();

        while !self.at_eof() && !self.at(R_BRACE) {
            let before = self.peek_index(0);
            self.parse_object_member();
            if self.peek_index(0) == before {
                self.error_recover("unexpected token in body", MEMBER_RECOVERY);
            }
        }

        self.expect(R_BRACE);
        self.finish_node();
    }

    /// ObjectMember = Annotation* Qualifier* (Function | ObjectField)
    fn parse_object_member(&mut self) {
        let cp = self.checkpoint();
        let start = self.pos;
        self.parse_annotations();
        let qualifiers = self.parse_qualifiers(MEMBER_QUALIFIERS);

        if self.at(FUNCTION_KW) {
            self.parse_function(cp, qualifiers.contains(&RESOURCE_KW));
        } else if self.at_type_start() {
            self.parse_var_like(cp, OBJECT_FIELD);
        } else {
            self.recover_at(cp, start, "expected member declaration", MEMBER_RECOVERY);
        }
    }

    /// Function = 'function' Name ResourcePath? ParamList ReturnType? (Block | ';')
    fn parse_function(&mut self, cp: Checkpoint, is_resource: bool) {
        self.start_node_at(cp, FUNCTION_DEF);
        self.bump();

        if !self.parse_name() {
            self.error("expected function name");
        }

        if is_resource && !self.at(L_PAREN) {
            self.parse_resource_path();
        }

        if self.at(L_PAREN) {
            self.parse_param_list();
        } else {
            self.error("expected parameter list");
        }

        if self.at(RETURNS_KW) {
            self.parse_return_type();
        }

        if self.at(L_BRACE) {
            self.parse_block();
        } else if !self.eat(SEMICOLON) {
            self.error("expected function body");
        }

        self.finish_node();
    }

    /// ResourcePath = Segment ('/' Segment)*
    fn parse_resource_path(&mut self) {
        self.start_node(RESOURCE_PATH);
        loop {
            if self.at(DOT) {
                self.bump();
            } else if self.at(L_BRACKET) {
                self.parse_path_param();
            } else if !self.at_eof() && is_name_like(self.current_kind()) {
                self.bump();
            } else {
                self.error("expected resource path segment");
                break;
            }
            if !self.eat(SLASH) {
                break;
            }
        }
        self.finish_node();
    }

    /// PathParam = '[' Annotation* TypeDesc '...'? Name ']'
    fn parse_path_param(&mut self) {
        self.start_node(PATH_PARAM);
        self.bump();
        self.parse_annotations();
        self.parse_type_desc();
        self.eat(DOT_DOT_DOT);
        self.parse_name();
        self.expect(R_BRACKET);
        self.finish_node();
    }

    /// ParamList = '(' (Param (',' Param)*)? ')'
    fn parse_param_list(&mut self) {
        self.start_node(PARAM_LIST);
        self.bump();
        if !self.at(R_PAREN) {
            loop {
                self.parse_param();
                if !self.eat(COMMA) {
                    break;
                }
            }
        }
        self.expect(R_PAREN);
        self.finish_node();
    }

    /// Param = Annotation* TypeDesc '...'? Name ('=' Expr)?
    fn parse_param(&mut self) {
        self.start_node(PARAM);
        self.parse_annotations();
        if self.at_type_start() {
            self.parse_type_desc();
        } else {
            self.error("expected parameter type");
        }
        self.eat(DOT_DOT_DOT);
        self.parse_name();
        if self.eat(EQ) {
            self.with_mapping(|p| p.parse_expr());
        }
        self.finish_node();
    }

    /// ReturnType = 'returns' Annotation* TypeDesc
    fn parse_return_type(&mut self) {
        self.start_node(RETURN_TYPE);
        self.bump();
        self.parse_annotations();
        self.parse_type_desc();
        self.finish_node();
    }

    /// TypeDef = 'type' Name TypeDesc ';'
    fn parse_type_def(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, TYPE_DEF);
        self.bump();
        self.parse_name();
        self.parse_type_desc();
        self.expect(SEMICOLON);
        self.finish_node();
    }

    /// RecordType = 'record' '{' '|'? RecordField* '|'? '}'
    fn parse_record_type(&mut self) {
        self.start_node(RECORD_TYPE);
        self.bump();
        if !self.expect(L_BRACE) {
            self.finish_node();
            return;
        }
        let closed = self.eat(PIPE);

        while !self.at_eof() && !self.at(R_BRACE) && !(self.at(PIPE) && self.nth(1) == R_BRACE) {
            if self.at_type_start() || self.at(AT) {
                self.parse_record_field();
            } else {
                self.recover_statement("expected record field");
            }
        }

        if closed {
            self.expect(PIPE);
        }
        self.expect(R_BRACE);
        self.finish_node();
    }

    /// RecordField = Annotation* TypeDesc Name '?'? ('=' Expr)? ';'
    fn parse_record_field(&mut self) {
        self.start_node(RECORD_FIELD);
        self.parse_annotations();
        self.parse_type_desc();
        self.parse_name();
        self.eat(QUESTION);
        if self.eat(EQ) {
            self.parse_expr();
        }
        self.expect(SEMICOLON);
        self.finish_node();
    }

    /// Class = 'class' Name ObjectBody
    fn parse_class(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, CLASS_DEF);
        self.bump();
        if !self.parse_name() {
            self.error("expected class name");
        }
        if self.at(L_BRACE) {
            self.parse_object_body();
        } else {
            self.error("expected class body");
        }
        self.finish_node();
    }

    /// Listener = 'listener' TypeDesc? Name '=' Expr ';'
    fn parse_listener(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, LISTENER_DECL);
        self.bump();
        if !(self.at(IDENT) && self.nth(1) == EQ) {
            self.parse_type_desc();
        }
        self.parse_name();
        if self.eat(EQ) {
            self.parse_expr();
        }
        self.expect(SEMICOLON);
        self.finish_node();
    }

    /// `TypeDesc Name ('=' Expr)? ';'` shared by module variables, object
    /// fields and local variables.
    fn parse_var_like(&mut self, cp: Checkpoint, kind: SyntaxKind) {
        self.start_node_at(cp, kind);
        self.eat(FINAL_KW);
        self.parse_type_desc();
        self.parse_name();
        if self.eat(EQ) {
            self.parse_expr();
        }
        self.expect(SEMICOLON);
        self.finish_node();
    }

    // =========================================================================
    // Names and annotations
    // =========================================================================

    /// Name = IDENT. Reports nothing when absent; callers decide.
    fn parse_name(&mut self) -> bool {
        if self.at(IDENT) {
            self.start_node(NAME);
            self.bump();
            self.finish_node();
            true
        } else {
            false
        }
    }

    /// Name that may also be a keyword, as after `.` or `->`
    fn parse_member_name(&mut self) {
        self.start_node(NAME);
        self.bump();
        self.finish_node();
    }

    /// QualifiedName = IDENT (':' IDENT)?
    fn parse_qualified_name(&mut self) {
        self.start_node(QUALIFIED_NAME);
        self.bump();
        if self.at(COLON) && self.nth(1) == IDENT {
            self.bump();
            self.bump();
        }
        self.finish_node();
    }

    fn parse_annotations(&mut self) {
        while self.at(AT) {
            self.parse_annotation();
        }
    }

    /// Annotation = '@' QualifiedName MappingConstructor?
    fn parse_annotation(&mut self) {
        self.start_node(ANNOTATION);
        self.bump();
        if self.at(IDENT) {
            self.parse_qualified_name();
        } else {
            self.error("expected annotation name");
        }
        if self.at(L_BRACE) {
            self.parse_mapping_constructor();
        }
        self.finish_node();
    }

    /// MappingConstructor = '{' (MappingField (',' MappingField)*)? '}'
    fn parse_mapping_constructor(&mut self) {
        self.start_node(MAPPING_CONSTRUCTOR);
        self.bump();

        while !self.at_eof() && !self.at(R_BRACE) {
            if self.at(DOT_DOT_DOT) {
                self.start_node(MAPPING_FIELD);
                self.bump();
                self.parse_expr();
                self.finish_node();
            } else if self.at(STRING) || is_name_like(self.current_kind()) {
                self.start_node(MAPPING_FIELD);
                self.bump();
                if self.eat(COLON) {
                    if self.at_any(&[COMMA, R_BRACE]) || self.at_eof() {
                        // `key: ,` keeps its key; the value is simply absent
                        self.error("expected value expression");
                    } else {
                        self.with_mapping(|p| p.parse_expr());
                    }
                }
                self.finish_node();
            } else {
                self.error_recover("expected mapping field", &[COMMA, R_BRACE]);
            }

            if !self.eat(COMMA) {
                break;
            }
        }

        self.expect(R_BRACE);
        self.finish_node();
    }

    // =========================================================================
    // Type descriptors
    // =========================================================================

    /// TypeDesc = PostfixType ('|' PostfixType)*
    fn parse_type_desc(&mut self) {
        let cp = self.checkpoint();
        self.parse_postfix_type();
        if self.at(PIPE) && self.nth(1) != R_BRACE {
            self.start_node_at(cp, UNION_TYPE);
            while self.at(PIPE) && self.nth(1) != R_BRACE {
                self.bump();
                self.parse_postfix_type();
            }
            self.finish_node();
        }
    }

    /// PostfixType = PrimaryType ('?' | '[' INTEGER? ']')*
    fn parse_postfix_type(&mut self) {
        let cp = self.checkpoint();
        self.parse_primary_type();
        loop {
            if self.at(QUESTION) {
                self.start_node_at(cp, OPTIONAL_TYPE);
                self.bump();
                self.finish_node();
            } else if self.at(L_BRACKET)
                && (self.nth(1) == R_BRACKET
                    || (self.nth(1) == INTEGER && self.nth(2) == R_BRACKET))
            {
                self.start_node_at(cp, ARRAY_TYPE);
                self.bump();
                self.eat(INTEGER);
                self.bump();
                self.finish_node();
            } else {
                break;
            }
        }
    }

    fn parse_primary_type(&mut self) {
        match self.current_kind() {
            L_PAREN if self.nth(1) == R_PAREN => {
                self.start_node(NIL_TYPE);
                self.bump();
                self.bump();
                self.finish_node();
            }
            L_PAREN => {
                self.start_node(PAREN_TYPE);
                self.bump();
                self.parse_type_desc();
                self.expect(R_PAREN);
                self.finish_node();
            }
            RECORD_KW => self.parse_record_type(),
            IDENT => {
                self.start_node(TYPE_REF);
                self.parse_qualified_name();
                if self.at(LT) {
                    self.parse_type_args();
                }
                self.finish_node();
            }
            VAR_KW => {
                self.start_node(TYPE_REF);
                self.bump();
                self.finish_node();
            }
            _ => self.error("expected type"),
        }
    }

    /// TypeArgs = '<' TypeDesc (',' TypeDesc)* '>'
    fn parse_type_args(&mut self) {
        self.start_node(TYPE_ARGS);
        self.bump();
        self.parse_type_desc();
        while self.eat(COMMA) {
            self.parse_type_desc();
        }
        self.expect(GT);
        self.finish_node();
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Block = '{' Statement* '}'
    fn parse_block(&mut self) {
        self.start_node(BLOCK);
        self.bump();

        while !self.at_eof() && !self.at(R_BRACE) {
            let before = self.peek_index(0);
            self.parse_statement();
            if self.peek_index(0) == before {
                self.recover_statement("unexpected token in block");
            }
        }

        self.expect(R_BRACE);
        self.finish_node();
    }

    fn parse_statement(&mut self) {
        match self.current_kind() {
            L_BRACE => self.parse_block(),
            IF_KW => self.parse_if(),
            WHILE_KW => {
                self.start_node(WHILE_STMT);
                self.bump();
                self.parse_condition();
                self.parse_body();
                self.finish_node();
            }
            FOREACH_KW => {
                self.start_node(FOREACH_STMT);
                self.bump();
                self.parse_type_desc();
                self.parse_name();
                self.expect(IN_KW);
                self.parse_condition();
                self.parse_body();
                self.finish_node();
            }
            LOCK_KW => {
                self.start_node(LOCK_STMT);
                self.bump();
                self.parse_body();
                self.finish_node();
            }
            FORK_KW => self.parse_fork(),
            RETURN_KW => {
                self.start_node(RETURN_STMT);
                self.bump();
                if !self.at(SEMICOLON) {
                    self.parse_expr();
                }
                self.expect(SEMICOLON);
                self.finish_node();
            }
            BREAK_KW | CONTINUE_KW => {
                let kind = if self.at(BREAK_KW) {
                    BREAK_STMT
                } else {
                    CONTINUE_STMT
                };
                self.start_node(kind);
                self.bump();
                self.expect(SEMICOLON);
                self.finish_node();
            }
            WORKER_KW | AT => {
                let cp = self.checkpoint();
                let start = self.pos;
                self.parse_annotations();
                if self.at(WORKER_KW) {
                    self.parse_worker(cp);
                } else if self.looks_like_var_decl() {
                    self.parse_var_like(cp, VAR_DECL);
                } else {
                    self.recover_at(cp, start, "expected worker or variable", STMT_RECOVERY);
                }
            }
            _ if self.looks_like_var_decl() => {
                let cp = self.checkpoint();
                self.parse_var_like(cp, VAR_DECL);
            }
            _ if self.at_expr_start() => self.parse_expr_stmt(),
            kind => self.recover_statement(format!("unexpected token: {:?}", kind)),
        }
    }

    fn parse_body(&mut self) {
        if self.at(L_BRACE) {
            self.parse_block();
        } else {
            self.error("expected block");
        }
    }

    /// If = 'if' Expr Block ('else' (If | Block))?
    fn parse_if(&mut self) {
        self.start_node(IF_STMT);
        self.bump();
        self.parse_condition();
        self.parse_body();
        if self.at(ELSE_KW) {
            self.start_node(ELSE_CLAUSE);
            self.bump();
            if self.at(IF_KW) {
                self.parse_if();
            } else {
                self.parse_body();
            }
            self.finish_node();
        }
        self.finish_node();
    }

    /// Fork = 'fork' '{' Worker* '}'
    fn parse_fork(&mut self) {
        self.start_node(FORK_STMT);
        self.bump();
        if self.expect(L_BRACE) {
            while !self.at_eof() && !self.at(R_BRACE) {
                let cp = self.checkpoint();
                let start = self.pos;
                self.parse_annotations();
                if self.at(WORKER_KW) {
                    self.parse_worker(cp);
                } else {
                    self.recover_at(cp, start, "expected worker", &[WORKER_KW, R_BRACE]);
                }
            }
            self.expect(R_BRACE);
        }
        self.finish_node();
    }

    /// Worker = 'worker' Name ReturnType? Block
    fn parse_worker(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, WORKER_DECL);
        self.bump();
        if !self.parse_name() {
            self.error("expected worker name");
        }
        if self.at(RETURNS_KW) {
            self.parse_return_type();
        }
        self.parse_body();
        self.finish_node();
    }

    /// ExprStmt = Expr ';' | Expr ('=' | '+=' | '-=') Expr ';'
    fn parse_expr_stmt(&mut self) {
        let cp = self.checkpoint();
        self.parse_expr();
        if self.at_any(&[EQ, PLUS_EQ, MINUS_EQ]) {
            self.start_node_at(cp, ASSIGN_STMT);
            self.bump();
            self.parse_expr();
        } else {
            self.start_node_at(cp, EXPR_STMT);
        }
        self.expect(SEMICOLON);
        self.finish_node();
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expr(&mut self) {
        self.parse_binary(0);
    }

    /// Expression in a position directly followed by a block.
    fn parse_condition(&mut self) {
        let prev = std::mem::replace(&mut self.no_mapping, true);
        self.parse_expr();
        self.no_mapping = prev;
    }

    fn parse_binary(&mut self, min_bp: u8) {
        let cp = self.checkpoint();
        self.parse_unary();
        while let Some(bp) = binary_bp(self.current_kind()) {
            if self.at_eof() || bp < min_bp {
                break;
            }
            self.start_node_at(cp, BINARY_EXPR);
            self.bump();
            self.parse_binary(bp + 1);
            self.finish_node();
        }
    }

    fn parse_unary(&mut self) {
        match self.current_kind() {
            BANG | MINUS | PLUS | START_KW | WAIT_KW => {
                self.start_node(UNARY_EXPR);
                self.bump();
                self.parse_unary();
                self.finish_node();
            }
            CHECK_KW | CHECKPANIC_KW => {
                self.start_node(CHECK_EXPR);
                self.bump();
                self.parse_unary();
                self.finish_node();
            }
            LEFT_ARROW => {
                self.start_node(RECEIVE_ACTION);
                self.bump();
                if self.at_any(&[IDENT, FUNCTION_KW]) {
                    self.parse_member_name();
                } else {
                    self.error("expected worker name");
                }
                self.finish_node();
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) {
        let cp = self.checkpoint();
        if !self.parse_primary() {
            return;
        }
        loop {
            match self.current_kind() {
                _ if self.at_eof() => break,
                DOT if is_name_like(self.nth(1)) => {
                    let kind = if self.nth(2) == L_PAREN {
                        METHOD_CALL
                    } else {
                        FIELD_ACCESS
                    };
                    self.start_node_at(cp, kind);
                    self.bump();
                    self.parse_member_name();
                    if kind == METHOD_CALL {
                        self.parse_arg_list();
                    }
                    self.finish_node();
                }
                L_PAREN => {
                    self.start_node_at(cp, CALL_EXPR);
                    self.parse_arg_list();
                    self.finish_node();
                }
                L_BRACKET => {
                    self.start_node_at(cp, INDEX_EXPR);
                    self.bump();
                    self.with_mapping(|p| p.parse_expr());
                    self.expect(R_BRACKET);
                    self.finish_node();
                }
                ARROW => match self.nth(1) {
                    SLASH => self.parse_resource_access(cp),
                    IDENT if self.nth(2) == L_PAREN => {
                        self.start_node_at(cp, REMOTE_METHOD_CALL);
                        self.bump();
                        self.parse_member_name();
                        self.parse_arg_list();
                        self.finish_node();
                    }
                    IDENT | FUNCTION_KW => {
                        self.start_node_at(cp, SEND_ACTION);
                        self.bump();
                        self.parse_member_name();
                        self.finish_node();
                    }
                    _ => break,
                },
                _ => break,
            }
        }
    }

    /// ClientResourceAccess = Expr '->' ('/' Segment?)+ ('.' Name)? ArgList?
    fn parse_resource_access(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, CLIENT_RESOURCE_ACCESS);
        self.bump();

        self.start_node(RESOURCE_PATH);
        while self.eat(SLASH) {
            if self.at(L_BRACKET) {
                self.bump();
                self.with_mapping(|p| p.parse_expr());
                self.expect(R_BRACKET);
            } else if self.at(STRING) || (!self.at_eof() && is_name_like(self.current_kind())) {
                self.bump();
            }
        }
        self.finish_node();

        if self.at(DOT) && is_name_like(self.nth(1)) {
            self.bump();
            self.parse_member_name();
        }
        if self.at(L_PAREN) {
            self.parse_arg_list();
        }
        self.finish_node();
    }

    /// Returns false (having reported an error) when no expression starts here.
    fn parse_primary(&mut self) -> bool {
        match self.current_kind() {
            _ if self.at_eof() => {
                self.error("expected expression");
                return false;
            }
            INTEGER | DECIMAL | STRING | TRUE_KW | FALSE_KW | NULL_KW | QUESTION => {
                self.start_node(LITERAL);
                self.bump();
                self.finish_node();
            }
            L_PAREN if self.nth(1) == R_PAREN => {
                self.start_node(LITERAL);
                self.bump();
                self.bump();
                self.finish_node();
            }
            L_PAREN => {
                self.start_node(PAREN_EXPR);
                self.bump();
                self.with_mapping(|p| p.parse_expr());
                self.expect(R_PAREN);
                self.finish_node();
            }
            IDENT => {
                self.start_node(NAME_REF);
                self.parse_qualified_name();
                self.finish_node();
            }
            SELF_KW => {
                self.start_node(NAME_REF);
                self.bump();
                self.finish_node();
            }
            NEW_KW => {
                self.start_node(NEW_EXPR);
                self.bump();
                if self.at(IDENT) {
                    self.start_node(TYPE_REF);
                    self.parse_qualified_name();
                    self.finish_node();
                }
                if self.at(L_PAREN) {
                    self.parse_arg_list();
                }
                self.finish_node();
            }
            L_BRACKET => {
                self.start_node(LIST_EXPR);
                self.bump();
                self.with_mapping(|p| {
                    if !p.at(R_BRACKET) {
                        loop {
                            p.parse_expr();
                            if !p.eat(COMMA) {
                                break;
                            }
                        }
                    }
                });
                self.expect(R_BRACKET);
                self.finish_node();
            }
            L_BRACE if !self.no_mapping => self.parse_mapping_constructor(),
            _ => {
                self.error("expected expression");
                return false;
            }
        }
        true
    }

    /// ArgList = '(' ((Name '=')? Expr (',' (Name '=')? Expr)*)? ')'
    fn parse_arg_list(&mut self) {
        self.start_node(ARG_LIST);
        self.bump();
        self.with_mapping(|p| {
            if !p.at(R_PAREN) {
                loop {
                    if p.at(IDENT) && p.nth(1) == EQ {
                        p.bump();
                        p.bump();
                    }
                    p.parse_expr();
                    if !p.eat(COMMA) {
                        break;
                    }
                }
            }
        });
        self.expect(R_PAREN);
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_of(source: &str) -> Vec<SyntaxKind> {
        parse(source)
            .syntax()
            .descendants()
            .map(|n| n.kind())
            .collect()
    }

    #[test]
    fn test_parse_empty() {
        let parse = parse("");
        assert!(parse.ok());
        assert_eq!(parse.syntax().kind(), SyntaxKind::SOURCE_FILE);
    }

    #[test]
    fn test_parse_is_lossless() {
        let source = "import ballerina/http;\n\n// svc\nservice /api on new http:Listener(9090) {\n    resource function get users() returns string {\n        return \"x\";\n    }\n}\n";
        let parse = parse(source);
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        assert_eq!(parse.syntax().text().to_string(), source);
    }

    #[test]
    fn test_parse_import_with_prefix() {
        let parse = parse("import ballerinax/mysql.driver as _;");
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        let kinds = kinds_of("import ballerinax/mysql.driver as _;");
        assert!(kinds.contains(&IMPORT_DECL));
        assert!(kinds.contains(&IMPORT_PREFIX));
    }

    #[test]
    fn test_parse_resource_function_with_path_params() {
        let source = "service / on ep {\n  resource function get users/[int id]/orders(@http:Header string auth, int 'limit = 10) returns Order[]|error {\n  }\n}";
        let parse = parse(source);
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        let kinds = kinds_of(source);
        assert!(kinds.contains(&RESOURCE_PATH));
        assert!(kinds.contains(&PATH_PARAM));
        assert!(kinds.contains(&UNION_TYPE));
        assert!(kinds.contains(&ARRAY_TYPE));
    }

    #[test]
    fn test_parse_client_actions() {
        let source = "function f() {\n  json a = check c->get(\"/x\");\n  var b = c->/users/[id].post(payload);\n  a -> w2;\n  int v = <- w1;\n}";
        let parse = parse(source);
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        let kinds = kinds_of(source);
        assert!(kinds.contains(&REMOTE_METHOD_CALL));
        assert!(kinds.contains(&CLIENT_RESOURCE_ACCESS));
        assert!(kinds.contains(&SEND_ACTION));
        assert!(kinds.contains(&RECEIVE_ACTION));
        assert!(kinds.contains(&CHECK_EXPR));
    }

    #[test]
    fn test_parse_control_flow() {
        let source = "function f() {\n  if x > 1 { a(); } else if y { b(); } else { c(); }\n  while i < 3 { i += 1; }\n  foreach int i in 0 ..< 5 { }\n  lock { n = n + 1; }\n  fork { worker w1 { } worker w2 returns int { return 1; } }\n}";
        let parse = parse(source);
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        let kinds = kinds_of(source);
        for kind in [
            IF_STMT,
            ELSE_CLAUSE,
            WHILE_STMT,
            FOREACH_STMT,
            LOCK_STMT,
            FORK_STMT,
            WORKER_DECL,
            ASSIGN_STMT,
        ] {
            assert!(kinds.contains(&kind), "missing {:?}", kind);
        }
    }

    #[test]
    fn test_condition_does_not_swallow_block_as_mapping() {
        let parse = parse("function f() { if ok { return; } }");
        assert!(parse.ok(), "errors: {:?}", parse.errors);
        let kinds = kinds_of("function f() { if ok { return; } }");
        assert!(!kinds.contains(&MAPPING_CONSTRUCTOR));
    }

    #[test]
    fn test_missing_function_name_reports_without_error_node() {
        let parse = parse("function (int a) { }");
        assert!(!parse.ok());
        let kinds = kinds_of("function (int a) { }");
        assert!(kinds.contains(&FUNCTION_DEF));
        assert!(!kinds.contains(&ERROR));
    }

    #[test]
    fn test_annotation_field_without_value_keeps_structure() {
        let source = "@display { label: , id: \"svc\" }\nservice / on ep { }";
        let kinds = kinds_of(source);
        assert!(kinds.contains(&SERVICE_DECL));
        assert!(kinds.contains(&MAPPING_FIELD));
        assert!(!kinds.contains(&ERROR));
    }

    #[test]
    fn test_garbage_statement_is_contained_in_error_node() {
        let source = "function f() {\n  int a = 1;\n  % % ;\n  int b = 2;\n}";
        let parse = parse(source);
        assert!(!parse.ok());
        let root = parse.syntax();
        let errors: Vec<_> = root.descendants().filter(|n| n.kind() == ERROR).collect();
        assert_eq!(errors.len(), 1);
        let decls = root.descendants().filter(|n| n.kind() == VAR_DECL).count();
        assert_eq!(decls, 2);
    }

    #[test]
    fn test_node_ranges_exclude_surrounding_trivia() {
        let source = "  type Point record { int x; };  ";
        let root = parse(source).syntax();
        let type_def = root.descendants().find(|n| n.kind() == TYPE_DEF).unwrap();
        assert_eq!(type_def.text().to_string(), "type Point record { int x; };");
    }
}
