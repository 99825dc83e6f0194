//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree
//! of the service language.

/// All syntax kinds (tokens and nodes) of the service language
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (services, functions, statements, expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,   // identifier
    INTEGER, // 42
    DECIMAL, // 3.14
    STRING,  // "hello"

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,     // {
    R_BRACE,     // }
    L_BRACKET,   // [
    R_BRACKET,   // ]
    L_PAREN,     // (
    R_PAREN,     // )
    SEMICOLON,   // ;
    COLON,       // :
    DOT,         // .
    DOT_DOT_DOT, // ...
    DOT_DOT_LT,  // ..<
    COMMA,       // ,
    EQ,          // =
    EQ_EQ,       // ==
    BANG_EQ,     // !=
    LT,          // <
    GT,          // >
    LT_EQ,       // <=
    GT_EQ,       // >=
    ARROW,       // ->
    LEFT_ARROW,  // <-
    FAT_ARROW,   // =>
    AT,          // @
    QUESTION,    // ?
    BANG,        // !
    PIPE,        // |
    AMP_AMP,     // &&
    PIPE_PIPE,   // ||
    PLUS,        // +
    MINUS,       // -
    STAR,        // *
    SLASH,       // /
    PERCENT,     // %
    PLUS_EQ,     // +=
    MINUS_EQ,    // -=

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    // Module level
    IMPORT_KW,
    AS_KW,
    TYPE_KW,
    RECORD_KW,
    CLASS_KW,
    LISTENER_KW,
    CONFIGURABLE_KW,

    // Services and members
    SERVICE_KW,
    ON_KW,
    RESOURCE_KW,
    REMOTE_KW,
    CLIENT_KW,
    FUNCTION_KW,
    RETURNS_KW,

    // Qualifiers
    PUBLIC_KW,
    PRIVATE_KW,
    FINAL_KW,
    ISOLATED_KW,

    // Statements
    VAR_KW,
    IF_KW,
    ELSE_KW,
    WHILE_KW,
    FOREACH_KW,
    IN_KW,
    LOCK_KW,
    FORK_KW,
    WORKER_KW,
    RETURN_KW,
    BREAK_KW,
    CONTINUE_KW,

    // Expressions
    CHECK_KW,
    CHECKPANIC_KW,
    NEW_KW,
    SELF_KW,
    START_KW,
    WAIT_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,

    // =========================================================================
    // COMPOSITE NODES (non-terminals in the grammar)
    // =========================================================================
    // Root
    SOURCE_FILE,

    // Module members
    IMPORT_DECL,
    MODULE_NAME,
    IMPORT_PREFIX,
    SERVICE_DECL,
    SERVICE_PATH,
    LISTENER_LIST,
    OBJECT_BODY,
    OBJECT_FIELD,
    FUNCTION_DEF,
    TYPE_DEF,
    RECORD_TYPE,
    RECORD_FIELD,
    CLASS_DEF,
    MODULE_VAR_DECL,
    LISTENER_DECL,

    // Annotations
    ANNOTATION,
    MAPPING_CONSTRUCTOR,
    MAPPING_FIELD,

    // Names
    NAME,
    QUALIFIED_NAME,

    // Signatures
    RESOURCE_PATH,
    PATH_PARAM,
    PARAM_LIST,
    PARAM,
    RETURN_TYPE,

    // Type descriptors
    TYPE_REF,
    TYPE_ARGS,
    UNION_TYPE,
    ARRAY_TYPE,
    OPTIONAL_TYPE,
    PAREN_TYPE,
    NIL_TYPE,

    // Statements
    BLOCK,
    VAR_DECL,
    ASSIGN_STMT,
    EXPR_STMT,
    IF_STMT,
    ELSE_CLAUSE,
    WHILE_STMT,
    FOREACH_STMT,
    LOCK_STMT,
    FORK_STMT,
    WORKER_DECL,
    RETURN_STMT,
    BREAK_STMT,
    CONTINUE_STMT,

    // Expressions
    LITERAL,
    NAME_REF,
    FIELD_ACCESS,
    INDEX_EXPR,
    CALL_EXPR,
    METHOD_CALL,
    REMOTE_METHOD_CALL,
    CLIENT_RESOURCE_ACCESS,
    SEND_ACTION,
    RECEIVE_ACTION,
    NEW_EXPR,
    CHECK_EXPR,
    UNARY_EXPR,
    BINARY_EXPR,
    PAREN_EXPR,
    LIST_EXPR,
    ARG_LIST,

    // Special
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::IMPORT_KW as u16) && (self as u16) <= (Self::NULL_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::MINUS_EQ as u16)
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INTEGER
                | Self::DECIMAL
                | Self::STRING
                | Self::TRUE_KW
                | Self::FALSE_KW
                | Self::NULL_KW
        )
    }

    /// Tokens that never carry a syntax node of their own.
    pub fn is_token(self) -> bool {
        (self as u16) < (Self::SOURCE_FILE as u16)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceLanguage {}

impl rowan::Language for ServiceLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<ServiceLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<ServiceLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<ServiceLanguage>;
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<ServiceLanguage>;
