//! Logos-based lexer for the service language
//!
//! Fast tokenization using the logos crate. Every byte of the input ends up
//! in exactly one token, so the parser can build a lossless tree.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    /// Quoted identifier, e.g. `'type` used as a field name
    #[regex(r"'[a-zA-Z_][a-zA-Z0-9_]*")]
    QuotedIdent,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    Decimal,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[regex(r"`[^`]*`")]
    Template,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token("...")]
    DotDotDot,
    #[token("..<")]
    DotDotLt,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("->")]
    Arrow,
    #[token("<-")]
    LeftArrow,
    #[token("=>")]
    FatArrow,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("@")]
    At,
    #[token("?")]
    Question,
    #[token("!")]
    Bang,
    #[token("|")]
    Pipe,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("import")]
    ImportKw,
    #[token("as")]
    AsKw,
    #[token("type")]
    TypeKw,
    #[token("record")]
    RecordKw,
    #[token("class")]
    ClassKw,
    #[token("listener")]
    ListenerKw,
    #[token("configurable")]
    ConfigurableKw,
    #[token("service")]
    ServiceKw,
    #[token("on")]
    OnKw,
    #[token("resource")]
    ResourceKw,
    #[token("remote")]
    RemoteKw,
    #[token("client")]
    ClientKw,
    #[token("function")]
    FunctionKw,
    #[token("returns")]
    ReturnsKw,
    #[token("public")]
    PublicKw,
    #[token("private")]
    PrivateKw,
    #[token("final")]
    FinalKw,
    #[token("isolated")]
    IsolatedKw,
    #[token("var")]
    VarKw,
    #[token("if")]
    IfKw,
    #[token("else")]
    ElseKw,
    #[token("while")]
    WhileKw,
    #[token("foreach")]
    ForeachKw,
    #[token("in")]
    InKw,
    #[token("lock")]
    LockKw,
    #[token("fork")]
    ForkKw,
    #[token("worker")]
    WorkerKw,
    #[token("return")]
    ReturnKw,
    #[token("break")]
    BreakKw,
    #[token("continue")]
    ContinueKw,
    #[token("check")]
    CheckKw,
    #[token("checkpanic")]
    CheckpanicKw,
    #[token("new")]
    NewKw,
    #[token("self")]
    SelfKw,
    #[token("start")]
    StartKw,
    #[token("wait")]
    WaitKw,
    #[token("true")]
    TrueKw,
    #[token("false")]
    FalseKw,
    #[token("null")]
    NullKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        use LogosToken::*;
        match token {
            // Trivia
            Whitespace => SyntaxKind::WHITESPACE,
            LineComment => SyntaxKind::LINE_COMMENT,
            BlockComment => SyntaxKind::BLOCK_COMMENT,

            // Literals
            Ident | QuotedIdent => SyntaxKind::IDENT,
            Integer => SyntaxKind::INTEGER,
            Decimal => SyntaxKind::DECIMAL,
            String | Template => SyntaxKind::STRING,

            // Multi-char punctuation
            DotDotDot => SyntaxKind::DOT_DOT_DOT,
            DotDotLt => SyntaxKind::DOT_DOT_LT,
            EqEq => SyntaxKind::EQ_EQ,
            BangEq => SyntaxKind::BANG_EQ,
            LtEq => SyntaxKind::LT_EQ,
            GtEq => SyntaxKind::GT_EQ,
            Arrow => SyntaxKind::ARROW,
            LeftArrow => SyntaxKind::LEFT_ARROW,
            FatArrow => SyntaxKind::FAT_ARROW,
            AmpAmp => SyntaxKind::AMP_AMP,
            PipePipe => SyntaxKind::PIPE_PIPE,
            PlusEq => SyntaxKind::PLUS_EQ,
            MinusEq => SyntaxKind::MINUS_EQ,

            // Single-char punctuation
            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            LBracket => SyntaxKind::L_BRACKET,
            RBracket => SyntaxKind::R_BRACKET,
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            Semicolon => SyntaxKind::SEMICOLON,
            Colon => SyntaxKind::COLON,
            Dot => SyntaxKind::DOT,
            Comma => SyntaxKind::COMMA,
            Eq => SyntaxKind::EQ,
            Lt => SyntaxKind::LT,
            Gt => SyntaxKind::GT,
            At => SyntaxKind::AT,
            Question => SyntaxKind::QUESTION,
            Bang => SyntaxKind::BANG,
            Pipe => SyntaxKind::PIPE,
            Plus => SyntaxKind::PLUS,
            Minus => SyntaxKind::MINUS,
            Star => SyntaxKind::STAR,
            Slash => SyntaxKind::SLASH,
            Percent => SyntaxKind::PERCENT,

            // Keywords
            ImportKw => SyntaxKind::IMPORT_KW,
            AsKw => SyntaxKind::AS_KW,
            TypeKw => SyntaxKind::TYPE_KW,
            RecordKw => SyntaxKind::RECORD_KW,
            ClassKw => SyntaxKind::CLASS_KW,
            ListenerKw => SyntaxKind::LISTENER_KW,
            ConfigurableKw => SyntaxKind::CONFIGURABLE_KW,
            ServiceKw => SyntaxKind::SERVICE_KW,
            OnKw => SyntaxKind::ON_KW,
            ResourceKw => SyntaxKind::RESOURCE_KW,
            RemoteKw => SyntaxKind::REMOTE_KW,
            ClientKw => SyntaxKind::CLIENT_KW,
            FunctionKw => SyntaxKind::FUNCTION_KW,
            ReturnsKw => SyntaxKind::RETURNS_KW,
            PublicKw => SyntaxKind::PUBLIC_KW,
            PrivateKw => SyntaxKind::PRIVATE_KW,
            FinalKw => SyntaxKind::FINAL_KW,
            IsolatedKw => SyntaxKind::ISOLATED_KW,
            VarKw => SyntaxKind::VAR_KW,
            IfKw => SyntaxKind::IF_KW,
            ElseKw => SyntaxKind::ELSE_KW,
            WhileKw => SyntaxKind::WHILE_KW,
            ForeachKw => SyntaxKind::FOREACH_KW,
            InKw => SyntaxKind::IN_KW,
            LockKw => SyntaxKind::LOCK_KW,
            ForkKw => SyntaxKind::FORK_KW,
            WorkerKw => SyntaxKind::WORKER_KW,
            ReturnKw => SyntaxKind::RETURN_KW,
            BreakKw => SyntaxKind::BREAK_KW,
            ContinueKw => SyntaxKind::CONTINUE_KW,
            CheckKw => SyntaxKind::CHECK_KW,
            CheckpanicKw => SyntaxKind::CHECKPANIC_KW,
            NewKw => SyntaxKind::NEW_KW,
            SelfKw => SyntaxKind::SELF_KW,
            StartKw => SyntaxKind::START_KW,
            WaitKw => SyntaxKind::WAIT_KW,
            TrueKw => SyntaxKind::TRUE_KW,
            FalseKw => SyntaxKind::FALSE_KW,
            NullKw => SyntaxKind::NULL_KW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        Lexer::new(input)
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn test_lex_service_header() {
        let tokens: Vec<_> = Lexer::new("service /api on ep {").collect();
        assert_eq!(tokens[0].kind, SyntaxKind::SERVICE_KW);
        assert_eq!(tokens[1].kind, SyntaxKind::WHITESPACE);
        assert_eq!(tokens[2].kind, SyntaxKind::SLASH);
        assert_eq!(tokens[3].kind, SyntaxKind::IDENT);
        assert_eq!(tokens[3].text, "api");
        assert_eq!(tokens[3].offset, TextSize::new(9));
    }

    #[test]
    fn test_lex_client_actions() {
        assert_eq!(
            kinds("c->get(x); c->/users.post();"),
            vec![
                SyntaxKind::IDENT,
                SyntaxKind::ARROW,
                SyntaxKind::IDENT,
                SyntaxKind::L_PAREN,
                SyntaxKind::IDENT,
                SyntaxKind::R_PAREN,
                SyntaxKind::SEMICOLON,
                SyntaxKind::IDENT,
                SyntaxKind::ARROW,
                SyntaxKind::SLASH,
                SyntaxKind::IDENT,
                SyntaxKind::DOT,
                SyntaxKind::IDENT,
                SyntaxKind::L_PAREN,
                SyntaxKind::R_PAREN,
                SyntaxKind::SEMICOLON,
            ]
        );
    }

    #[test]
    fn test_lex_keywords_do_not_swallow_identifiers() {
        assert_eq!(
            kinds("checkpanic check checked"),
            vec![
                SyntaxKind::CHECKPANIC_KW,
                SyntaxKind::CHECK_KW,
                SyntaxKind::IDENT
            ]
        );
    }

    #[test]
    fn test_lex_comment() {
        let tokens: Vec<_> = Lexer::new("// comment\nservice").collect();
        assert_eq!(tokens[0].kind, SyntaxKind::LINE_COMMENT);
        assert_eq!(tokens[1].kind, SyntaxKind::WHITESPACE);
        assert_eq!(tokens[2].kind, SyntaxKind::SERVICE_KW);
    }

    #[test]
    fn test_lex_is_lossless() {
        let input = "int x = 1.5 + \"a\\\"b\"; /* c */ y <- w;";
        let rebuilt: String = tokenize(input).iter().map(|t| t.text).collect();
        assert_eq!(rebuilt, input);
    }
}
