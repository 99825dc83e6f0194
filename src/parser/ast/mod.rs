//! Typed AST wrappers over the untyped rowan CST.
//!
//! This module provides strongly-typed accessors for service-language syntax
//! nodes. Each struct wraps a SyntaxNode and provides methods to access
//! children. The closed enums [`Item`], [`ObjectMember`], [`TypeDesc`],
//! [`Stmt`] and [`Expr`] are the recognized shapes the extractor matches on.

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

// ============================================================================
// Helper utilities for reducing code duplication
// ============================================================================

/// Strip the leading quote of a quoted identifier like `'type`.
#[inline]
fn strip_quoted_ident(text: &str) -> String {
    text.strip_prefix('\'').unwrap_or(text).to_string()
}

/// Strip the surrounding double quotes or backticks of a string literal.
#[inline]
pub fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| text.strip_prefix('`').and_then(|s| s.strip_suffix('`')));
    inner.unwrap_or(text).to_string()
}

/// Check if a syntax node has a direct child token of the specified kind.
///
/// Used for qualifier keywords like `resource`, `remote` or `final`.
#[inline]
fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| t.kind() == kind)
}

/// First direct child token of the given kind.
#[inline]
fn find_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Source text of a node with trivia dropped and tokens joined as written
/// when adjacent, or by a single space when trivia separated them.
pub fn compact_text(node: &SyntaxNode) -> String {
    let mut out = String::new();
    let mut pending_space = false;
    for token in node
        .descendants_with_tokens()
        .filter_map(|e| e.into_token())
    {
        if token.kind().is_trivia() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push_str(token.text());
    }
    out
}

/// Macro to generate boolean property methods that check for a specific token kind.
///
/// Usage:
/// ```ignore
/// impl MyStruct {
///     has_token_method!(is_remote, REMOTE_KW, "remote function f() {}");
/// }
/// ```
macro_rules! has_token_method {
    ($name:ident, $kind:ident) => {
        #[doc = concat!("Check if this node has the `", stringify!($kind), "` token.")]
        pub fn $name(&self) -> bool {
            has_token(&self.0, SyntaxKind::$kind)
        }
    };
    ($name:ident, $kind:ident, $example:literal) => {
        #[doc = concat!("Check if this node has the `", stringify!($kind), "` token (e.g., `", $example, "`).")]
        pub fn $name(&self) -> bool {
            has_token(&self.0, SyntaxKind::$kind)
        }
    };
}

/// Macro to generate a method that finds the first child of a specific AST type.
///
/// Usage:
/// ```ignore
/// impl MyStruct {
///     first_child_method!(name, Name);
///     first_child_method!(body, Block);
/// }
/// ```
macro_rules! first_child_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get the first `", stringify!($type), "` child of this node.")]
        pub fn $name(&self) -> Option<$type> {
            self.0.children().find_map($type::cast)
        }
    };
}

/// Macro to generate a method that returns an iterator over children of a specific AST type.
///
/// Usage:
/// ```ignore
/// impl MyStruct {
///     children_method!(annotations, Annotation);
/// }
/// ```
macro_rules! children_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get all `", stringify!($type), "` children of this node.")]
        pub fn $name(&self) -> impl Iterator<Item = $type> + '_ {
            self.0.children().filter_map($type::cast)
        }
    };
}

/// Macro to generate a method that gets the first child node of a type after a specific token.
///
/// Usage:
/// ```ignore
/// impl MyStruct {
///     child_after_token_method!(initializer, Expr, EQ, "Expression after `=`.");
/// }
/// ```
macro_rules! child_after_token_method {
    ($name:ident, $type:ident, $token:ident, $doc:literal) => {
        #[doc = $doc]
        pub fn $name(&self) -> Option<$type> {
            let mut seen_token = false;
            for child in self.0.children_with_tokens() {
                match child {
                    rowan::NodeOrToken::Token(t) if t.kind() == SyntaxKind::$token => {
                        seen_token = true;
                    }
                    rowan::NodeOrToken::Node(n) if seen_token => {
                        if let Some(result) = $type::cast(n) {
                            return Some(result);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
    };
}

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;

    /// Find all descendant nodes of a specific AST type
    fn descendants<T: AstNode>(&self) -> impl Iterator<Item = T> {
        self.syntax().descendants().filter_map(T::cast)
    }

    /// Trivia-free source text of this node.
    fn source_text(&self) -> String {
        compact_text(self.syntax())
    }
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

/// Closed sum over several node kinds, one wrapper per variant.
macro_rules! ast_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident($type:ident) = $kind:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant($type),)+
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                match node.kind() {
                    $(SyntaxKind::$kind => Some(Self::$variant($type(node))),)+
                    _ => None,
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                match self {
                    $(Self::$variant(n) => n.syntax(),)+
                }
            }
        }
    };
}

// Submodules are declared after the macros so macro_rules! are in scope
mod expressions;
mod items;
mod statements;
mod types;

// Re-export all public types so external code sees a flat namespace
pub use self::expressions::*;
pub use self::items::*;
pub use self::statements::*;
pub use self::types::*;

#[cfg(test)]
mod tests;
