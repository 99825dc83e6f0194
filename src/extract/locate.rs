//! Node locator: span → smallest covering syntax node.

use rowan::{NodeOrToken, TokenAtOffset};

use crate::base::{LineIndex, Span, TextSize};
use crate::error::ExtractError;
use crate::parser::{SyntaxKind, SyntaxNode};

/// Find the smallest node whose range contains `span`.
///
/// Fails with [`ExtractError::NotFound`] when the span lies outside the tree,
/// is inverted, or (for a non-empty span) has an endpoint strictly inside a
/// token. A zero-width span may sit anywhere.
pub fn locate(root: &SyntaxNode, index: &LineIndex, span: Span) -> Result<SyntaxNode, ExtractError> {
    let not_found = || ExtractError::NotFound { span };
    let range = index.range(span).ok_or_else(not_found)?;
    if !root.text_range().contains_range(range) {
        return Err(not_found());
    }
    if !range.is_empty() && (splits_token(root, range.start()) || splits_token(root, range.end())) {
        tracing::trace!(%span, "span endpoint splits a token");
        return Err(not_found());
    }

    let node = match root.covering_element(range) {
        NodeOrToken::Node(node) => node,
        NodeOrToken::Token(token) => token.parent().unwrap_or_else(|| root.clone()),
    };
    tracing::trace!(%span, kind = ?node.kind(), "located node");
    Ok(node)
}

fn splits_token(root: &SyntaxNode, offset: TextSize) -> bool {
    match root.token_at_offset(offset) {
        TokenAtOffset::Single(token) => {
            let range = token.text_range();
            !token.kind().is_trivia() && range.start() < offset && offset < range.end()
        }
        _ => false,
    }
}

/// Nearest ancestor (or `node` itself) the entity visitor knows how to walk.
pub fn extraction_root(node: &SyntaxNode) -> SyntaxNode {
    node.ancestors()
        .find(|n| is_extractable(n.kind()))
        .unwrap_or_else(|| node.clone())
}

fn is_extractable(kind: SyntaxKind) -> bool {
    use SyntaxKind::*;
    matches!(
        kind,
        SOURCE_FILE
            | SERVICE_DECL
            | FUNCTION_DEF
            | CLASS_DEF
            | TYPE_DEF
            | MODULE_VAR_DECL
            | LISTENER_DECL
            | OBJECT_FIELD
            | VAR_DECL
            | IF_STMT
            | WHILE_STMT
            | FOREACH_STMT
            | LOCK_STMT
            | FORK_STMT
            | WORKER_DECL
            | ERROR
    )
}
