//! Extraction pipeline: locate → visit → resolve → assemble.
//!
//! Each stage is a plain function over immutable inputs. The visitor returns
//! entities plus the reference sites it saw; the resolver turns sites into
//! references; the assembler enforces the model invariants.

use std::sync::Arc;

use text_size::TextRange;

use crate::base::{LineIndex, SourceSpan};
use crate::parser::{SyntaxError, SyntaxNode};

pub mod annotation;
pub mod assembler;
pub mod identity;
pub mod locate;
pub mod pipeline;
pub mod resolver;
pub mod scope;
pub mod visitor;

pub use annotation::read_display;
pub use assembler::assemble;
pub use locate::{extraction_root, locate};
pub use pipeline::{extract, extract_source};
pub use resolver::resolve;
pub use visitor::{ReferenceSite, SiteKind, Visit, visit};

/// Maps syntax ranges of one file to [`SourceSpan`]s and carries the
/// file's parse errors.
#[derive(Debug, Clone)]
pub struct SourceMap<'a> {
    file_path: Arc<str>,
    line_index: &'a LineIndex,
    syntax_errors: &'a [SyntaxError],
}

impl<'a> SourceMap<'a> {
    pub fn new(file_path: impl Into<Arc<str>>, line_index: &'a LineIndex) -> Self {
        Self {
            file_path: file_path.into(),
            line_index,
            syntax_errors: &[],
        }
    }

    pub fn with_syntax_errors(mut self, errors: &'a [SyntaxError]) -> Self {
        self.syntax_errors = errors;
        self
    }

    /// Errors the parser recovered from.
    pub fn syntax_errors(&self) -> &'a [SyntaxError] {
        self.syntax_errors
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn line_index(&self) -> &'a LineIndex {
        self.line_index
    }

    /// Span of `node`, excluding surrounding trivia.
    pub fn span(&self, node: &SyntaxNode) -> SourceSpan {
        self.span_of_range(node.text_range())
    }

    pub fn span_of_range(&self, range: TextRange) -> SourceSpan {
        SourceSpan::new(self.file_path.clone(), self.line_index.span(range))
    }
}
