use crate::base::{LineIndex, Span};
use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::hir::{SemanticContext, SemanticModel};
use crate::model::Model;
use crate::parser::{AstNode, SourceFile, SyntaxNode, parse};

use super::{SourceMap, assemble, extraction_root, locate, resolve, visit};

/// Extract the model of the construct covering `span`.
///
/// Fails only when the span does not locate a node; problems inside the
/// located subtree are reported as diagnostics on the model.
pub fn extract(
    root: &SyntaxNode,
    source: &SourceMap<'_>,
    span: Span,
    semantic: &dyn SemanticContext,
    config: &ExtractorConfig,
) -> Result<Model, ExtractError> {
    let located = locate(root, source.line_index(), span)?;
    let node = extraction_root(&located);
    tracing::debug!(
        file = source.file_path(),
        %span,
        located = ?located.kind(),
        root = ?node.kind(),
        "extracting"
    );

    let visit = visit(&node, semantic, source, config);
    let references = resolve(&visit.sites, semantic, source, config);
    Ok(assemble(
        config.schema_version.clone(),
        visit.entities,
        references,
        visit.diagnostics,
    ))
}

/// Parse `text`, build its semantic model from `config` and extract.
pub fn extract_source(
    text: &str,
    file_path: &str,
    span: Span,
    config: &ExtractorConfig,
) -> Result<Model, ExtractError> {
    let parse = parse(text);
    let root = parse.syntax();
    let file = SourceFile::cast(root.clone()).ok_or(ExtractError::NotFound { span })?;
    let semantic = SemanticModel::builder(config.package.clone())
        .known_modules(&config.modules)
        .assume_clients_by_name(config.assume_clients_by_name)
        .build(&file);
    let index = LineIndex::new(text);
    let source = SourceMap::new(file_path, &index).with_syntax_errors(&parse.errors);
    extract(&root, &source, span, &semantic, config)
}
