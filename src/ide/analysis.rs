//! AnalysisHost and Analysis: document store and request snapshots.
//!
//! The `AnalysisHost` owns the mutable document table and hands out
//! `Analysis` snapshots. A snapshot holds `Arc`s to immutable documents, so a
//! request keeps working against the versions it started with while the host
//! applies further edits.
//!
//! ## Usage
//!
//! ```ignore
//! let host = AnalysisHost::new(config);
//! host.set_file_content("main.bal", source, Some(1));
//!
//! let analysis = host.analysis();
//! let response = analysis.respond(&ExtractionRequest::new("main.bal", span));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHasher};

use crate::base::LineIndex;
use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::extract::{SourceMap, extract};
use crate::hir::{SemanticContext, SemanticModel};
use crate::model::Model;
use crate::parser::{AstNode, GreenNode, SourceFile, SyntaxError, SyntaxNode, parse};

use super::request::{ExtractionRequest, ExtractionResponse};

/// One parsed document at one version.
pub struct Document {
    path: Arc<str>,
    version: Option<i32>,
    text: Arc<str>,
    green: GreenNode,
    errors: Arc<[SyntaxError]>,
    line_index: LineIndex,
    semantic: Arc<dyn SemanticContext>,
    content_hash: u64,
}

impl Document {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> Option<i32> {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// A fresh root over the shared green tree.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Errors the parser recovered from.
    pub fn syntax_errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn semantic(&self) -> &dyn SemanticContext {
        self.semantic.as_ref()
    }

    /// Hash of the document text.
    pub fn content_hash(&self) -> u64 {
        self.content_hash
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("version", &self.version)
            .field("semantic_revision", &self.semantic.revision())
            .field("content_hash", &self.content_hash)
            .finish_non_exhaustive()
    }
}

fn content_hash(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Owns all documents.
///
/// Apply changes via `set_file_content()`, `set_semantic()` and
/// `remove_file()`, then get a consistent snapshot via `analysis()`.
pub struct AnalysisHost {
    documents: RwLock<FxHashMap<Arc<str>, Arc<Document>>>,
    config: Arc<ExtractorConfig>,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl AnalysisHost {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            documents: RwLock::new(FxHashMap::default()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Parse `content` as version `version` of `path` and build its built-in
    /// semantic model. Returns the parse errors, which never prevent storing.
    pub fn set_file_content(
        &self,
        path: &str,
        content: &str,
        version: Option<i32>,
    ) -> Vec<SyntaxError> {
        let parse = parse(content);
        let Some(file) = SourceFile::cast(parse.syntax()) else {
            tracing::warn!(path, "parse produced no source file");
            return parse.errors;
        };
        let semantic = SemanticModel::builder(self.config.package.clone())
            .known_modules(&self.config.modules)
            .assume_clients_by_name(self.config.assume_clients_by_name)
            .revision(version)
            .build(&file);
        let path: Arc<str> = Arc::from(path);
        let document = Document {
            path: path.clone(),
            version,
            text: Arc::from(content),
            green: parse.green.clone(),
            errors: Arc::from(parse.errors.as_slice()),
            line_index: LineIndex::new(content),
            semantic: Arc::new(semantic),
            content_hash: content_hash(content),
        };
        tracing::debug!(
            path = %path,
            ?version,
            errors = parse.errors.len(),
            "document updated"
        );
        self.documents.write().insert(path, Arc::new(document));
        parse.errors
    }

    /// Replace the semantic context of `path` with one supplied by the host.
    ///
    /// Returns false when the document is unknown.
    pub fn set_semantic(&self, path: &str, semantic: Arc<dyn SemanticContext>) -> bool {
        let mut documents = self.documents.write();
        let Some(current) = documents.get(path) else {
            return false;
        };
        let document = Document {
            path: current.path.clone(),
            version: current.version,
            text: current.text.clone(),
            green: current.green.clone(),
            errors: current.errors.clone(),
            line_index: current.line_index.clone(),
            semantic,
            content_hash: current.content_hash,
        };
        documents.insert(document.path.clone(), Arc::new(document));
        true
    }

    pub fn remove_file(&self, path: &str) {
        self.documents.write().remove(path);
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.documents.read().contains_key(path)
    }

    pub fn file_count(&self) -> usize {
        self.documents.read().len()
    }

    /// Get a consistent snapshot for querying.
    pub fn analysis(&self) -> Analysis {
        Analysis {
            documents: self.documents.read().clone(),
            config: self.config.clone(),
        }
    }
}

/// An immutable snapshot of the documents.
///
/// Cheap to clone and `Send + Sync`; every request runs against exactly the
/// document versions present when the snapshot was taken.
#[derive(Debug, Clone)]
pub struct Analysis {
    documents: FxHashMap<Arc<str>, Arc<Document>>,
    config: Arc<ExtractorConfig>,
}

impl Analysis {
    pub fn document(&self, path: &str) -> Option<&Arc<Document>> {
        self.documents.get(path)
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The document `request` targets, provided the request and the
    /// document's semantic context are both at its current version.
    ///
    /// Fails with [`ExtractError::StaleLocation`] when the request names a
    /// different document version, and with
    /// [`ExtractError::StaleSemanticModel`] when the semantic context lags
    /// behind the document.
    pub fn check_current(&self, request: &ExtractionRequest) -> Result<&Arc<Document>, ExtractError> {
        let document = self
            .document(&request.file_path)
            .ok_or_else(|| ExtractError::DocumentNotFound(request.file_path.clone()))?;
        if let Some(requested) = request.version {
            if document.version != Some(requested) {
                return Err(ExtractError::StaleLocation {
                    requested,
                    current: document.version,
                });
            }
        }
        let revision = document.semantic.revision();
        if revision != document.version {
            return Err(ExtractError::StaleSemanticModel {
                semantic: revision,
                document: document.version,
            });
        }
        Ok(document)
    }

    /// Run one extraction request against a current document.
    pub fn extract(&self, request: &ExtractionRequest) -> Result<Model, ExtractError> {
        let document = self.check_current(request)?;

        let config = request.params.apply(&self.config);
        let source = SourceMap::new(document.path.clone(), &document.line_index)
            .with_syntax_errors(&document.errors);
        extract(
            &document.syntax(),
            &source,
            request.span,
            document.semantic(),
            &config,
        )
    }

    /// Run one request and wrap the outcome in a response envelope.
    pub fn respond(&self, request: &ExtractionRequest) -> ExtractionResponse {
        match self.extract(request) {
            Ok(model) => ExtractionResponse::from_model(model),
            Err(error) => {
                tracing::debug!(path = %request.file_path, %error, "extraction failed");
                ExtractionResponse::from_error(&error)
            }
        }
    }

    /// Answer a batch of requests in parallel. Responses keep request order.
    pub fn respond_all(&self, requests: &[ExtractionRequest]) -> Vec<ExtractionResponse> {
        requests
            .par_iter()
            .map(|request| self.respond(request))
            .collect()
    }
}
