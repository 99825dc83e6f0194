//! Error types for extraction requests.

use thiserror::Error;

use crate::base::{Span, SourceSpan};

/// Errors that end an extraction request early.
///
/// Recoverable errors ([`NotFound`](Self::NotFound),
/// [`StaleLocation`](Self::StaleLocation),
/// [`StaleSemanticModel`](Self::StaleSemanticModel)) mean the caller should
/// re-sync the document and retry. Problems with a single construct never
/// surface here; they become diagnostics on the model.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The span does not resolve against the current tree.
    #[error("no syntax node covers {span}")]
    NotFound { span: Span },

    /// The span was computed against a different document version.
    #[error("location computed against version {requested}, document is at {current:?}")]
    StaleLocation { requested: i32, current: Option<i32> },

    /// The semantic context was built for a different document version.
    #[error("semantic model is at version {semantic:?}, document is at {document:?}")]
    StaleSemanticModel {
        semantic: Option<i32>,
        document: Option<i32>,
    },

    /// A single construct could not be extracted.
    #[error("failed to extract {construct} at {span}: {message}")]
    SubtreeExtraction {
        construct: &'static str,
        span: SourceSpan,
        message: String,
    },

    /// The requested file is not known to the host.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExtractError {
    /// Caller should re-sync and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractError::NotFound { .. }
                | ExtractError::StaleLocation { .. }
                | ExtractError::StaleSemanticModel { .. }
        )
    }

    pub fn subtree(construct: &'static str, span: SourceSpan, message: impl Into<String>) -> Self {
        Self::SubtreeExtraction {
            construct,
            span,
            message: message.into(),
        }
    }
}

/// Errors loading an extractor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error during read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is neither YAML nor JSON.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}
