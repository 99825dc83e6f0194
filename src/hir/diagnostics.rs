//! Diagnostics — recoverable extraction problems.
//!
//! A diagnostic is attached to the extraction result and never halts the
//! extraction of sibling constructs.

use serde::{Deserialize, Serialize};

use crate::base::SourceSpan;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message with an optional location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedInfo {
    pub span: SourceSpan,
    pub message: String,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            span: None,
            related: Vec::new(),
        }
    }

    /// Set the location of this diagnostic.
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: Extraction failures of a single construct
/// - **W0001-W0099**: Warnings (dropped duplicates, malformed metadata)
pub mod codes {
    /// A construct could not be turned into an entity, e.g. it has no name.
    pub const SUBTREE_EXTRACTION: &str = "E0001";
    /// Unrecognized syntax skipped by the parser.
    pub const MALFORMED_SYNTAX: &str = "E0002";

    /// A nested entity reused an identifier already taken elsewhere.
    pub const DUPLICATE_ENTITY: &str = "W0001";
    /// A display annotation field is present but has no usable value.
    pub const MALFORMED_ANNOTATION_FIELD: &str = "W0002";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during one extraction pass.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record a construct whose extraction failed.
    pub fn subtree_failure(&mut self, span: SourceSpan, code: &str, message: impl Into<String>) {
        tracing::debug!(%span, code, "construct skipped");
        self.add(Diagnostic::error(message).with_span(span).with_code(code));
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take ownership of the collected diagnostics.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Get error count.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Get warning count.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Span;

    #[test]
    fn test_collector_counts_by_severity() {
        let span = SourceSpan::new("main.bal", Span::from_coords(3, 0, 5, 1));
        let mut collector = DiagnosticCollector::new();
        collector.subtree_failure(span.clone(), codes::MALFORMED_SYNTAX, "unrecognized syntax");
        collector.add(
            Diagnostic::warning("annotation field `label` has no value")
                .with_code(codes::MALFORMED_ANNOTATION_FIELD),
        );

        assert_eq!(collector.error_count(), 1);
        assert_eq!(collector.warning_count(), 1);
        assert!(collector.has_errors());
        assert_eq!(collector.diagnostics()[0].span, Some(span));
    }

    #[test]
    fn test_diagnostic_serializes_camel_case() {
        let diagnostic = Diagnostic::error("boom").with_code(codes::SUBTREE_EXTRACTION);
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["code"], "E0001");
        assert!(json.get("span").is_none());
        let warning = serde_json::to_value(Severity::Warning).unwrap();
        assert_eq!(warning, "warning");
    }
}
