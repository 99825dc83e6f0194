//! # modelgen
//!
//! Span-scoped model extraction for a service-oriented language: given a
//! source file and a span, produce the entities declared in that span and
//! the references between them, ready for diagram rendering.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → Document store, snapshots, request/response envelope
//!   ↓
//! extract   → locate → visit → resolve → assemble
//!   ↓
//! model     → Entity, Reference, Model, id derivation
//!   ↓
//! hir       → Module identities, resolved types, diagnostics
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, typed AST
//!   ↓
//! base      → Primitives (LineIndex, Span, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → hir → model → extract → ide)
// ============================================================================

/// Foundation types: line index, positions, text ranges
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, typed AST
pub mod parser;

/// High-level IR: modules, types, semantic context, diagnostics
pub mod hir;

/// Extracted entity graph
pub mod model;

/// Extraction pipeline
pub mod extract;

/// Document store and request handling
pub mod ide;

/// Extractor configuration
pub mod config;

/// Error types
pub mod error;

// Re-export foundation types
pub use base::{LineCol, LineIndex, Position, SourceSpan, Span, TextRange, TextSize};

pub use config::{AnnotationPolicy, ExtractorConfig, Leniency};
pub use error::{ConfigError, ExtractError};
pub use extract::{extract, extract_source};
pub use hir::{Diagnostic, ModuleDescriptor, ModuleId, SemanticContext, SemanticModel, Severity};
pub use ide::{Analysis, AnalysisHost, ExtractionRequest, ExtractionResponse, ModelCache};
pub use model::{AnonymousIds, Entity, EntityKind, Model, RefKind, Reference, ReferenceTarget};
