//! High-level IR (HIR) — module identities, resolved types and diagnostics.
//!
//! ## Key Types
//!
//! - [`ModuleId`] - `{org}/{name}:{version}` identity of a module
//! - [`ModuleDescriptor`] - what is known about an imported module
//! - [`TypeSymbol`] - a resolved type descriptor
//! - [`SemanticContext`] - symbol lookup used by the extractor
//! - [`SemanticModel`] - built-in context derived from a parsed file
//! - [`Diagnostic`] - a recoverable extraction problem
//!
//! ## Resolution
//!
//! ```text
//! SourceFile + ModuleDescriptors
//!     │
//!     ▼
//! SemanticModel             ← imports, module-level symbols
//!     │
//!     ▼
//! resolve_type(TypeDesc)    ← TypeSymbol, or Unresolved(source text)
//!     │
//!     ▼
//! referenced_type_names     ← names used in the model
//! ```

mod diagnostics;
mod module;
mod semantic;
mod types;

pub use diagnostics::{Diagnostic, DiagnosticCollector, RelatedInfo, Severity, codes};
pub use module::{ModuleDescriptor, ModuleId};
pub use semantic::{
    SemanticContext, SemanticModel, SemanticModelBuilder, Symbol, SymbolKind,
};
pub use types::{TypeKind, TypeSymbol};
