//! Foundation types for the model extractor.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Position`], [`Span`], [`SourceSpan`] - Line/column positions for extracted entities
//!
//! This module has NO dependencies on other crate modules.

mod line_index;
mod position;

pub use line_index::{LineCol, LineIndex};
pub use position::{Position, SourceSpan, Span};

// Re-export text-size types for convenience
pub use text_size;
pub use text_size::{TextRange, TextSize};
