//! Extraction pipeline tests
//!
//! Tests for:
//! - End-to-end scenarios over whole files
//! - Reference resolution and cross-package naming
//! - Partial-failure containment
//! - Span scoping and idempotence

pub mod tests_containment;
pub mod tests_references;
pub mod tests_scenarios;
pub mod tests_stability;
