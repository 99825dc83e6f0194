//! IDE layer tests
//!
//! Tests for:
//! - Request handling against versioned documents
//! - Concurrent snapshots
//! - Configuration loading

pub mod tests_concurrency;
pub mod tests_config;
pub mod tests_requests;
