//! Deterministic entity identifiers.
//!
//! Named constructs get ids derived from their position in the program
//! (`{service}:{path}:{accessor}` and friends) or a content address of
//! {kind, file, span, name}. Only anonymous constructs may be given random
//! ids, and only when [`AnonymousIds::Random`] is selected.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};
use uuid::Uuid;

use super::entity::EntityKind;
use crate::base::SourceSpan;

/// How anonymous constructs (control-flow nodes) are identified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnonymousIds {
    /// Content address, stable across runs
    #[default]
    Deterministic,
    /// Fresh UUID v4 per extraction
    Random,
}

/// `{kind}-{hash:016x}` over kind, file, span and name.
pub fn content_id(kind: EntityKind, span: &SourceSpan, name: &str) -> SmolStr {
    let mut hasher = FxHasher::default();
    kind.hash(&mut hasher);
    span.file_path.hash(&mut hasher);
    span.start.hash(&mut hasher);
    span.end.hash(&mut hasher);
    name.hash(&mut hasher);
    format_smolstr!("{}-{:016x}", kind, hasher.finish())
}

pub fn anonymous_id(kind: EntityKind, span: &SourceSpan, name: &str, mode: AnonymousIds) -> SmolStr {
    match mode {
        AnonymousIds::Deterministic => content_id(kind, span, name),
        AnonymousIds::Random => format_smolstr!("{}-{}", kind, Uuid::new_v4()),
    }
}

/// True for ids minted by [`AnonymousIds::Random`]. Comparisons between runs
/// should ignore these.
pub fn is_random_id(id: &str) -> bool {
    id.split_once('-')
        .is_some_and(|(_, rest)| Uuid::parse_str(rest).is_ok())
}

/// Normalize a service path for use in an id: leading `/` dropped, remaining
/// `/` replaced by `_`, `root` for the root path.
pub fn service_path_key(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('/').trim();
    if trimmed.is_empty() {
        "root".to_string()
    } else {
        trimmed.replace('/', "_")
    }
}

/// `{org}:{package}:{path}` with `occurrence` (1-based) appended for repeats.
pub fn service_id(org: &str, package: &str, path: &str, occurrence: usize) -> SmolStr {
    let key = service_path_key(path);
    if occurrence > 1 {
        format_smolstr!("{org}:{package}:{key}{occurrence}")
    } else {
        format_smolstr!("{org}:{package}:{key}")
    }
}

pub fn resource_id(service: &str, path: &str, accessor: &str) -> SmolStr {
    format_smolstr!("{service}:{path}:{accessor}")
}

pub fn remote_id(owner: &str, name: &str) -> SmolStr {
    format_smolstr!("{owner}:{name}")
}
