//! Memoized extraction results.
//!
//! Entries are keyed by document path, requested span, content hash and
//! semantic revision, so an edit or a new semantic context never serves an
//! old model. Requests carrying parameter overrides bypass the cache.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::base::Span;
use crate::error::ExtractError;
use crate::model::Model;

use super::analysis::Analysis;
use super::request::ExtractionRequest;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: Arc<str>,
    span: Span,
    content_hash: u64,
    revision: Option<i32>,
}

/// Shared between request handlers; all methods take `&self`.
#[derive(Debug, Default)]
pub struct ModelCache {
    entries: Mutex<FxHashMap<CacheKey, Arc<Model>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached model for `request`, extracting on a miss.
    ///
    /// Errors are never cached.
    pub fn get_or_extract(
        &self,
        analysis: &Analysis,
        request: &ExtractionRequest,
    ) -> Result<Arc<Model>, ExtractError> {
        if !request.params.is_empty() {
            return analysis.extract(request).map(Arc::new);
        }
        let document = analysis.check_current(request)?;
        let key = CacheKey {
            path: Arc::from(document.path()),
            span: request.span,
            content_hash: document.content_hash(),
            revision: document.semantic().revision(),
        };
        if let Some(model) = self.entries.lock().get(&key) {
            tracing::trace!(path = %key.path, span = %key.span, "model cache hit");
            return Ok(model.clone());
        }

        // Extraction runs without the lock held.
        let model = Arc::new(analysis.extract(request)?);
        let mut entries = self.entries.lock();
        // Older contents of this document can never be requested again.
        entries.retain(|old, _| {
            old.path != key.path
                || (old.content_hash == key.content_hash && old.revision == key.revision)
        });
        entries.insert(key, model.clone());
        Ok(model)
    }

    /// Drop every entry for `path`.
    pub fn invalidate(&self, path: &str) {
        self.entries.lock().retain(|key, _| &*key.path != path);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
