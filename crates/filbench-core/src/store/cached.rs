use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::{FetchMode, ResultsStore, RunRecord};
use crate::error::Result;

/// Memoising wrapper around another [`ResultsStore`].
///
/// `ReuseIfCached` serves a previously fetched copy when one exists;
/// `ForceRefresh` always goes to the inner store and replaces the cached copy.
/// Failed fetches are never cached.
pub struct CachedResultsStore<S> {
    inner: S,
    cache: Mutex<HashMap<String, Vec<RunRecord>>>,
}

impl<S: ResultsStore> CachedResultsStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached copy.
    pub fn clear(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<S: ResultsStore> ResultsStore for CachedResultsStore<S> {
    fn fetch(&self, results_id: &str, mode: FetchMode) -> Result<Vec<RunRecord>> {
        if mode == FetchMode::ReuseIfCached {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(records) = cache.get(results_id) {
                debug!(results_id = %results_id, "serving cached run records");
                return Ok(records.clone());
            }
        }

        let records = self.inner.fetch(results_id, mode)?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(results_id.to_string(), records.clone());
        Ok(records)
    }
}
