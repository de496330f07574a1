use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{FetchMode, ResultsStore, RunRecord};
use crate::error::{FilbenchError, Result};

/// In-memory results store backed by a `HashMap<results_id, runs>`.
///
/// Records are returned in insertion order.
#[derive(Debug, Default)]
pub struct MemoryResultsStore {
    runs: Mutex<HashMap<String, Vec<RunRecord>>>,
}

impl MemoryResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a run under `results_id`.
    pub fn insert(&self, results_id: &str, record: RunRecord) {
        let mut runs = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        runs.entry(results_id.to_string()).or_default().push(record);
    }

    pub fn with_run(self, results_id: &str, record: RunRecord) -> Self {
        self.insert(results_id, record);
        self
    }
}

impl ResultsStore for MemoryResultsStore {
    fn fetch(&self, results_id: &str, _mode: FetchMode) -> Result<Vec<RunRecord>> {
        let runs = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        match runs.get(results_id) {
            Some(records) if !records.is_empty() => Ok(records.clone()),
            _ => Err(FilbenchError::DataUnavailable {
                results_id: results_id.to_string(),
            }),
        }
    }
}
