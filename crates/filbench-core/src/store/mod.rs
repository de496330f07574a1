//! Results store abstraction.
//!
//! A results store holds the raw evaluation runs for a model, addressed by an
//! opaque identifier. Each run is a [`RunRecord`] carrying the harness's
//! `results`, `versions` and `config_general` payloads plus the time the run
//! was written.
//!
//! Backends:
//! - [`LocalResultsStore`]: the harness's on-disk `results_<timestamp>.json` layout
//! - [`MemoryResultsStore`]: in-memory fixture backend
//! - [`CachedResultsStore`]: memoising wrapper honouring [`FetchMode`]

pub mod cached;
pub mod fs;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub use cached::CachedResultsStore;
pub use fs::LocalResultsStore;
pub use memory::MemoryResultsStore;

/// Whether a fetch may be served from a cached copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    #[default]
    ReuseIfCached,
    ForceRefresh,
}

impl FetchMode {
    pub fn from_force_refresh(force_refresh: bool) -> Self {
        if force_refresh {
            FetchMode::ForceRefresh
        } else {
            FetchMode::ReuseIfCached
        }
    }
}

/// One historical evaluation run.
///
/// Payload fields are kept as raw JSON; the parser decodes them. The harness
/// may store a payload either as a JSON object or as a JSON-encoded string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// When the run was written. Orders records for "latest wins" merging.
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub results: Value,
    #[serde(default)]
    pub versions: Value,
    #[serde(default)]
    pub config_general: Value,
}

impl RunRecord {
    pub fn new(timestamp: DateTime<Utc>, results: Value, versions: Value, config_general: Value) -> Self {
        Self {
            timestamp,
            results,
            versions,
            config_general,
        }
    }

    /// Build a record from a harness results document and its timestamp.
    pub fn from_harness_document(timestamp: DateTime<Utc>, mut document: Value) -> Self {
        let mut take = |field: &str| {
            document
                .get_mut(field)
                .map(Value::take)
                .unwrap_or(Value::Null)
        };
        let results = take("results");
        let versions = take("versions");
        let config_general = take("config_general");
        Self::new(timestamp, results, versions, config_general)
    }
}

/// Read access to evaluation runs.
pub trait ResultsStore: Send + Sync {
    /// Fetch every run recorded for `results_id`.
    ///
    /// Returns `FilbenchError::DataUnavailable` when the identifier does not
    /// resolve to any record.
    fn fetch(&self, results_id: &str, mode: FetchMode) -> Result<Vec<RunRecord>>;
}

impl<S: ResultsStore + ?Sized> ResultsStore for &S {
    fn fetch(&self, results_id: &str, mode: FetchMode) -> Result<Vec<RunRecord>> {
        (**self).fetch(results_id, mode)
    }
}
