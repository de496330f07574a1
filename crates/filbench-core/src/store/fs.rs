use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use super::{FetchMode, ResultsStore, RunRecord};
use crate::error::{FilbenchError, Result};

const FILE_PREFIX: &str = "results_";
const FILE_SUFFIX: &str = ".json";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.f";

/// Directories below `<root>/<results_id>` that are searched for result files.
const MAX_DEPTH: usize = 1;

/// Filesystem-backed results store using the harness's output layout.
///
/// Layout: `<root>/<results_id>/[<model>/]results_<YYYY-MM-DDTHH-MM-SS.ffffff>.json`
///
/// Reads go to disk on every call, so [`FetchMode`] has no effect here.
pub struct LocalResultsStore {
    root: PathBuf,
}

impl LocalResultsStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run_dir(&self, results_id: &str) -> Option<PathBuf> {
        let relative = Path::new(results_id);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if results_id.is_empty() || escapes {
            return None;
        }
        Some(self.root.join(relative))
    }
}

/// Parse the timestamp encoded in a `results_<timestamp>.json` file name.
///
/// Returns `None` when the name does not follow the result file pattern.
pub fn timestamp_from_file_name(name: &str) -> Option<std::result::Result<DateTime<Utc>, String>> {
    let stamp = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    Some(
        NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("bad timestamp in file name '{}': {}", name, e)),
    )
}

fn collect_result_files(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if depth < MAX_DEPTH {
                collect_result_files(&path, depth + 1, out)?;
            }
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX))
        {
            out.push(path);
        }
    }
    Ok(())
}

fn read_record(results_id: &str, path: &Path) -> Result<RunRecord> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let timestamp = match timestamp_from_file_name(name) {
        Some(Ok(ts)) => ts,
        Some(Err(reason)) => return Err(FilbenchError::malformed(results_id, reason)),
        None => {
            return Err(FilbenchError::malformed(
                results_id,
                format!("not a result file: {:?}", path),
            ))
        }
    };

    let content = fs::read(path)?;
    let document: serde_json::Value = serde_json::from_slice(&content)
        .map_err(|e| FilbenchError::malformed(results_id, format!("{:?}: {}", path, e)))?;
    if !document.is_object() {
        return Err(FilbenchError::malformed(
            results_id,
            format!("{:?}: top-level value is not an object", path),
        ));
    }
    Ok(RunRecord::from_harness_document(timestamp, document))
}

impl ResultsStore for LocalResultsStore {
    fn fetch(&self, results_id: &str, _mode: FetchMode) -> Result<Vec<RunRecord>> {
        let unavailable = || FilbenchError::DataUnavailable {
            results_id: results_id.to_string(),
        };

        let dir = self.run_dir(results_id).ok_or_else(unavailable)?;
        if !dir.is_dir() {
            return Err(unavailable());
        }

        let mut files = Vec::new();
        collect_result_files(&dir, 0, &mut files)?;
        if files.is_empty() {
            return Err(unavailable());
        }
        files.sort();

        let mut records = files
            .iter()
            .map(|path| read_record(results_id, path))
            .collect::<Result<Vec<_>>>()?;
        records.sort_by_key(|r| r.timestamp);

        debug!(results_id = %results_id, records = records.len(), dir = ?dir, "loaded result files");
        Ok(records)
    }
}
