//! Runtime configuration.
//!
//! Defaults can be overridden with environment variables:
//!
//! | Variable                       | Default                                    |
//! |--------------------------------|--------------------------------------------|
//! | `FILBENCH_RESULTS_DIR`         | `results`                                  |
//! | `FILBENCH_SUBMISSIONS_DIR`     | `submissions`                              |
//! | `FILBENCH_SUBMISSIONS_DATASET` | `UD-Filipino/filbench-results-submission`  |

use std::path::PathBuf;

pub const RESULTS_DIR_ENV: &str = "FILBENCH_RESULTS_DIR";
pub const SUBMISSIONS_DIR_ENV: &str = "FILBENCH_SUBMISSIONS_DIR";
pub const SUBMISSIONS_DATASET_ENV: &str = "FILBENCH_SUBMISSIONS_DATASET";

pub const DEFAULT_SUBMISSIONS_DATASET: &str = "UD-Filipino/filbench-results-submission";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilbenchConfig {
    /// Root of the local results store.
    pub results_dir: PathBuf,
    /// Directory the filesystem submission sink writes into.
    pub submissions_dir: PathBuf,
    /// Name of the submissions collection recorded in receipts.
    pub submissions_dataset: String,
}

impl Default for FilbenchConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            submissions_dir: PathBuf::from("submissions"),
            submissions_dataset: DEFAULT_SUBMISSIONS_DATASET.to_string(),
        }
    }
}

impl FilbenchConfig {
    /// Defaults overridden by any set (non-empty) environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            results_dir: get(RESULTS_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.results_dir),
            submissions_dir: get(SUBMISSIONS_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.submissions_dir),
            submissions_dataset: get(SUBMISSIONS_DATASET_ENV).unwrap_or(defaults.submissions_dataset),
        }
    }

    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    pub fn with_submissions_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.submissions_dir = dir.into();
        self
    }
}
