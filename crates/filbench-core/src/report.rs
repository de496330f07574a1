use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregate::{compute_filbench_score, TaskScores};
use crate::error::{FilbenchError, Result};
use crate::parser::{ModelConfig, ParsedRun};
use crate::taxonomy::{TaskCategory, Taxonomy};

/// Final scoring artifact persisted as JSON.
///
/// Serialized keys: `config`, `results`, `category_scores`, `filbench_score`,
/// `versions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub config: ModelConfig,
    #[serde(rename = "results")]
    pub results_by_task: TaskScores,
    pub category_scores: BTreeMap<TaskCategory, f64>,
    pub filbench_score: f64,
    #[serde(default)]
    pub versions: BTreeMap<String, Value>,
}

impl ScoreReport {
    /// Score a parsed run against `taxonomy`.
    pub fn from_parsed_run(taxonomy: &Taxonomy, run: ParsedRun) -> Result<Self> {
        let scores = compute_filbench_score(taxonomy, &run.results)?;
        Ok(Self {
            config: run.config,
            results_by_task: scores.results_by_task,
            category_scores: scores.category_scores,
            filbench_score: scores.filbench_score,
            versions: run.versions,
        })
    }

    /// Benchmark ids with no resolved score.
    pub fn missing_tasks(&self) -> Vec<&str> {
        self.results_by_task
            .iter()
            .filter(|(_, score)| score.is_none())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn model_name(&self) -> &str {
        self.config.model_name.as_deref().unwrap_or("Unknown Model")
    }
}

/// Default report location for a results id: `scores_<id>.json` with `/`
/// replaced by `___`.
pub fn default_report_path(results_id: &str) -> PathBuf {
    PathBuf::from(format!("scores_{}.json", results_id.replace('/', "___")))
}

/// Write a report as pretty JSON.
pub fn write_report_json<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Read a report written by [`write_report_json`].
pub fn read_report_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| FilbenchError::InvalidReport(format!("{}: {}", path.display(), e)))
}
