//! Result parser: turns the historical runs of one results-store identifier
//! into a single [`ParsedRun`].
//!
//! Merge rules:
//! - records are ordered by timestamp; for ties the store's order is kept
//! - only zero-shot entries (`<suite>|<benchmark>|0`) are retained, and the
//!   aggregate `all` entry is dropped
//! - later records overwrite earlier ones per benchmark and per version key
//! - the model configuration comes from the latest record only

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{FilbenchError, Result};
use crate::obs;
use crate::store::{FetchMode, ResultsStore, RunRecord};

/// Metric name to value for one task.
pub type TaskMetrics = BTreeMap<String, f64>;

/// Benchmark id to its metrics.
pub type RunResults = BTreeMap<String, TaskMetrics>;

/// Name of the aggregate entry emitted by the harness.
const AGGREGATE_TASK: &str = "all";

/// Model configuration taken from the latest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_name: Option<String>,
    pub model_dtype: Option<String>,
    pub model_size: Option<String>,
}

/// Normalized view of a model's evaluation runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedRun {
    pub config: ModelConfig,
    pub results: RunResults,
    pub versions: BTreeMap<String, Value>,
}

/// A `<suite>|<benchmark>|<shots>` task key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskKey<'a> {
    pub suite: &'a str,
    pub benchmark: &'a str,
    pub shots: u32,
}

impl<'a> TaskKey<'a> {
    /// Split a composite task key. Returns a reason string on failure.
    pub fn parse(key: &'a str) -> std::result::Result<Self, String> {
        let mut parts = key.split('|');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(suite), Some(benchmark), Some(shots), None) => {
                let shots = shots
                    .parse::<u32>()
                    .map_err(|_| format!("task key '{}' has a non-numeric shot count", key))?;
                Ok(Self {
                    suite,
                    benchmark,
                    shots,
                })
            }
            _ => Err(format!(
                "task key '{}' is not of the form <suite>|<benchmark>|<shots>",
                key
            )),
        }
    }

    pub fn is_zero_shot(&self) -> bool {
        self.shots == 0
    }
}

/// Fetch `results_id` from `store` and parse it.
///
/// `force_refresh` bypasses any cached copy held by the store.
pub fn parse_outputs<S: ResultsStore + ?Sized>(
    store: &S,
    results_id: &str,
    force_refresh: bool,
) -> Result<ParsedRun> {
    let records = store.fetch(results_id, FetchMode::from_force_refresh(force_refresh))?;
    parse_records(results_id, records)
}

/// Merge already-fetched run records into a [`ParsedRun`].
pub fn parse_records(results_id: &str, mut records: Vec<RunRecord>) -> Result<ParsedRun> {
    if records.is_empty() {
        return Err(FilbenchError::DataUnavailable {
            results_id: results_id.to_string(),
        });
    }
    records.sort_by_key(|r| r.timestamp);

    let mut results = RunResults::new();
    let mut versions = BTreeMap::new();

    for record in &records {
        let payload = decode_payload(results_id, "results", &record.results)?
            .ok_or_else(|| FilbenchError::malformed(results_id, "record has no results payload"))?;

        for (key, value) in payload {
            if key == AGGREGATE_TASK {
                continue;
            }
            let task_key = TaskKey::parse(&key).map_err(|r| FilbenchError::malformed(results_id, r))?;
            if task_key.benchmark == AGGREGATE_TASK || !task_key.is_zero_shot() {
                debug!(task = %key, "skipping non zero-shot entry");
                continue;
            }
            let metrics = decode_metrics(results_id, &key, &value)?;
            results.insert(task_key.benchmark.to_string(), metrics);
        }

        if let Some(record_versions) = decode_payload(results_id, "versions", &record.versions)? {
            versions.extend(record_versions);
        }
    }

    let latest = records
        .last()
        .ok_or_else(|| FilbenchError::DataUnavailable {
            results_id: results_id.to_string(),
        })?;
    let config = decode_config(results_id, &latest.config_general)?;

    obs::emit_parse_finished(results_id, records.len(), results.len());
    Ok(ParsedRun {
        config,
        results,
        versions,
    })
}

/// Decode a payload that is either a JSON object or a JSON-encoded object.
fn decode_payload(results_id: &str, field: &str, value: &Value) -> Result<Option<Map<String, Value>>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map.clone())),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(Value::Null) => Ok(None),
            Ok(_) => Err(FilbenchError::malformed(
                results_id,
                format!("encoded '{}' payload is not an object", field),
            )),
            Err(e) => Err(FilbenchError::malformed(
                results_id,
                format!("encoded '{}' payload is not valid JSON: {}", field, e),
            )),
        },
        _ => Err(FilbenchError::malformed(
            results_id,
            format!("'{}' payload is not an object", field),
        )),
    }
}

/// Decode one task's metric mapping. `null` values are dropped.
fn decode_metrics(results_id: &str, task: &str, value: &Value) -> Result<TaskMetrics> {
    let map = value.as_object().ok_or_else(|| {
        FilbenchError::malformed(results_id, format!("metrics for '{}' are not an object", task))
    })?;

    let mut metrics = TaskMetrics::new();
    for (name, raw) in map {
        match raw {
            Value::Null => continue,
            Value::Number(n) => {
                let v = n.as_f64().ok_or_else(|| {
                    FilbenchError::malformed(results_id, format!("metric '{}' of '{}' is not finite", name, task))
                })?;
                metrics.insert(name.clone(), v);
            }
            other => {
                return Err(FilbenchError::malformed(
                    results_id,
                    format!("metric '{}' of '{}' is not a number: {}", name, task, other),
                ))
            }
        }
    }
    Ok(metrics)
}

fn decode_config(results_id: &str, value: &Value) -> Result<ModelConfig> {
    let Some(map) = decode_payload(results_id, "config_general", value)? else {
        return Ok(ModelConfig::default());
    };

    let field = |name: &str| -> Result<Option<String>> {
        match map.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(FilbenchError::malformed(
                results_id,
                format!("config field '{}' is not a scalar: {}", name, other),
            )),
        }
    };

    Ok(ModelConfig {
        model_name: field("model_name")?,
        model_dtype: field("model_dtype")?,
        model_size: field("model_size")?,
    })
}
