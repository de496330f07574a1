//! Structured observability hooks for the scoring lifecycle.
//!
//! Every emitter logs a single event carrying an `event = "..."` field so
//! that JSON log consumers can filter on it.

use tracing::{info, warn};

use crate::taxonomy::TaskCategory;

/// RAII guard that enters a span tagged with the results id being scored.
///
/// ```ignore
/// let _span = ScoreSpan::enter("org/details_model");
/// // every event below carries results_id = "org/details_model"
/// ```
pub struct ScoreSpan {
    _span: tracing::span::EnteredSpan,
}

impl ScoreSpan {
    pub fn enter(results_id: &str) -> Self {
        let span = tracing::info_span!("filbench.score", results_id = %results_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: scoring started.
pub fn emit_score_started(results_id: &str, force_refresh: bool) {
    info!(event = "score.started", results_id = %results_id, force_refresh = force_refresh);
}

/// Emit event: run records merged into a parsed run.
pub fn emit_parse_finished(results_id: &str, records: usize, benchmarks: usize) {
    info!(
        event = "parse.finished",
        results_id = %results_id,
        records = records,
        benchmarks = benchmarks,
    );
}

/// Emit event: a taxonomy task had no score in the run.
pub fn emit_task_missing(benchmark: &str, category: TaskCategory) {
    warn!(event = "task.missing", benchmark = %benchmark, category = %category);
}

/// Emit event: scoring finished.
pub fn emit_score_finished(results_id: &str, filbench_score: f64, missing_tasks: usize) {
    info!(
        event = "score.finished",
        results_id = %results_id,
        filbench_score = filbench_score,
        missing_tasks = missing_tasks,
    );
}

/// Emit event: a submission was handed to a sink.
pub fn emit_submission_written(location: &str, model_name: &str) {
    info!(event = "submission.written", location = %location, model_name = %model_name);
}
