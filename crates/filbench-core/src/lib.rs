//! FilBench Core Library
//!
//! Parses lighteval-style evaluation runs, maps them onto the FilBench task
//! taxonomy and aggregates them into category and overall FilBench scores.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod metric;
pub mod obs;
pub mod parser;
pub mod present;
pub mod report;
pub mod scoring;
pub mod store;
pub mod submission;
pub mod taxonomy;
pub mod telemetry;

pub use aggregate::{
    aggregate_category, compute_filbench_score, resolve_task_score, resolve_task_scores,
    CategoryAggregate, Scores, TaskScores,
};
pub use config::FilbenchConfig;
pub use error::{FilbenchError, Result};
pub use leaderboard::{read_entry, Leaderboard, LeaderboardEntry, LeaderboardFilter, DEFAULT_MAX_PARAMS};
pub use metric::{select_metric, MetricMatch, ScalePolicy};
pub use parser::{parse_outputs, parse_records, ModelConfig, ParsedRun, RunResults, TaskKey, TaskMetrics};
pub use present::{render_metadata_table, render_report_table, TableStyle};
pub use report::{default_report_path, read_report_json, write_report_json, ScoreReport};
pub use scoring::compute_score;
pub use store::{
    CachedResultsStore, FetchMode, LocalResultsStore, MemoryResultsStore, ResultsStore, RunRecord,
};
pub use submission::{
    prepare_submission, submission_hash, DisplayMetadata, FsSubmissionSink, ModelType,
    Multilinguality, Submission, SubmissionReceipt, SubmissionSink,
};
pub use taxonomy::{Task, TaskCategory, Taxonomy, FILBENCH_TASKS};
pub use telemetry::init_tracing;

/// FilBench version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
