//! End-to-end scoring of one results-store identifier.

use crate::error::Result;
use crate::obs::{self, ScoreSpan};
use crate::parser::parse_outputs;
use crate::report::ScoreReport;
use crate::store::ResultsStore;
use crate::taxonomy::Taxonomy;

/// Fetch, parse and score `results_id`.
///
/// Parse failures abort the whole call; missing tasks do not.
pub fn compute_score<S: ResultsStore + ?Sized>(
    store: &S,
    taxonomy: &Taxonomy,
    results_id: &str,
    force_refresh: bool,
) -> Result<ScoreReport> {
    let _span = ScoreSpan::enter(results_id);
    obs::emit_score_started(results_id, force_refresh);

    let parsed = parse_outputs(store, results_id, force_refresh)?;
    let report = ScoreReport::from_parsed_run(taxonomy, parsed)?;

    obs::emit_score_finished(results_id, report.filbench_score, report.missing_tasks().len());
    Ok(report)
}
