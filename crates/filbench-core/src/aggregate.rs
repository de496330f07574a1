//! Score aggregation.
//!
//! Scoring is a pure function of a [`Taxonomy`] and a run's [`RunResults`]:
//!
//! 1. each task resolves to a percentage-scale score, or `None` when the run
//!    has no data for it
//! 2. each category is the sample-weighted mean of its tasks, where missing
//!    tasks count as zero but keep their weight in the denominator
//! 3. the FilBench score is the unweighted mean of the category scores

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FilbenchError, Result};
use crate::metric::{select_metric, MetricMatch, ScalePolicy};
use crate::obs;
use crate::parser::RunResults;
use crate::taxonomy::{Task, TaskCategory, Taxonomy};

/// Resolved score per benchmark id (`None` for missing tasks).
pub type TaskScores = BTreeMap<String, Option<f64>>;

/// Output of [`compute_filbench_score`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub results_by_task: TaskScores,
    pub category_scores: BTreeMap<TaskCategory, f64>,
    pub filbench_score: f64,
}

/// Intermediate values of one category's weighted average.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAggregate {
    pub category: TaskCategory,
    /// Sum of `num_samples` over every task in the category.
    pub total_weight: u64,
    /// Sum of `num_samples * score`, with missing tasks contributing zero.
    pub weighted_sum: f64,
    /// Benchmark ids of tasks with no resolved score.
    pub missing: Vec<&'static str>,
    pub score: f64,
}

/// Resolve one task against a run's results.
///
/// Returns `Ok(None)` when the benchmark is absent, has no metrics, or has no
/// metric matching the task's key. Fails with `AmbiguousMetric` when several
/// metrics match.
pub fn resolve_task_score(task: &Task, results: &RunResults) -> Result<Option<f64>> {
    let Some(metrics) = results.get(task.benchmark_id).filter(|m| !m.is_empty()) else {
        return Ok(None);
    };

    match select_metric(task.metric_key, metrics) {
        MetricMatch::Found { name, value } => Ok(Some(ScalePolicy::for_metric(name).apply(value))),
        MetricMatch::NotFound => {
            warn!(
                benchmark = %task.benchmark_id,
                metric_key = %task.metric_key,
                available = ?metrics.keys().collect::<Vec<_>>(),
                "no metric matches task key; treating task as missing"
            );
            Ok(None)
        }
        MetricMatch::Ambiguous(candidates) => Err(FilbenchError::AmbiguousMetric {
            benchmark: task.benchmark_id.to_string(),
            metric_key: task.metric_key.to_string(),
            candidates,
        }),
    }
}

/// Resolve every task in the taxonomy.
pub fn resolve_task_scores(taxonomy: &Taxonomy, results: &RunResults) -> Result<TaskScores> {
    taxonomy
        .tasks()
        .iter()
        .map(|task| -> Result<(String, Option<f64>)> {
            Ok((task.benchmark_id.to_string(), resolve_task_score(task, results)?))
        })
        .collect()
}

/// Weighted average of one category.
pub fn aggregate_category(
    taxonomy: &Taxonomy,
    category: TaskCategory,
    scores: &TaskScores,
) -> Result<CategoryAggregate> {
    let mut total_weight = 0u64;
    let mut weighted_sum = 0.0f64;
    let mut missing = Vec::new();

    for task in taxonomy.tasks_in(category) {
        total_weight += task.num_samples;
        match scores.get(task.benchmark_id).copied().flatten() {
            Some(score) => weighted_sum += score * task.num_samples as f64,
            None => missing.push(task.benchmark_id),
        }
    }

    if total_weight == 0 {
        return Err(FilbenchError::EmptyCategory(category));
    }

    Ok(CategoryAggregate {
        category,
        total_weight,
        weighted_sum,
        missing,
        score: weighted_sum / total_weight as f64,
    })
}

/// Compute per-task, per-category and overall FilBench scores.
pub fn compute_filbench_score(taxonomy: &Taxonomy, results: &RunResults) -> Result<Scores> {
    let results_by_task = resolve_task_scores(taxonomy, results)?;

    let mut category_scores = BTreeMap::new();
    for &category in taxonomy.categories() {
        let aggregate = aggregate_category(taxonomy, category, &results_by_task)?;
        for benchmark in &aggregate.missing {
            obs::emit_task_missing(benchmark, category);
        }
        category_scores.insert(category, aggregate.score);
    }

    if category_scores.is_empty() {
        return Err(FilbenchError::InvalidTaxonomy(
            "taxonomy has no categories".to_string(),
        ));
    }
    let filbench_score = category_scores.values().sum::<f64>() / category_scores.len() as f64;

    Ok(Scores {
        results_by_task,
        category_scores,
        filbench_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TaskMetrics;
    use crate::taxonomy::TaskCategory::{ClassicalNlp, Generation};

    fn metrics(pairs: &[(&str, f64)]) -> TaskMetrics {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn two_task_taxonomy() -> Taxonomy {
        Taxonomy::new(
            vec![ClassicalNlp],
            vec![
                Task::new("a", "acc_", "A", "tgl", ClassicalNlp, 100),
                Task::new("b", "acc_", "B", "tgl", ClassicalNlp, 100),
            ],
        )
        .unwrap()
    }

    #[test]
    fn missing_task_is_zeroed_not_excluded() {
        let mut results = RunResults::new();
        results.insert("a".to_string(), metrics(&[("acc_", 0.8)]));

        let scores = compute_filbench_score(&two_task_taxonomy(), &results).unwrap();
        assert_eq!(scores.results_by_task["b"], None);
        assert!((scores.category_scores[&ClassicalNlp] - 40.0).abs() < 1e-9);
        assert!((scores.filbench_score - 40.0).abs() < 1e-9);
    }

    #[test]
    fn empty_metric_mapping_counts_as_missing() {
        let mut results = RunResults::new();
        results.insert("a".to_string(), TaskMetrics::new());
        let task = Task::new("a", "acc_", "A", "tgl", ClassicalNlp, 1);
        assert_eq!(resolve_task_score(&task, &results).unwrap(), None);
    }

    #[test]
    fn unscaled_metric_passes_through() {
        let mut results = RunResults::new();
        results.insert("x".to_string(), metrics(&[("chrf", 3.1)]));
        let task = Task::new("x", "chrf", "X", "fil", Generation, 10);
        assert_eq!(resolve_task_score(&task, &results).unwrap(), Some(3.1));
    }

    #[test]
    fn ambiguous_metric_fails() {
        let mut results = RunResults::new();
        results.insert("a".to_string(), metrics(&[("acc_norm", 0.5), ("acc_token", 0.6)]));
        let task = Task::new("a", "acc_", "A", "tgl", ClassicalNlp, 1);
        assert!(matches!(
            resolve_task_score(&task, &results),
            Err(FilbenchError::AmbiguousMetric { .. })
        ));
    }

    #[test]
    fn unmatched_metric_resolves_to_none() {
        let mut results = RunResults::new();
        results.insert("a".to_string(), metrics(&[("bleu", 12.0)]));
        let task = Task::new("a", "rougeL", "A", "tgl", Generation, 1);
        assert_eq!(resolve_task_score(&task, &results).unwrap(), None);
    }

    #[test]
    fn category_denominator_counts_every_task() {
        let scores: TaskScores = [("a".to_string(), None), ("b".to_string(), Some(50.0))]
            .into_iter()
            .collect();
        let aggregate = aggregate_category(&two_task_taxonomy(), ClassicalNlp, &scores).unwrap();
        assert_eq!(aggregate.total_weight, 200);
        assert_eq!(aggregate.missing, vec!["a"]);
        assert!((aggregate.score - 25.0).abs() < 1e-9);
    }

    #[test]
    fn category_outside_taxonomy_is_empty() {
        let err = aggregate_category(&two_task_taxonomy(), Generation, &TaskScores::new()).unwrap_err();
        assert!(matches!(err, FilbenchError::EmptyCategory(Generation)));
    }

    #[test]
    fn zero_score_task_is_not_missing() {
        let scores: TaskScores = [("a".to_string(), Some(0.0)), ("b".to_string(), Some(60.0))]
            .into_iter()
            .collect();
        let aggregate = aggregate_category(&two_task_taxonomy(), ClassicalNlp, &scores).unwrap();
        assert!(aggregate.missing.is_empty());
        assert!((aggregate.score - 30.0).abs() < 1e-9);
    }
}
