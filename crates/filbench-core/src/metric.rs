//! Metric selection and scaling rules.
//!
//! Harness metric names carry generated suffixes (`acc_norm`, `acc_token`,
//! `rougeL_stderr`, ...). A task's `metric_key` is resolved against a task's
//! metric mapping with [`select_metric`]; the matched name then decides the
//! unit conversion via [`ScalePolicy`].

use std::collections::BTreeMap;

/// Suffix the harness appends to standard-error companions of a metric.
const STDERR_SUFFIX: &str = "_stderr";

/// Outcome of resolving a metric key against a metric mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricMatch<'a> {
    /// Exactly one metric resolved.
    Found { name: &'a str, value: f64 },
    /// No metric matched the key.
    NotFound,
    /// More than one metric matched the key.
    Ambiguous(Vec<String>),
}

/// Whether `candidate` is a fuzzy match for `metric_key`.
///
/// A candidate matches when it contains the key and is not a
/// standard-error companion.
pub fn key_matches(metric_key: &str, candidate: &str) -> bool {
    candidate.contains(metric_key) && !candidate.ends_with(STDERR_SUFFIX)
}

/// Resolve `metric_key` against `metrics`.
///
/// An exact key wins. Otherwise every key satisfying [`key_matches`] is a
/// candidate and exactly one candidate must exist.
pub fn select_metric<'a>(metric_key: &str, metrics: &'a BTreeMap<String, f64>) -> MetricMatch<'a> {
    if let Some((name, value)) = metrics.get_key_value(metric_key) {
        return MetricMatch::Found {
            name: name.as_str(),
            value: *value,
        };
    }

    let mut candidates = metrics
        .iter()
        .filter(|(name, _)| key_matches(metric_key, name));

    match (candidates.next(), candidates.next()) {
        (None, _) => MetricMatch::NotFound,
        (Some((name, value)), None) => MetricMatch::Found {
            name: name.as_str(),
            value: *value,
        },
        (Some(_), Some(_)) => MetricMatch::Ambiguous(
            metrics
                .keys()
                .filter(|name| key_matches(metric_key, name))
                .cloned()
                .collect(),
        ),
    }
}

/// Unit conversion applied to a resolved metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalePolicy {
    /// Accuracy-family metric reported as a fraction.
    Accuracy,
    /// ROUGE-L reported as a fraction.
    RougeL,
    /// Already on the reporting scale.
    Unscaled,
}

impl ScalePolicy {
    /// Classify a metric name.
    pub fn for_metric(name: &str) -> Self {
        if name.contains("acc_") {
            ScalePolicy::Accuracy
        } else if name.contains("rougeL") {
            ScalePolicy::RougeL
        } else {
            ScalePolicy::Unscaled
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            ScalePolicy::Accuracy | ScalePolicy::RougeL => 100.0,
            ScalePolicy::Unscaled => 1.0,
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        value * self.factor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn exact_key_wins_over_fuzzy_candidates() {
        let m = metrics(&[("acc_", 0.5), ("acc_norm", 0.6), ("acc__stderr", 0.01)]);
        assert_eq!(
            select_metric("acc_", &m),
            MetricMatch::Found {
                name: "acc_",
                value: 0.5
            }
        );
    }

    #[test]
    fn fuzzy_match_skips_stderr_companion() {
        let m = metrics(&[("acc_norm", 0.756), ("acc_norm_stderr", 0.02)]);
        assert_eq!(
            select_metric("acc_", &m),
            MetricMatch::Found {
                name: "acc_norm",
                value: 0.756
            }
        );
    }

    #[test]
    fn multiple_fuzzy_matches_are_ambiguous() {
        let m = metrics(&[("acc_norm", 0.7), ("acc_token", 0.6)]);
        assert_eq!(
            select_metric("acc_", &m),
            MetricMatch::Ambiguous(vec!["acc_norm".to_string(), "acc_token".to_string()])
        );
    }

    #[test]
    fn missing_metric_is_not_found() {
        let m = metrics(&[("bleu", 21.0), ("rougeL_stderr", 0.01)]);
        assert_eq!(select_metric("rougeL", &m), MetricMatch::NotFound);
    }

    #[test]
    fn scaling_rule_is_closed() {
        assert_eq!(ScalePolicy::for_metric("acc_norm"), ScalePolicy::Accuracy);
        assert_eq!(ScalePolicy::for_metric("rougeL"), ScalePolicy::RougeL);
        assert_eq!(ScalePolicy::for_metric("chrf"), ScalePolicy::Unscaled);
        // "acc" without the underscore is not in the accuracy family
        assert_eq!(ScalePolicy::for_metric("acc"), ScalePolicy::Unscaled);

        assert!((ScalePolicy::for_metric("acc_norm").apply(0.756) - 75.6).abs() < 1e-9);
        assert!((ScalePolicy::for_metric("rougeL").apply(0.42) - 42.0).abs() < 1e-9);
        assert_eq!(ScalePolicy::for_metric("bleu").apply(3.1), 3.1);
    }
}
