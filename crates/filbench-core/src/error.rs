//! Error taxonomy for FilBench scoring.

use crate::taxonomy::TaskCategory;

/// FilBench errors.
#[derive(Debug, thiserror::Error)]
pub enum FilbenchError {
    #[error("data unavailable: no evaluation run found for '{results_id}'")]
    DataUnavailable { results_id: String },

    #[error("malformed record in '{results_id}': {reason}")]
    MalformedRecord { results_id: String, reason: String },

    #[error("empty category: {0} has no tasks in the taxonomy")]
    EmptyCategory(TaskCategory),

    #[error("invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    #[error("ambiguous metric for '{benchmark}': key '{metric_key}' matches {candidates:?}")]
    AmbiguousMetric {
        benchmark: String,
        metric_key: String,
        candidates: Vec<String>,
    },

    #[error("invalid report: {0}")]
    InvalidReport(String),

    #[error("submission error: {0}")]
    Submission(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilbenchError {
    pub(crate) fn malformed(results_id: &str, reason: impl Into<String>) -> Self {
        FilbenchError::MalformedRecord {
            results_id: results_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            FilbenchError::DataUnavailable { .. } => "DataUnavailable",
            FilbenchError::MalformedRecord { .. } => "MalformedRecord",
            FilbenchError::EmptyCategory(_) => "EmptyCategory",
            FilbenchError::InvalidTaxonomy(_) => "InvalidTaxonomy",
            FilbenchError::AmbiguousMetric { .. } => "AmbiguousMetric",
            FilbenchError::InvalidReport(_) => "InvalidReport",
            FilbenchError::Submission(_) => "Submission",
            FilbenchError::Serialization(_) => "Serialization",
            FilbenchError::Io(_) => "Io",
        }
    }
}

/// Result type for FilBench operations.
pub type Result<T> = std::result::Result<T, FilbenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_unavailable_names_identifier() {
        let err = FilbenchError::DataUnavailable {
            results_id: "org/details_model".to_string(),
        };
        assert!(err.to_string().contains("data unavailable"));
        assert!(err.to_string().contains("org/details_model"));
        assert_eq!(err.kind(), "DataUnavailable");
    }

    #[test]
    fn test_malformed_record_display() {
        let err = FilbenchError::malformed("org/run", "bad task key 'x|y'");
        let msg = err.to_string();
        assert!(msg.contains("org/run"));
        assert!(msg.contains("bad task key"));
        assert_eq!(err.kind(), "MalformedRecord");
    }

    #[test]
    fn test_ambiguous_metric_lists_candidates() {
        let err = FilbenchError::AmbiguousMetric {
            benchmark: "kalahi_tgl_mcf".to_string(),
            metric_key: "acc_".to_string(),
            candidates: vec!["acc_norm".to_string(), "acc_token".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("acc_norm"));
        assert!(msg.contains("acc_token"));
    }

    #[test]
    fn test_empty_category_display() {
        let err = FilbenchError::EmptyCategory(TaskCategory::Generation);
        assert!(err.to_string().contains("GENERATION"));
    }
}
