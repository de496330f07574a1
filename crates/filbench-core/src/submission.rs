//! Leaderboard submissions.
//!
//! A [`Submission`] is a [`ScoreReport`] plus operator-supplied
//! [`DisplayMetadata`]. A [`SubmissionSink`] persists or publishes it and
//! returns a [`SubmissionReceipt`].

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::{FilbenchError, Result};
use crate::obs;
use crate::report::ScoreReport;

/// How many languages a model was trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Multilinguality {
    Multilingual,
    #[serde(rename = "SEA-Specific")]
    SeaSpecific,
    Monolingual,
}

impl Multilinguality {
    pub const ALL: [Multilinguality; 3] = [
        Multilinguality::Multilingual,
        Multilinguality::SeaSpecific,
        Multilinguality::Monolingual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Multilinguality::Multilingual => "Multilingual",
            Multilinguality::SeaSpecific => "SEA-Specific",
            Multilinguality::Monolingual => "Monolingual",
        }
    }
}

/// Training stage of the submitted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    Base,
    #[serde(rename = "SFT")]
    Sft,
    #[serde(rename = "Preference-aligned")]
    PreferenceAligned,
    Reasoning,
}

impl ModelType {
    pub const ALL: [ModelType; 4] = [
        ModelType::Base,
        ModelType::Sft,
        ModelType::PreferenceAligned,
        ModelType::Reasoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Base => "Base",
            ModelType::Sft => "SFT",
            ModelType::PreferenceAligned => "Preference-aligned",
            ModelType::Reasoning => "Reasoning",
        }
    }
}

macro_rules! choice_impls {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                $ty::ALL
                    .iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .copied()
                    .ok_or_else(|| {
                        let choices: Vec<_> = $ty::ALL.iter().map(|v| v.as_str()).collect();
                        format!("'{}' is not one of {}", s, choices.join(", "))
                    })
            }
        }
    };
}

choice_impls!(Multilinguality);
choice_impls!(ModelType);

/// Leaderboard display fields attached to a report on submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayMetadata {
    pub org: String,
    pub model_name: String,
    pub contact: String,
    pub multilinguality: Multilinguality,
    pub model_type: ModelType,
    /// Parameter count in billions.
    pub num_params: f64,
    pub submission_date: DateTime<Utc>,
    /// SHA-256 hex of `org` followed by `model_name`.
    pub hash: String,
}

impl DisplayMetadata {
    pub fn new(
        org: &str,
        model_name: &str,
        contact: &str,
        multilinguality: Multilinguality,
        model_type: ModelType,
        num_params: f64,
    ) -> Self {
        Self {
            org: org.to_string(),
            model_name: model_name.to_string(),
            contact: contact.to_string(),
            multilinguality,
            model_type,
            num_params,
            submission_date: Utc::now(),
            hash: submission_hash(org, model_name),
        }
    }

    pub fn with_submission_date(mut self, date: DateTime<Utc>) -> Self {
        self.submission_date = date;
        self
    }

    /// Reject blank fields and non-finite or negative parameter counts.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("org", &self.org),
            ("model_name", &self.model_name),
            ("contact", &self.contact),
        ] {
            if value.trim().is_empty() {
                return Err(FilbenchError::Submission(format!("{} must not be empty", field)));
            }
        }
        if !self.num_params.is_finite() || self.num_params < 0.0 {
            return Err(FilbenchError::Submission(format!(
                "num_params must be a non-negative number, got {}",
                self.num_params
            )));
        }
        Ok(())
    }

    /// Ordered field/value pairs for display.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("org", self.org.clone()),
            ("model_name", self.model_name.clone()),
            ("contact", self.contact.clone()),
            ("multilinguality", self.multilinguality.to_string()),
            ("model_type", self.model_type.to_string()),
            ("num_params", self.num_params.to_string()),
            ("submission_date", self.submission_date.to_rfc3339()),
            ("hash", self.hash.clone()),
        ]
    }
}

/// Identity hash of a submitter/model pair.
pub fn submission_hash(org: &str, model_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(org.as_bytes());
    hasher.update(model_name.as_bytes());
    hex::encode(hasher.finalize())
}

/// A score report enriched with display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(flatten)]
    pub report: ScoreReport,
    pub display_metadata: DisplayMetadata,
}

/// Attach validated display metadata to a report.
pub fn prepare_submission(report: ScoreReport, display_metadata: DisplayMetadata) -> Result<Submission> {
    display_metadata.validate()?;
    Ok(Submission {
        report,
        display_metadata,
    })
}

impl Submission {
    /// Commit-style title: `FilBench Submission by <org> (<model_name>)`.
    pub fn title(&self) -> String {
        format!(
            "FilBench Submission by {} ({})",
            self.display_metadata.org, self.display_metadata.model_name
        )
    }

    /// One-line summary of the overall and category scores.
    pub fn description(&self) -> String {
        let categories: Vec<String> = self
            .report
            .category_scores
            .iter()
            .map(|(category, score)| format!("{}: {}", category, score))
            .collect();
        format!(
            "Filbench score: {}, Category Score: {{{}}}",
            self.report.filbench_score,
            categories.join(", ")
        )
    }
}

/// Acknowledgement returned by a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub submission_id: Uuid,
    /// Where the sink placed the submission.
    pub location: String,
    pub title: String,
    pub description: String,
}

/// Destination for finished submissions.
pub trait SubmissionSink: Send + Sync {
    /// Persist `submission` under `path_in_repo`.
    fn submit(&self, path_in_repo: &str, submission: &Submission) -> Result<SubmissionReceipt>;
}

/// Filesystem-backed sink: writes each submission into a directory that
/// mirrors the submissions collection.
pub struct FsSubmissionSink {
    root: PathBuf,
    dataset: String,
}

impl FsSubmissionSink {
    /// Create a sink rooted at `root`. Creates `root` if needed.
    pub fn new(root: impl AsRef<Path>, dataset: &str) -> Result<Self> {
        fs::create_dir_all(root.as_ref())?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            dataset: dataset.to_string(),
        })
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    fn target_path(&self, path_in_repo: &str) -> Result<PathBuf> {
        let relative = Path::new(path_in_repo);
        let valid = !path_in_repo.is_empty()
            && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(FilbenchError::Submission(format!(
                "invalid path in submissions collection: '{}'",
                path_in_repo
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl SubmissionSink for FsSubmissionSink {
    fn submit(&self, path_in_repo: &str, submission: &Submission) -> Result<SubmissionReceipt> {
        let path = self.target_path(path_in_repo)?;
        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)?;

        // Write to a temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(serde_json::to_string_pretty(submission)?.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;

        let location = format!("{}/{}", self.dataset, path_in_repo);
        obs::emit_submission_written(&location, &submission.display_metadata.model_name);
        Ok(SubmissionReceipt {
            submission_id: Uuid::new_v4(),
            location,
            title: submission.title(),
            description: submission.description(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ModelConfig;
    use crate::taxonomy::TaskCategory;
    use std::collections::BTreeMap;

    fn report() -> ScoreReport {
        ScoreReport {
            config: ModelConfig {
                model_name: Some("org/model".to_string()),
                ..Default::default()
            },
            results_by_task: BTreeMap::new(),
            category_scores: TaskCategory::ALL.iter().map(|c| (*c, 50.0)).collect(),
            filbench_score: 50.0,
            versions: BTreeMap::new(),
        }
    }

    fn metadata() -> DisplayMetadata {
        DisplayMetadata::new(
            "UD-Filipino",
            "Model 7B",
            "team@example.org",
            Multilinguality::SeaSpecific,
            ModelType::Sft,
            7.0,
        )
    }

    #[test]
    fn hash_is_sha256_of_org_and_model() {
        let expected = hex::encode(Sha256::digest(b"UD-FilipinoModel 7B"));
        assert_eq!(metadata().hash, expected);
        assert_eq!(metadata().hash.len(), 64);
    }

    #[test]
    fn choices_parse_and_serialize_with_display_names() {
        assert_eq!("sea-specific".parse::<Multilinguality>().unwrap(), Multilinguality::SeaSpecific);
        assert_eq!("Preference-aligned".parse::<ModelType>().unwrap(), ModelType::PreferenceAligned);
        assert!("chat".parse::<ModelType>().is_err());
        assert_eq!(serde_json::to_string(&ModelType::Sft).unwrap(), "\"SFT\"");
        assert_eq!(
            serde_json::to_string(&Multilinguality::SeaSpecific).unwrap(),
            "\"SEA-Specific\""
        );
    }

    #[test]
    fn submission_flattens_report_fields() {
        let submission = prepare_submission(report(), metadata()).unwrap();
        let raw = serde_json::to_value(&submission).unwrap();
        assert!(raw.get("filbench_score").is_some());
        assert!(raw.get("category_scores").is_some());
        assert_eq!(raw["display_metadata"]["org"], "UD-Filipino");

        let back: Submission = serde_json::from_value(raw).unwrap();
        assert_eq!(back, submission);
    }

    #[test]
    fn blank_metadata_is_rejected() {
        let mut bad = metadata();
        bad.contact = "  ".to_string();
        assert!(matches!(
            prepare_submission(report(), bad),
            Err(FilbenchError::Submission(_))
        ));

        let mut bad = metadata();
        bad.num_params = f64::NAN;
        assert!(prepare_submission(report(), bad).is_err());
    }

    #[test]
    fn title_and_description() {
        let submission = prepare_submission(report(), metadata()).unwrap();
        assert_eq!(submission.title(), "FilBench Submission by UD-Filipino (Model 7B)");
        let description = submission.description();
        assert!(description.starts_with("Filbench score: 50"));
        assert!(description.contains("CLASSICAL_NLP: 50"));
    }

    #[test]
    fn fs_sink_writes_submission() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsSubmissionSink::new(dir.path().join("subs"), "org/submissions").unwrap();
        let submission = prepare_submission(report(), metadata()).unwrap();

        let receipt = sink.submit("scores_model.json", &submission).unwrap();
        assert_eq!(receipt.location, "org/submissions/scores_model.json");
        assert_eq!(receipt.title, submission.title());

        let written = fs::read_to_string(dir.path().join("subs/scores_model.json")).unwrap();
        let back: Submission = serde_json::from_str(&written).unwrap();
        assert_eq!(back, submission);
    }

    #[test]
    fn fs_sink_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsSubmissionSink::new(dir.path(), "subs").unwrap();
        let submission = prepare_submission(report(), metadata()).unwrap();
        assert!(sink.submit("../escape.json", &submission).is_err());
        assert!(sink.submit("", &submission).is_err());
    }
}
