//! FilBench task taxonomy.
//!
//! The registry is a compile-time list of [`Task`] records. Each task names
//! the benchmark id to look up in a parsed run, the metric to read, and the
//! canonical sample count used as its aggregation weight. A [`Taxonomy`]
//! pairs an ordered category list with the tasks that belong to it and is
//! validated once on construction.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FilbenchError, Result};

/// The closed set of FilBench task categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCategory {
    ClassicalNlp,
    ReadingComprehension,
    Generation,
    CulturalKnowledge,
}

impl TaskCategory {
    /// All categories in reporting order.
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::ClassicalNlp,
        TaskCategory::ReadingComprehension,
        TaskCategory::Generation,
        TaskCategory::CulturalKnowledge,
    ];

    /// Stable name used in serialized reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::ClassicalNlp => "CLASSICAL_NLP",
            TaskCategory::ReadingComprehension => "READING_COMPREHENSION",
            TaskCategory::Generation => "GENERATION",
            TaskCategory::CulturalKnowledge => "CULTURAL_KNOWLEDGE",
        }
    }

    /// Two-letter abbreviation used in compact tables.
    pub fn short(&self) -> &'static str {
        match self {
            TaskCategory::ClassicalNlp => "CN",
            TaskCategory::ReadingComprehension => "RC",
            TaskCategory::Generation => "GN",
            TaskCategory::CulturalKnowledge => "CK",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single benchmark task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Key used to look up the task in a parsed run.
    pub benchmark_id: &'static str,
    /// Metric name (or fragment) to read from the task's metric mapping.
    pub metric_key: &'static str,
    /// Human-readable column name.
    pub display_label: &'static str,
    /// Language code the task evaluates.
    pub language: &'static str,
    pub category: TaskCategory,
    /// Canonical dataset size, used as the aggregation weight.
    pub num_samples: u64,
}

impl Task {
    pub const fn new(
        benchmark_id: &'static str,
        metric_key: &'static str,
        display_label: &'static str,
        language: &'static str,
        category: TaskCategory,
        num_samples: u64,
    ) -> Self {
        Self {
            benchmark_id,
            metric_key,
            display_label,
            language,
            category,
            num_samples,
        }
    }
}

use TaskCategory::{ClassicalNlp, CulturalKnowledge, Generation, ReadingComprehension};

/// The FilBench task registry, ordered by benchmark id.
#[rustfmt::skip]
pub const FILBENCH_TASKS: &[Task] = &[
    Task::new("balita_tgl_mcf", "acc_", "BalitaNLP", "tgl", ClassicalNlp, 35_177),
    Task::new("belebele_ceb_mcf", "acc_", "Belebele (ceb)", "ceb", ReadingComprehension, 900),
    Task::new("belebele_fil_mcf", "acc_", "Belebele (fil)", "fil", ReadingComprehension, 900),
    Task::new("cebuaner_ceb_mcf", "acc_", "CebuaNER", "ceb", ClassicalNlp, 1310),
    Task::new("dengue_filipino_fil:_average", "acc_norm", "Dengue", "fil", ClassicalNlp, 4015),
    Task::new("firecs_fil_mcf", "acc_", "FiReCS", "fil", ClassicalNlp, 7340),
    Task::new("global_mmlu_all_tgl_mcf:_average", "acc_", "Global-MMLU", "tgl", CulturalKnowledge, 14_042),
    Task::new("include_tgl_mcf:_average", "acc_", "INCLUDE", "tgl", CulturalKnowledge, 500),
    Task::new("kalahi_tgl_mcf", "acc_", "KALAHI", "tgl", CulturalKnowledge, 150),
    Task::new("newsphnli_fil_mcf", "acc_", "NewsPH NLI", "fil", ReadingComprehension, 90_000),
    Task::new("ntrex128_fil", "rougeL", "NTREX-128", "fil", Generation, 1997),
    Task::new("readability_ceb_mcf", "acc_", "Readability (ceb)", "ceb", ReadingComprehension, 350),
    Task::new("sib200_ceb_mcf", "acc_", "SIB-200 (ceb)", "ceb", ClassicalNlp, 99),
    Task::new("sib200_tgl_mcf", "acc_", "SIB-200 (tgl)", "tgl", ClassicalNlp, 99),
    Task::new("stingraybench_semantic_appropriateness_tgl_mcf", "acc_", "StingrayBench", "tgl", CulturalKnowledge, 100),
    Task::new("tatoeba_ceb", "rougeL", "Tatoeba (ceb)", "ceb", Generation, 377),
    Task::new("tatoeba_tgl", "rougeL", "Tatoeba (tgl)", "tgl", Generation, 2499),
    Task::new("tico19_tgl", "rougeL", "TICO-19", "tgl", Generation, 971),
    Task::new("tlunifiedner_tgl_mcf", "acc_", "TLUnified NER", "tgl", ClassicalNlp, 1579),
    Task::new("universalner_ceb_mcf", "acc_", "Universal NER (ceb)", "ceb", ClassicalNlp, 49),
    Task::new("universalner_tgl_mcf", "acc_", "Universal NER (tgl)", "tgl", ClassicalNlp, 56),
];

/// An ordered, validated set of categories and tasks.
///
/// # Invariants
///
/// - every category has at least one task
/// - every task belongs to one of the listed categories
/// - benchmark ids are unique and `num_samples` is positive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    categories: Vec<TaskCategory>,
    tasks: Vec<Task>,
}

impl Taxonomy {
    /// Build and validate a taxonomy.
    pub fn new(categories: Vec<TaskCategory>, tasks: Vec<Task>) -> Result<Self> {
        let mut seen_categories = HashSet::new();
        for category in &categories {
            if !seen_categories.insert(*category) {
                return Err(FilbenchError::InvalidTaxonomy(format!(
                    "category {} listed twice",
                    category
                )));
            }
        }

        let mut seen_ids = HashSet::new();
        for task in &tasks {
            if task.num_samples == 0 {
                return Err(FilbenchError::InvalidTaxonomy(format!(
                    "task '{}' has zero num_samples",
                    task.benchmark_id
                )));
            }
            if !seen_ids.insert(task.benchmark_id) {
                return Err(FilbenchError::InvalidTaxonomy(format!(
                    "duplicate benchmark id '{}'",
                    task.benchmark_id
                )));
            }
            if !categories.contains(&task.category) {
                return Err(FilbenchError::InvalidTaxonomy(format!(
                    "task '{}' belongs to {} which is not part of the taxonomy",
                    task.benchmark_id, task.category
                )));
            }
        }

        let taxonomy = Self { categories, tasks };
        for category in &taxonomy.categories {
            if taxonomy.tasks_in(*category).next().is_none() {
                return Err(FilbenchError::EmptyCategory(*category));
            }
        }
        Ok(taxonomy)
    }

    /// The canonical FilBench taxonomy.
    pub fn filbench() -> Self {
        Self {
            categories: TaskCategory::ALL.to_vec(),
            tasks: FILBENCH_TASKS.to_vec(),
        }
    }

    pub fn categories(&self) -> &[TaskCategory] {
        &self.categories
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks belonging to `category`, in registry order.
    pub fn tasks_in(&self, category: TaskCategory) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.category == category)
    }

    pub fn get(&self, benchmark_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.benchmark_id == benchmark_id)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::filbench()
    }
}
