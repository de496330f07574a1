//! Leaderboard ranking over many score reports.
//!
//! Reports may be plain [`ScoreReport`]s or [`Submission`]s carrying display
//! metadata. Entries are ranked by FilBench score, descending.

use std::cmp::Ordering;
use std::path::Path;

use serde_json::Value;

use crate::error::{FilbenchError, Result};
use crate::present::{Align, TableStyle, TextTable};
use crate::report::ScoreReport;
use crate::submission::{DisplayMetadata, Submission};
use crate::taxonomy::Taxonomy;

/// One ranked model.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub report: ScoreReport,
    pub display_metadata: Option<DisplayMetadata>,
}

impl LeaderboardEntry {
    /// Display name, preferring the submitted name over the harness's.
    pub fn model(&self) -> &str {
        self.display_metadata
            .as_ref()
            .map(|m| m.model_name.as_str())
            .unwrap_or_else(|| self.report.model_name())
    }

    pub fn num_params(&self) -> Option<f64> {
        self.display_metadata.as_ref().map(|m| m.num_params)
    }
}

impl From<ScoreReport> for LeaderboardEntry {
    fn from(report: ScoreReport) -> Self {
        Self {
            report,
            display_metadata: None,
        }
    }
}

impl From<Submission> for LeaderboardEntry {
    fn from(submission: Submission) -> Self {
        Self {
            report: submission.report,
            display_metadata: Some(submission.display_metadata),
        }
    }
}

/// Decode a report or submission document.
pub fn entry_from_value(value: Value) -> Result<LeaderboardEntry> {
    if value.get("display_metadata").is_some() {
        let submission: Submission = serde_json::from_value(value)
            .map_err(|e| FilbenchError::InvalidReport(e.to_string()))?;
        Ok(submission.into())
    } else {
        let report: ScoreReport = serde_json::from_value(value)
            .map_err(|e| FilbenchError::InvalidReport(e.to_string()))?;
        Ok(report.into())
    }
}

/// Read a report or submission file.
pub fn read_entry(path: &Path) -> Result<LeaderboardEntry> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| FilbenchError::InvalidReport(format!("{}: {}", path.display(), e)))?;
    entry_from_value(value)
        .map_err(|e| FilbenchError::InvalidReport(format!("{}: {}", path.display(), e)))
}

/// Parameter cap (billions) applied by the `leaderboard` command unless overridden.
pub const DEFAULT_MAX_PARAMS: f64 = 400.0;

/// Row selection applied before rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaderboardFilter {
    /// Drop models with more parameters (billions). Models without metadata are kept.
    pub max_params: Option<f64>,
    pub top_n: Option<usize>,
    /// Keep reports with missing tasks. Off by default.
    pub include_incomplete: bool,
    /// Only the overall and category columns.
    pub aggregate_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by(|a, b| {
            b.report
                .filbench_score
                .partial_cmp(&a.report.filbench_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.model().cmp(b.model()))
        });
        Self { entries }
    }

    pub fn from_reports(reports: Vec<ScoreReport>) -> Self {
        Self::from_entries(reports.into_iter().map(Into::into).collect())
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Entries remaining after `filter`, in rank order.
    pub fn select(&self, filter: &LeaderboardFilter) -> Vec<&LeaderboardEntry> {
        let selected = self
            .entries
            .iter()
            .filter(|e| filter.include_incomplete || e.report.missing_tasks().is_empty())
            .filter(|e| match (filter.max_params, e.num_params()) {
                (Some(max), Some(params)) => params <= max,
                _ => true,
            });
        match filter.top_n {
            Some(n) => selected.take(n).collect(),
            None => selected.collect(),
        }
    }

    fn columns(&self, taxonomy: &Taxonomy, filter: &LeaderboardFilter) -> Vec<String> {
        let mut columns = vec!["Model".to_string(), "FilBench Score".to_string()];
        columns.extend(taxonomy.categories().iter().map(|c| c.short().to_string()));
        if !filter.aggregate_only {
            columns.extend(taxonomy.tasks().iter().map(|t| t.display_label.to_string()));
        }
        columns
    }

    fn rows(&self, taxonomy: &Taxonomy, filter: &LeaderboardFilter, style: &TableStyle) -> Vec<Vec<String>> {
        self.select(filter)
            .into_iter()
            .map(|entry| {
                let report = &entry.report;
                let mut row = vec![entry.model().to_string(), style.score(Some(report.filbench_score))];
                row.extend(
                    taxonomy
                        .categories()
                        .iter()
                        .map(|c| style.score(report.category_scores.get(c).copied())),
                );
                if !filter.aggregate_only {
                    row.extend(taxonomy.tasks().iter().map(|t| {
                        style.score(report.results_by_task.get(t.benchmark_id).copied().flatten())
                    }));
                }
                row
            })
            .collect()
    }

    /// Plain-text table.
    pub fn render_text(&self, taxonomy: &Taxonomy, filter: &LeaderboardFilter, style: &TableStyle) -> String {
        let columns = self.columns(taxonomy, filter);
        let layout: Vec<(&str, Align)> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), if i == 0 { Align::Left } else { Align::Right }))
            .collect();
        let mut table = TextTable::new(&layout);
        for row in self.rows(taxonomy, filter, style) {
            table.push_row(row);
        }
        table.render()
    }

    /// LaTeX `tabular` with booktabs rules.
    pub fn render_latex(&self, taxonomy: &Taxonomy, filter: &LeaderboardFilter, style: &TableStyle) -> String {
        let columns = self.columns(taxonomy, filter);
        let mut out = String::new();
        out.push_str(&format!(
            "\\begin{{tabular}}{{l{}}}\n\\toprule\n",
            "r".repeat(columns.len() - 1)
        ));
        out.push_str(&latex_row(&columns));
        out.push_str("\\midrule\n");
        for row in self.rows(taxonomy, filter, style) {
            out.push_str(&latex_row(&row));
        }
        out.push_str("\\bottomrule\n\\end{tabular}\n");
        out
    }
}

fn latex_row(cells: &[String]) -> String {
    let escaped: Vec<String> = cells.iter().map(|c| latex_escape(c)).collect();
    format!("{} \\\\\n", escaped.join(" & "))
}

fn latex_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            _ => out.push(ch),
        }
    }
    out
}
