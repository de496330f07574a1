//! Plain-text rendering of reports and submission metadata.
//!
//! Rendering never feeds back into scoring. Style is passed in explicitly.

use crate::report::ScoreReport;
use crate::submission::DisplayMetadata;
use crate::taxonomy::Taxonomy;

/// Formatting options shared by every renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStyle {
    /// Digits after the decimal point for scores.
    pub float_precision: usize,
    /// Placeholder for missing scores.
    pub missing_marker: String,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            float_precision: 2,
            missing_marker: "-".to_string(),
        }
    }
}

impl TableStyle {
    pub fn score(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{:.*}", self.float_precision, v),
            None => self.missing_marker.clone(),
        }
    }
}

/// Column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Minimal fixed-width text table.
#[derive(Debug, Clone)]
pub struct TextTable {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new(columns: &[(&str, Align)]) -> Self {
        Self {
            headers: columns.iter().map(|(h, _)| h.to_string()).collect(),
            align: columns.iter().map(|(_, a)| *a).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells render empty and extra cells are dropped.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|i| {
                self.rows
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(self.headers[i].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .zip(&self.align)
                .map(|((cell, width), align)| match align {
                    Align::Left => format!("{:<width$}", cell, width = width),
                    Align::Right => format!("{:>width$}", cell, width = width),
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        out.push_str(&line(&self.headers));
        out.push('\n');
        out.push_str(
            &widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }
}

/// Human-readable summary of a score report.
pub fn render_report_table(report: &ScoreReport, taxonomy: &Taxonomy, style: &TableStyle) -> String {
    let mut out = String::new();
    out.push_str(&format!("Model Name: {}\n", report.model_name()));
    out.push_str(&format!(
        "FilBench Score: {}\n\n",
        style.score(Some(report.filbench_score))
    ));

    out.push_str("FilBench Category Scores\n");
    let mut categories = TextTable::new(&[("Category", Align::Left), ("Score", Align::Right)]);
    for category in taxonomy.categories() {
        categories.push_row(vec![
            category.to_string(),
            style.score(report.category_scores.get(category).copied()),
        ]);
    }
    out.push_str(&categories.render());

    out.push_str("\nTask Scores\n");
    let mut tasks = TextTable::new(&[
        ("Task", Align::Left),
        ("Lang", Align::Left),
        ("Category", Align::Left),
        ("Samples", Align::Right),
        ("Score", Align::Right),
    ]);
    for task in taxonomy.tasks() {
        tasks.push_row(vec![
            task.display_label.to_string(),
            task.language.to_string(),
            task.category.short().to_string(),
            task.num_samples.to_string(),
            style.score(report.results_by_task.get(task.benchmark_id).copied().flatten()),
        ]);
    }
    out.push_str(&tasks.render());

    let missing = report.missing_tasks();
    if !missing.is_empty() {
        out.push_str(&format!(
            "\n{} of {} tasks missing (scored as zero)\n",
            missing.len(),
            report.results_by_task.len()
        ));
    }
    out
}

/// Field/value table of submission display metadata.
pub fn render_metadata_table(metadata: &DisplayMetadata) -> String {
    let mut table = TextTable::new(&[("Field", Align::Left), ("Value", Align::Left)]);
    for (field, value) in metadata.rows() {
        table.push_row(vec![field.to_string(), value]);
    }
    format!("Submission Metadata\n{}", table.render())
}
