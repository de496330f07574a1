//! FilBench CLI
//!
//! The `filbench` command scores evaluation runs against the FilBench task
//! taxonomy and prepares leaderboard submissions.
//!
//! ## Commands
//!
//! - `compute-score`: Score a run and write the score report
//! - `submit`: Attach display metadata to a report and submit it
//! - `leaderboard`: Rank several reports or submissions
//! - `tasks`: List the FilBench tasks and their sample weights

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, Level};

use filbench_core::config::{RESULTS_DIR_ENV, SUBMISSIONS_DATASET_ENV, SUBMISSIONS_DIR_ENV};
use filbench_core::present::{Align, TextTable};
use filbench_core::{
    compute_score, default_report_path, prepare_submission, read_entry, read_report_json,
    render_metadata_table, render_report_table, write_report_json, CachedResultsStore,
    DisplayMetadata, FilbenchConfig, FilbenchError, FsSubmissionSink, Leaderboard,
    LeaderboardFilter, LocalResultsStore, ModelType, Multilinguality, ScoreReport,
    SubmissionSink, TableStyle, Taxonomy, DEFAULT_MAX_PARAMS,
};

#[derive(Parser)]
#[command(name = "filbench")]
#[command(author = "UD-Filipino")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compute and submit FilBench scores", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the FilBench score of an evaluation run
    ComputeScore {
        /// Results identifier, e.g. `UD-Filipino/details_sea-lion`
        results_id: String,

        /// Report path (default: scores_<results_id>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Root directory of the local results store
        #[arg(long, env = RESULTS_DIR_ENV)]
        results_dir: Option<PathBuf>,

        /// Ignore cached results and reload from the store
        #[arg(long)]
        force_refresh: bool,
    },

    /// Submit a score report to the FilBench leaderboard
    Submit {
        /// Report written by `compute-score`
        report_path: PathBuf,

        /// Organization or team submitting the model
        #[arg(long)]
        org: String,

        /// Contact email for the submission
        #[arg(long)]
        contact: String,

        /// Model name shown on the leaderboard
        #[arg(long)]
        model_name: String,

        /// Multilingual, SEA-Specific or Monolingual
        #[arg(long)]
        multilinguality: Multilinguality,

        /// Base, SFT, Preference-aligned or Reasoning
        #[arg(long)]
        model_type: ModelType,

        /// Parameter count in billions
        #[arg(long)]
        num_params: f64,

        /// Update the report and print the metadata without submitting
        #[arg(long)]
        dry_run: bool,

        /// Directory the submission is written into
        #[arg(long, env = SUBMISSIONS_DIR_ENV)]
        submissions_dir: Option<PathBuf>,

        /// Submissions collection recorded in the receipt
        #[arg(long, env = SUBMISSIONS_DATASET_ENV)]
        submissions_dataset: Option<String>,
    },

    /// Rank score reports or submissions
    Leaderboard {
        /// Report or submission files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Drop models larger than this many billion parameters
        #[arg(long, default_value_t = DEFAULT_MAX_PARAMS)]
        max_params: f64,

        /// Show only the best N models
        #[arg(long)]
        top_n: Option<usize>,

        /// Also show reports with missing tasks
        #[arg(long)]
        include_incomplete: bool,

        /// Show only the overall and category scores
        #[arg(long)]
        aggregate: bool,

        /// Render a LaTeX table instead of plain text
        #[arg(long)]
        latex: bool,
    },

    /// List the FilBench tasks
    Tasks,
}

/// Options for `submit` after flag parsing.
struct SubmitArgs {
    report_path: PathBuf,
    metadata: DisplayMetadata,
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    filbench_core::init_tracing(cli.json, level);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    let config = FilbenchConfig::from_env();
    debug!(?config, "loaded configuration");

    match command {
        Commands::ComputeScore {
            results_id,
            output,
            results_dir,
            force_refresh,
        } => {
            let config = match results_dir {
                Some(dir) => config.with_results_dir(dir),
                None => config,
            };
            cmd_compute_score(&config, &results_id, output.as_deref(), force_refresh)
        }
        Commands::Submit {
            report_path,
            org,
            contact,
            model_name,
            multilinguality,
            model_type,
            num_params,
            dry_run,
            submissions_dir,
            submissions_dataset,
        } => {
            let mut config = match submissions_dir {
                Some(dir) => config.with_submissions_dir(dir),
                None => config,
            };
            if let Some(dataset) = submissions_dataset {
                config.submissions_dataset = dataset;
            }
            let metadata = DisplayMetadata::new(
                &org,
                &model_name,
                &contact,
                multilinguality,
                model_type,
                num_params,
            );
            cmd_submit(
                &config,
                SubmitArgs {
                    report_path,
                    metadata,
                    dry_run,
                },
            )
        }
        Commands::Leaderboard {
            paths,
            max_params,
            top_n,
            include_incomplete,
            aggregate,
            latex,
        } => {
            let filter = LeaderboardFilter {
                max_params: Some(max_params),
                top_n,
                include_incomplete,
                aggregate_only: aggregate,
            };
            cmd_leaderboard(&paths, &filter, latex)
        }
        Commands::Tasks => cmd_tasks(),
    }
}

/// Print the failure kind and the identifier it concerns.
fn report_failure(err: &anyhow::Error) {
    match err.downcast_ref::<FilbenchError>() {
        Some(domain) => eprintln!("error[{}]: {:#}", domain.kind(), err),
        None => eprintln!("error: {:#}", err),
    }
}

/// Score a run from the local results store and write the report.
fn cmd_compute_score(
    config: &FilbenchConfig,
    results_id: &str,
    output: Option<&Path>,
    force_refresh: bool,
) -> Result<()> {
    let taxonomy = Taxonomy::filbench();
    let store = CachedResultsStore::new(LocalResultsStore::new(&config.results_dir));

    let report = compute_score(&store, &taxonomy, results_id, force_refresh)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_report_path(results_id));
    write_report_json(&output, &report)
        .with_context(|| format!("Failed to write report to {:?}", output))?;

    println!("{}", render_report_table(&report, &taxonomy, &TableStyle::default()));
    println!("Saved scores to {:?}", output);
    println!(
        "Submit them to the leaderboard with `filbench submit {}`",
        output.display()
    );
    Ok(())
}

/// Enrich a report with display metadata and hand it to the submission sink.
fn cmd_submit(config: &FilbenchConfig, args: SubmitArgs) -> Result<()> {
    let report: ScoreReport = read_report_json(&args.report_path)
        .with_context(|| format!("Failed to read report {:?}", args.report_path))?;

    let submission = prepare_submission(report, args.metadata)?;
    write_report_json(&args.report_path, &submission)
        .with_context(|| format!("Failed to update report {:?}", args.report_path))?;

    println!("{}", render_metadata_table(&submission.display_metadata));

    if args.dry_run {
        println!("Dry run: updated {:?}, nothing submitted", args.report_path);
        return Ok(());
    }

    let path_in_repo = args
        .report_path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Report path has no file name: {:?}", args.report_path))?;

    let sink = FsSubmissionSink::new(&config.submissions_dir, &config.submissions_dataset)?;
    let receipt = sink.submit(path_in_repo, &submission)?;

    println!("{}", receipt.title);
    println!("Submission: {}", receipt.submission_id);
    println!("Location:   {}", receipt.location);
    println!("{}", receipt.description);
    Ok(())
}

/// Rank reports and print them as a text or LaTeX table.
fn cmd_leaderboard(paths: &[PathBuf], filter: &LeaderboardFilter, latex: bool) -> Result<()> {
    let entries = paths
        .iter()
        .map(|path| read_entry(path).with_context(|| format!("Failed to load {:?}", path)))
        .collect::<Result<Vec<_>>>()?;

    let board = Leaderboard::from_entries(entries);
    let taxonomy = Taxonomy::filbench();
    let style = TableStyle::default();

    if latex {
        print!("{}", board.render_latex(&taxonomy, filter, &style));
    } else {
        print!("{}", board.render_text(&taxonomy, filter, &style));
    }
    Ok(())
}

/// List the taxonomy.
fn cmd_tasks() -> Result<()> {
    let taxonomy = Taxonomy::filbench();
    let mut table = TextTable::new(&[
        ("Benchmark", Align::Left),
        ("Metric", Align::Left),
        ("Label", Align::Left),
        ("Lang", Align::Left),
        ("Category", Align::Left),
        ("Samples", Align::Right),
    ]);
    for task in taxonomy.tasks() {
        table.push_row(vec![
            task.benchmark_id.to_string(),
            task.metric_key.to_string(),
            task.display_label.to_string(),
            task.language.to_string(),
            task.category.to_string(),
            task.num_samples.to_string(),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}
