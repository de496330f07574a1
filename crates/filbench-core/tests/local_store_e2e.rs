//! Scores a run laid out the way the evaluation harness writes it to disk,
//! then submits the report to a filesystem sink.

use std::fs;
use std::path::Path;

use filbench_core::{
    compute_score, default_report_path, prepare_submission, read_report_json, write_report_json,
    CachedResultsStore, DisplayMetadata, FilbenchError, FsSubmissionSink, LocalResultsStore,
    ModelType, Multilinguality, ScoreReport, Submission, SubmissionSink, TaskCategory, Taxonomy,
};
use serde_json::{json, Value};

fn write_run(dir: &Path, stamp: &str, doc: Value) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join(format!("results_{}.json", stamp)),
        serde_json::to_string_pretty(&doc).unwrap(),
    )
    .unwrap();
}

fn seed_store(root: &Path) {
    let run_dir = root.join("UD-Filipino").join("details_sea-lion");
    write_run(
        &run_dir,
        "2025-01-10T08-00-00.000000",
        json!({
            "config_general": {"model_name": "sea-lion-v1", "model_dtype": "float16", "model_size": "16 GB"},
            "results": {
                "filbench|kalahi_tgl_mcf|0": {"acc_": 0.40, "acc__stderr": 0.04},
                "filbench|tico19_tgl|0": {"rougeL": 0.30},
                "all": {"acc_": 0.35}
            },
            "versions": {"filbench|kalahi_tgl_mcf|0": 0, "filbench|tico19_tgl|0": 0}
        }),
    );
    write_run(
        &run_dir,
        "2025-02-10T08-00-00.000000",
        json!({
            "config_general": {"model_name": "sea-lion-v2", "model_dtype": "bfloat16", "model_size": "16 GB"},
            "results": {
                "filbench|kalahi_tgl_mcf|0": {"acc_": 0.60, "acc__stderr": 0.04},
                "filbench|kalahi_tgl_mcf|5": {"acc_": 0.99},
                "filbench|belebele_fil_mcf|0": {"acc_": 0.50}
            },
            "versions": {"filbench|kalahi_tgl_mcf|0": 1}
        }),
    );
}

#[test]
fn compute_score_from_harness_layout() {
    let root = tempfile::tempdir().unwrap();
    seed_store(root.path());
    let store = LocalResultsStore::new(root.path());

    let report = compute_score(
        &store,
        &Taxonomy::filbench(),
        "UD-Filipino/details_sea-lion",
        false,
    )
    .unwrap();

    assert_eq!(report.config.model_name.as_deref(), Some("sea-lion-v2"));
    assert_eq!(report.config.model_dtype.as_deref(), Some("bfloat16"));

    // later zero-shot run wins, the 5-shot entry is ignored
    let kalahi = report.results_by_task["kalahi_tgl_mcf"].unwrap();
    assert!((kalahi - 60.0).abs() < 1e-9);
    // earlier-only task survives the merge
    let tico = report.results_by_task["tico19_tgl"].unwrap();
    assert!((tico - 30.0).abs() < 1e-9);
    assert_eq!(report.results_by_task["balita_tgl_mcf"], None);
    assert_eq!(report.versions["filbench|kalahi_tgl_mcf|0"], json!(1));

    // RC: belebele_fil (900 samples) at 50 out of 92_150 samples
    let rc = report.category_scores[&TaskCategory::ReadingComprehension];
    assert!((rc - 50.0 * 900.0 / 92_150.0).abs() < 1e-9);
    // GN: tico19 (971 samples) at 30 out of 5_844 samples
    let gn = report.category_scores[&TaskCategory::Generation];
    assert!((gn - 30.0 * 971.0 / 5_844.0).abs() < 1e-9);
    assert_eq!(report.category_scores[&TaskCategory::ClassicalNlp], 0.0);

    let mean = report.category_scores.values().sum::<f64>() / 4.0;
    assert!((report.filbench_score - mean).abs() < 1e-12);
}

#[test]
fn unknown_run_is_data_unavailable() {
    let root = tempfile::tempdir().unwrap();
    seed_store(root.path());
    let store = CachedResultsStore::new(LocalResultsStore::new(root.path()));

    let err = compute_score(&store, &Taxonomy::filbench(), "UD-Filipino/missing", true).unwrap_err();
    assert!(matches!(err, FilbenchError::DataUnavailable { .. }));
    assert!(err.to_string().contains("UD-Filipino/missing"));
}

#[test]
fn force_refresh_picks_up_new_runs() {
    let root = tempfile::tempdir().unwrap();
    seed_store(root.path());
    let store = CachedResultsStore::new(LocalResultsStore::new(root.path()));
    let id = "UD-Filipino/details_sea-lion";

    let before = compute_score(&store, &Taxonomy::filbench(), id, false).unwrap();
    write_run(
        &root.path().join(id),
        "2025-03-10T08-00-00.000000",
        json!({
            "config_general": {"model_name": "sea-lion-v3"},
            "results": {"filbench|kalahi_tgl_mcf|0": {"acc_": 0.9}},
            "versions": {}
        }),
    );

    let cached = compute_score(&store, &Taxonomy::filbench(), id, false).unwrap();
    assert_eq!(cached, before);

    let refreshed = compute_score(&store, &Taxonomy::filbench(), id, true).unwrap();
    assert_eq!(refreshed.config.model_name.as_deref(), Some("sea-lion-v3"));
    assert!(refreshed.filbench_score > before.filbench_score);
}

#[test]
fn report_then_submit() {
    let root = tempfile::tempdir().unwrap();
    seed_store(root.path());
    let store = LocalResultsStore::new(root.path());
    let id = "UD-Filipino/details_sea-lion";
    let report = compute_score(&store, &Taxonomy::filbench(), id, false).unwrap();

    let out_dir = tempfile::tempdir().unwrap();
    let report_path = out_dir.path().join(default_report_path(id));
    write_report_json(&report_path, &report).unwrap();
    let loaded: ScoreReport = read_report_json(&report_path).unwrap();
    assert_eq!(loaded.category_scores, report.category_scores);

    let metadata = DisplayMetadata::new(
        "AI Singapore",
        "SEA-LION v2",
        "sealion@example.org",
        Multilinguality::SeaSpecific,
        ModelType::Sft,
        8.0,
    );
    let submission = prepare_submission(loaded, metadata).unwrap();
    let sink = FsSubmissionSink::new(out_dir.path().join("submissions"), "UD-Filipino/subs").unwrap();
    let receipt = sink
        .submit("scores_UD-Filipino___details_sea-lion.json", &submission)
        .unwrap();

    assert_eq!(
        receipt.title,
        "FilBench Submission by AI Singapore (SEA-LION v2)"
    );
    let stored: Submission = read_report_json(
        &out_dir
            .path()
            .join("submissions/scores_UD-Filipino___details_sea-lion.json"),
    )
    .unwrap();
    assert_eq!(stored.display_metadata.hash.len(), 64);
    assert_eq!(stored.report.filbench_score, report.filbench_score);
}
