/// Integration tests for base-level scoring through the public API.
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use atomscore::metrics::Score;
use atomscore::score::compute_base_level_metrics;

const GEESE_HEADER: &str = "#name\tatom_nr\tclass\tstrand\tstart\tend\n";

/// Helper to write a GEESE file with the standard header.
fn create_geese(dir: &Path, file_name: &str, rows: &str) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, format!("{GEESE_HEADER}{rows}")).unwrap();
    path
}

/// Minimal predicted/true pair:
/// sequence1 class 1: predicted [0,19] vs true [10,29] -> TP 10, FP 10, FN 10
/// sequence2: predicted class 2 [10,29] vs true class 1 [0,19]
///            -> class 2 FP 20, class 1 FN 20
fn create_minimal_pair(dir: &Path) -> (PathBuf, PathBuf) {
    let predicted = create_geese(
        dir,
        "predicted.geese",
        "sequence1\t1\t1\t+\t0\t19\nsequence2\t2\t2\t+\t10\t29\n",
    );
    let truth = create_geese(
        dir,
        "true.geese",
        "sequence1\t1\t1\t+\t10\t29\nsequence2\t2\t1\t+\t0\t19\n",
    );
    (predicted, truth)
}

#[test]
fn test_overall_metrics() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let (predicted, truth) = create_minimal_pair(dir.path());

    let score = compute_base_level_metrics(&predicted, &truth, &out, false).unwrap();
    // TP=10, FP=30, FN=30 -> P=R=0.25 -> F1=0.25
    assert_eq!(score, Score::Overall(0.25));

    assert!(out.join("base_metrics_overall.tsv").is_file());
    assert!(out.join("base_predicted_status.tsv").is_file());
    assert!(out.join("base_true_status.tsv").is_file());

    let content = fs::read_to_string(out.join("base_metrics_overall.tsv")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "TP\tFP\tFN\tPrecision\tRecall\tF1-score");
    assert_eq!(lines[1], "10\t30\t30\t0.25\t0.25\t0.25");
}

#[test]
fn test_per_class_metrics() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let (predicted, truth) = create_minimal_pair(dir.path());

    let score = compute_base_level_metrics(&predicted, &truth, &out, true).unwrap();
    let scores = match score {
        Score::PerClass(scores) => scores,
        Score::Overall(_) => panic!("expected per-class scores"),
    };

    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].class, 1);
    // class 1: TP=10, FP=10, FN=30 -> F1 = 1/3
    assert!((scores[0].f1 - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(scores[1].class, 2);
    assert_eq!(scores[1].f1, 0.0);

    assert!(out.join("base_metrics_per_class.tsv").is_file());
}

#[test]
fn test_empty_inputs() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let predicted = create_geese(dir.path(), "predicted.geese", "");
    let truth = create_geese(dir.path(), "true.geese", "");

    let score = compute_base_level_metrics(&predicted, &truth, &out, false).unwrap();
    assert_eq!(score, Score::Overall(0.0));

    let score = compute_base_level_metrics(&predicted, &truth, &out, true).unwrap();
    assert_eq!(score, Score::PerClass(vec![]));
}

#[test]
fn test_partial_overlap_same_class() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let predicted = create_geese(dir.path(), "predicted.geese", "sequence1\t1\t1\t+\t0\t19\n");
    let truth = create_geese(dir.path(), "true.geese", "sequence1\t1\t1\t+\t10\t29\n");

    let score = compute_base_level_metrics(&predicted, &truth, &out, false).unwrap();
    assert_eq!(score, Score::Overall(0.5));
}

#[test]
fn test_partial_overlap_different_classes() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let predicted = create_geese(dir.path(), "predicted.geese", "sequence1\t1\t1\t+\t0\t19\n");
    let truth = create_geese(dir.path(), "true.geese", "sequence1\t1\t2\t+\t10\t29\n");

    let score = compute_base_level_metrics(&predicted, &truth, &out, false).unwrap();
    assert_eq!(score, Score::Overall(0.0));
}

#[test]
fn test_identical_collections_score_one() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let rows = "sequence1\t1\t1\t+\t0\t9\nsequence1\t2\t1\t+\t10\t19\n";
    let predicted = create_geese(dir.path(), "predicted.geese", rows);
    let truth = create_geese(dir.path(), "true.geese", rows);

    let score = compute_base_level_metrics(&predicted, &truth, &out, false).unwrap();
    assert_eq!(score, Score::Overall(1.0));
}

#[test]
fn test_status_fragments_are_not_merged() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let predicted = create_geese(dir.path(), "predicted.geese", "sequence1\t1\t1\t+\t0\t19\n");
    let truth = create_geese(dir.path(), "true.geese", "sequence1\t5\t1\t-\t10\t29\n");

    compute_base_level_metrics(&predicted, &truth, &out, false).unwrap();

    let predicted_status = fs::read_to_string(out.join("base_predicted_status.tsv")).unwrap();
    let lines: Vec<&str> = predicted_status.lines().collect();
    assert_eq!(lines[0], "name\tatom_nr\tclass\tstrand\tstart\tend\tstatus");
    // One FP fragment [0,9] and one TP fragment [10,19] of the same atom.
    assert_eq!(lines[1], "sequence1\t1\t1\t+\t0\t9\tFP");
    assert_eq!(lines[2], "sequence1\t1\t1\t+\t10\t19\tTP");
    assert_eq!(lines.len(), 3);

    let true_status = fs::read_to_string(out.join("base_true_status.tsv")).unwrap();
    let lines: Vec<&str> = true_status.lines().collect();
    assert_eq!(lines[1], "sequence1\t5\t1\t-\t10\t19\tTP");
    assert_eq!(lines[2], "sequence1\t5\t1\t-\t20\t29\tFN");
}

#[test]
fn test_missing_predicted_file() {
    let dir = TempDir::new().unwrap();
    let truth = create_geese(dir.path(), "true.geese", "");

    let err = compute_base_level_metrics(
        &dir.path().join("missing.geese"),
        &truth,
        &dir.path().join("out"),
        false,
    )
    .unwrap_err();
    assert!(format!("{err}").contains("not found"));
}

#[test]
fn test_schema_error_aborts() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let predicted = dir.path().join("predicted.geese");
    fs::write(&predicted, "#name\tclass\tstart\tend\nsequence1\t1\t0\t9\n").unwrap();
    let truth = create_geese(dir.path(), "true.geese", "");

    let err = compute_base_level_metrics(&predicted, &truth, &out, false).unwrap_err();
    assert!(format!("{err:#}").contains("missing required columns"));
}
