//! Integration tests for the setlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Starting, editing and finishing a workout across invocations
//! - Save filtering at finish time
//! - Pre-fill from previous sessions and history reconciliation
//! - CSV export

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI bound to `data_dir`, isolated from the user's config
fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("setlog"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn start_upper(data_dir: &Path) {
    cli(data_dir)
        .args(["start", "--routine", "upper_lower", "--day", "upper"])
        .assert()
        .success();
}

fn session_path(data_dir: &Path) -> std::path::PathBuf {
    data_dir.join("active_session.json")
}

fn write_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, lines.join("\n") + "\n").unwrap();
}

fn direct_log(id: &str, exercise_id: &str, date: &str, weights: &[f64]) -> String {
    let sets: Vec<_> = weights
        .iter()
        .map(|w| serde_json::json!({"weight": w, "reps": 8, "rir": 2, "completed": true}))
        .collect();
    serde_json::json!({
        "id": id,
        "exercise_id": exercise_id,
        "exercise_name": "Bench Press",
        "date": date,
        "sets": sets,
    })
    .to_string()
}

fn legacy_log(id: &str, exercise_id: &str, date: &str, weights: &[f64]) -> String {
    let sets: Vec<_> = weights
        .iter()
        .map(|w| serde_json::json!({"weight": w, "reps": 5, "rir": 1}))
        .collect();
    serde_json::json!({
        "id": id,
        "date": date,
        "entries": [{
            "exercise_id": exercise_id,
            "exercise_name": "Bench Press",
            "sets": sets,
        }],
    })
    .to_string()
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Track an in-progress strength workout",
        ));
}

#[test]
fn test_status_without_session() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No workout in progress."));
}

#[test]
fn test_start_persists_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "--routine", "upper_lower", "--day", "upper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Started Upper / Lower - Upper"))
        .stdout(predicate::str::contains("▶ Bench Press (bench_press)"))
        .stdout(predicate::str::contains("1. - x -"));

    assert!(session_path(data_dir).exists());

    // A later invocation sees the same session
    cli(data_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Barbell Row"));
}

#[test]
fn test_start_unknown_routine_fails() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["start", "--routine", "bro_split", "--day", "arms"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown routine"));

    assert!(!session_path(temp_dir.path()).exists());
}

#[test]
fn test_finish_saves_only_meaningful_sets() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    start_upper(data_dir);

    cli(data_dir)
        .args(["set", "bench_press", "1", "--weight", "100", "--reps", "5"])
        .assert()
        .success();
    cli(data_dir)
        .args(["done", "bench_press", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. 100 x 5 ✓"));
    // RIR alone is not worth saving
    cli(data_dir)
        .args(["set", "barbell_row", "1", "--rir", "2"])
        .assert()
        .success();

    cli(data_dir)
        .arg("finish")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout saved: 1 exercises, 1 sets"));

    assert!(!session_path(data_dir).exists());

    let content = fs::read_to_string(data_dir.join("logs/routine_logs.jsonl")).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 1);

    let log: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(log["routine_id"], "upper_lower");
    assert_eq!(log["day_id"], "upper");
    let entries = log["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["exercise_id"], "bench_press");
    assert_eq!(entries[0]["sets"][0]["weight"], 100.0);
    assert_eq!(entries[0]["sets"][0]["reps"], 5.0);
    assert_eq!(entries[0]["sets"][0]["rir"], 0.0);
}

#[test]
fn test_finish_with_nothing_to_save_keeps_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    start_upper(data_dir);

    cli(data_dir)
        .arg("finish")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to save"));

    assert!(session_path(data_dir).exists());
    assert!(!data_dir.join("logs/routine_logs.jsonl").exists());
}

#[test]
fn test_finish_without_session() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("finish")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workout in progress."));
}

#[test]
fn test_cancel_discards_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    start_upper(data_dir);

    cli(data_dir)
        .arg("cancel")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout discarded."));

    assert!(!session_path(data_dir).exists());
}

#[test]
fn test_add_set_copies_last_set() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    start_upper(data_dir);

    cli(data_dir)
        .args(["set", "bench_press", "3", "--weight", "80", "--reps", "8", "--rir", "1"])
        .assert()
        .success();

    cli(data_dir)
        .args(["add-set", "bench_press"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3. 80 x 8 @1"))
        .stdout(predicate::str::contains("4. 80 x 8\n"));
}

#[test]
fn test_remove_set_keeps_at_least_one() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    start_upper(data_dir);

    for _ in 0..2 {
        cli(data_dir)
            .args(["remove-set", "bench_press", "1"])
            .assert()
            .success();
    }

    cli(data_dir)
        .args(["remove-set", "bench_press", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Cannot remove the last set"));

    cli(data_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("0/1 sets"));
}

#[test]
fn test_unknown_set_number_reported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    start_upper(data_dir);

    cli(data_dir)
        .args(["done", "bench_press", "9"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No set 9 for bench_press"));

    cli(data_dir)
        .args(["done", "deadlift", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No exercise deadlift"));
}

#[test]
fn test_focus_moves_marker() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    start_upper(data_dir);

    cli(data_dir)
        .args(["focus", "barbell_row"])
        .assert()
        .success()
        .stdout(predicate::str::contains("▶ Barbell Row"))
        .stdout(predicate::str::contains("  Bench Press"));
}

#[test]
fn test_start_prefills_weights_from_last_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let two_days_ago = (Utc::now() - Duration::days(2)).to_rfc3339();
    write_lines(
        &data_dir.join("logs/exercise_logs.jsonl"),
        &[direct_log("d1", "bench_press", &two_days_ago, &[90.0, 92.5])],
    );

    cli(data_dir)
        .args(["start", "--routine", "upper_lower", "--day", "upper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. 90 x -"))
        .stdout(predicate::str::contains("2. 92.5 x -"))
        .stdout(predicate::str::contains("3. - x -"));
}

#[test]
fn test_no_prefill_when_already_logged_today() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let now = Utc::now().to_rfc3339();
    write_lines(
        &data_dir.join("logs/exercise_logs.jsonl"),
        &[direct_log("d1", "bench_press", &now, &[90.0])],
    );

    cli(data_dir)
        .args(["start", "--routine", "upper_lower", "--day", "upper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. 90").not());
}

#[test]
fn test_no_prefill_flag() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let last_week = (Utc::now() - Duration::days(7)).to_rfc3339();
    write_lines(
        &data_dir.join("logs/exercise_logs.jsonl"),
        &[direct_log("d1", "bench_press", &last_week, &[90.0])],
    );

    cli(data_dir)
        .args(["start", "--routine", "upper_lower", "--day", "upper", "--no-prefill"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. 90").not());
}

#[test]
fn test_history_deduplicates_sources() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    write_lines(
        &data_dir.join("logs/exercise_logs.jsonl"),
        &[direct_log("d1", "bench_press", "2024-03-10T12:00:00Z", &[80.0])],
    );
    write_lines(
        &data_dir.join("logs/routine_logs.jsonl"),
        &[
            // Same workout recorded through the whole-workout path
            legacy_log("w1", "bench_press", "2024-03-10T12:00:30Z", &[80.0]),
            legacy_log("w2", "bench_press", "2024-03-14T12:00:00Z", &[82.5]),
        ],
    );

    let output = cli(data_dir)
        .args(["history", "bench_press"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&output);

    let rows: Vec<_> = stdout.lines().filter(|l| l.contains("2024-03-1")).collect();
    assert_eq!(rows.len(), 2, "unexpected history output:\n{}", stdout);
    assert!(rows[0].contains("82.5x5"));
    assert!(rows[1].contains("80x8"));
}

#[test]
fn test_history_flags_session_logged_today() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let now = Utc::now().to_rfc3339();
    write_lines(
        &data_dir.join("logs/exercise_logs.jsonl"),
        &[direct_log("d1", "bench_press", &now, &[90.0])],
    );

    cli(data_dir)
        .args(["history", "bench_press"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already logged today."))
        .stdout(predicate::str::contains("90x8"));
}

#[test]
fn test_history_empty() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["history", "bench_press"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No history for bench_press."));
}

#[test]
fn test_export_writes_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    start_upper(data_dir);

    cli(data_dir)
        .args(["set", "bench_press", "1", "--weight", "100", "--reps", "5"])
        .assert()
        .success();
    cli(data_dir)
        .args(["set", "bench_press", "2", "--weight", "100", "--reps", "4"])
        .assert()
        .success();
    cli(data_dir).arg("finish").assert().success();

    cli(data_dir)
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 sets"));

    let csv_content = fs::read_to_string(data_dir.join("export.csv")).unwrap();
    assert!(csv_content.starts_with("log_id,date"));
    assert!(csv_content.contains("bench_press"));
}

#[test]
fn test_routines_listing() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("routines")
        .assert()
        .success()
        .stdout(predicate::str::contains("Upper / Lower (upper_lower)"))
        .stdout(predicate::str::contains("Full Body (full)"));
}

#[test]
fn test_start_replaces_unsaved_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    start_upper(data_dir);

    cli(data_dir)
        .args(["start", "--routine", "upper_lower", "--day", "lower"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Discarding unsaved workout"))
        .stdout(predicate::str::contains("Back Squat"))
        .stdout(predicate::str::contains("Bench Press").not());
}
