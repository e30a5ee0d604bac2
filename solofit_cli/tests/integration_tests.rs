//! Integration tests for the solofit binary.
//!
//! These tests verify end-to-end behavior including:
//! - Workout composition
//! - Running, completing and stopping sessions
//! - Preferences, history, export and reset

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("solofit"))
}

fn read_progress(data_dir: &Path) -> Value {
    let contents = fs::read_to_string(data_dir.join("progress.json")).expect("progress.json");
    serde_json::from_str(&contents).expect("valid progress JSON")
}

fn read_history(data_dir: &Path) -> Vec<Value> {
    let contents = fs::read_to_string(data_dir.join("history.jsonl")).unwrap_or_default();
    contents
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("valid history line"))
        .collect()
}

/// Complete a beginner legs workout (3 exercises, 80 seconds)
fn complete_legs_workout(data_dir: &Path) {
    cli()
        .arg("start")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["--category", "legs", "--difficulty", "beginner", "--minutes", "10"])
        .arg("--fast")
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Solo home workout trainer"));
}

#[test]
fn test_compose_json_output() {
    let temp_dir = setup_test_dir();

    let output = cli()
        .arg("compose")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["--category", "legs", "--difficulty", "beginner", "--minutes", "10"])
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let workout: Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = workout["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["squats", "lunges", "calf_raises"]);
    assert_eq!(workout["total_duration_seconds"], 80);
    assert_eq!(workout["mode"], "normal");
}

#[test]
fn test_compose_challenge_includes_all_tiers() {
    let temp_dir = setup_test_dir();

    let output = cli()
        .arg("compose")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["--category", "hiit", "--difficulty", "advanced", "--minutes", "1"])
        .arg("--challenge")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let workout: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(workout["exercises"].as_array().unwrap().len(), 5);
    assert_eq!(workout["mode"], "challenge");
}

#[test]
fn test_compose_unknown_category_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("compose")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["--category", "swimming"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category"));
}

#[test]
fn test_start_fast_completes_and_persists() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("start")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["--category", "legs", "--difficulty", "beginner", "--minutes", "10"])
        .arg("--fast")
        .assert()
        .success()
        .stdout(predicate::str::contains("▶ 2/3 Lunges"))
        .stdout(predicate::str::contains("Achievement unlocked: First Workout"))
        .stdout(predicate::str::contains("Workout complete in 1:20"))
        .stdout(predicate::str::contains("+35 points (total 35)"));

    let progress = read_progress(data_dir);
    assert_eq!(progress["total_points"], 35);
    let kinds: Vec<&str> = progress["achievements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds[0], "first_workout");

    let history = read_history(data_dir);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["completed"], true);
    assert_eq!(history[0]["duration_seconds"], 80);
    assert!(history[0]["ended_at"].is_string());
}

#[test]
fn test_stop_after_archives_incomplete_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("start")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["--category", "yoga", "--difficulty", "beginner"])
        .args(["--fast", "--stop-after", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout stopped after 0:05"))
        .stdout(predicate::str::contains("Achievement unlocked").not());

    let history = read_history(data_dir);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["completed"], false);
    assert_eq!(history[0]["duration_seconds"], 5);
    assert!(history[0]["ended_at"].is_null());

    let progress = read_progress(data_dir);
    assert_eq!(progress["total_points"], 0);
    assert!(progress["achievements"].as_array().unwrap().is_empty());
}

#[test]
fn test_start_empty_workout_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("start")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["--category", "legs", "--minutes", "0", "--fast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Workout has no exercises"));

    assert!(read_history(temp_dir.path()).is_empty());
}

#[test]
fn test_settings_persist_and_drive_composition() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("settings")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["--difficulty", "beginner", "--duration", "10", "--voice", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Difficulty:    Beginner"))
        .stdout(predicate::str::contains("Duration:      10 min"))
        .stdout(predicate::str::contains("Voice prompts: on"));

    let progress = read_progress(data_dir);
    assert_eq!(progress["preferences"]["difficulty"], "beginner");
    assert_eq!(progress["preferences"]["duration"], "short");
    assert_eq!(progress["preferences"]["voice_prompts_enabled"], true);

    let output = cli()
        .arg("compose")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["--category", "legs", "--json"])
        .output()
        .unwrap();
    let workout: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(workout["difficulty"], "beginner");
    assert_eq!(workout["total_duration_seconds"], 80);
}

#[test]
fn test_settings_rejects_unsupported_duration() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("settings")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["--duration", "12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("10, 15 or 30"));
}

#[test]
fn test_history_lists_and_exports() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    complete_legs_workout(data_dir);
    complete_legs_workout(data_dir);

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Legs").count(2));

    let csv_path = data_dir.join("export/history.csv");
    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--csv")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 sessions"));

    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("id,category,difficulty,mode"));
    assert!(lines[1].contains(",legs,beginner,normal,"));
}

#[test]
fn test_points_accumulate_across_sessions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    for _ in 0..3 {
        complete_legs_workout(data_dir);
    }

    let progress = read_progress(data_dir);
    assert_eq!(progress["total_points"], 105);

    let kinds: Vec<&str> = progress["achievements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"points100"));
    assert_eq!(kinds.iter().filter(|k| **k == "first_workout").count(), 1);
}

#[test]
fn test_reset_keeps_points_and_achievements() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    complete_legs_workout(data_dir);

    cli()
        .arg("reset")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 sessions"));

    assert!(read_history(data_dir).is_empty());
    let progress = read_progress(data_dir);
    assert_eq!(progress["total_points"], 35);
    assert!(!progress["achievements"].as_array().unwrap().is_empty());

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No sessions yet."));
}

#[test]
fn test_stats_is_default_command() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Workouts completed: 0"))
        .stdout(predicate::str::contains("Total time:         0m"));
}

#[test]
fn test_stats_after_session() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    complete_legs_workout(data_dir);

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workouts completed: 1"))
        .stdout(predicate::str::contains("Total time:         1m"))
        .stdout(predicate::str::contains("Longest streak:     1 days"))
        .stdout(predicate::str::contains("Last workout:       Legs"));
}

#[test]
fn test_achievements_listing() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("achievements")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("First Workout"))
        .stdout(predicate::str::contains("1000 Points"))
        .stdout(predicate::str::contains("100 more for 100 Points"));
}

#[test]
fn test_catalog_listing() {
    cli()
        .arg("catalog")
        .args(["--category", "legs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bulgarian Split Squats"))
        .stdout(predicate::str::contains("advanced"))
        .stdout(predicate::str::contains("Bedtime Yoga").not());
}

#[test]
fn test_catalog_does_not_touch_data_dir() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("never/created");

    cli()
        .arg("catalog")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Squats"));

    assert!(!temp_dir.path().join("never").exists());
}
