//! Corruption recovery tests for solofit.
//!
//! These tests verify the system can handle:
//! - Corrupted progress files
//! - Corrupted or torn history lines
//! - Missing files

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("solofit"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn start_legs(data_dir: &std::path::Path) -> assert_cmd::assert::Assert {
    cli()
        .arg("start")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["--category", "legs", "--difficulty", "beginner", "--minutes", "10"])
        .arg("--fast")
        .assert()
}

#[test]
fn test_corrupted_progress_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("progress.json"), "{ invalid json }}}}")
        .expect("Failed to write corrupted state");

    start_legs(data_dir)
        .success()
        .stdout(predicate::str::contains("+35 points (total 35)"));

    // The next save replaces the corrupted file
    let contents = fs::read_to_string(data_dir.join("progress.json")).unwrap();
    let progress: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(progress["total_points"], 35);
}

#[test]
fn test_corrupted_history_lines_ignored() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    start_legs(data_dir).success();

    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(data_dir.join("history.jsonl"))
        .unwrap();
    writeln!(file, "{{ this is not a session }}").unwrap();
    write!(file, r#"{{"id":"torn"#).unwrap();
    drop(file);

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workouts completed: 1"));
}

#[test]
fn test_missing_data_dir_is_created() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("nested/data");

    start_legs(&data_dir).success();

    assert!(data_dir.join("progress.json").exists());
    assert!(data_dir.join("history.jsonl").exists());
}

#[test]
fn test_empty_progress_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("progress.json"), "").unwrap();

    cli()
        .arg("settings")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Difficulty:    Intermediate"))
        .stdout(predicate::str::contains("Sound:         on"));
}
