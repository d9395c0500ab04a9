//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_habitloop"))
        .env("HABITLOOP_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

/// `habit add` prints a header line followed by the habit JSON.
fn add_habit(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "habit add failed: {stderr}");
    let (header, body) = stdout.split_once('\n').unwrap();
    assert!(header.starts_with("Habit created: "));
    let habit: serde_json::Value = serde_json::from_str(body).unwrap();
    habit["id"].as_str().unwrap().to_string()
}

#[test]
fn test_habit_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    add_habit(dir.path(), &["habit", "add", "Read", "--reminder", "21:30"]);

    let habits = run_json(dir.path(), &["habit", "list"]);
    let habits = habits.as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["habit"]["name"], "Read");
    assert_eq!(habits[0]["habit"]["reminder_time"], "21:30");
    assert_eq!(habits[0]["done_today"], false);
}

#[test]
fn test_done_is_idempotent_and_feeds_stats() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["habit", "add", "Walk"]);

    run_json(dir.path(), &["habit", "done", &id]);
    let state = run_json(dir.path(), &["habit", "done", &id]);
    assert_eq!(state["streak"], 1);
    assert_eq!(state["is_done_today"], true);

    let level = run_json(dir.path(), &["stats", "level"]);
    assert_eq!(level["xp"], 10);
    assert_eq!(level["level"], 1);

    let state = run_json(dir.path(), &["habit", "undo", &id]);
    assert_eq!(state["streak"], 0);
}

#[test]
fn test_done_with_explicit_dates() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["habit", "add", "Stretch"]);

    run_json(dir.path(), &["habit", "done", &id, "--date", "2026-03-09"]);
    let state = run_json(dir.path(), &["habit", "done", &id, "--date", "2026-03-10"]);
    assert_eq!(state["as_of"], "2026-03-10");
    assert_eq!(state["streak"], 2);

    let (_, stderr, code) = run_cli(dir.path(), &["habit", "done", &id, "--date", "10/03/2026"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid date"));
}

#[test]
fn test_invalid_input_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();

    let (_, stderr, code) = run_cli(dir.path(), &["habit", "add", "Run", "--reminder", "7pm"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));

    let (_, stderr, code) = run_cli(dir.path(), &["habit", "done", "no-such-habit"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_category_rename_and_blocked_delete() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["category", "add", "Fitness", "--color", "#FF8800"]);
    let id = add_habit(dir.path(), &["habit", "add", "Run", "--category", "Fitness"]);

    let (stdout, _, code) = run_cli(dir.path(), &["category", "rename", "Fitness", "Movement"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("1 habit(s) moved"));

    let shown = run_json(dir.path(), &["habit", "show", &id]);
    assert_eq!(shown["habit"]["category"], "Movement");

    let (_, stderr, code) = run_cli(dir.path(), &["category", "delete", "Movement"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("still used"));

    let (_, _, code) = run_cli(
        dir.path(),
        &["category", "delete", "Movement", "--reassign-to", "General"],
    );
    assert_eq!(code, 0);
    let categories = run_json(dir.path(), &["category", "list"]);
    assert_eq!(categories.as_array().unwrap().len(), 1);
}

#[test]
fn test_stats_activity_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["habit", "add", "Journal"]);
    run_json(dir.path(), &["habit", "done", &id]);

    let activity = run_json(dir.path(), &["stats", "activity", "--days", "7"]);
    let days = activity.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[6]["completions"], 1);

    let default_window = run_json(dir.path(), &["stats", "activity"]);
    assert_eq!(default_window.as_array().unwrap().len(), 28);

    let summary = run_json(dir.path(), &["stats", "summary"]);
    assert_eq!(summary["habits"], 1);
    assert_eq!(summary["today_rate_pct"], 100);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "reminders.cooldown_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "60");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "reminders.cooldown_secs", "120"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "reminders.cooldown_secs"]);
    assert_eq!(stdout.trim(), "120");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "reminders.poll_interval_secs", "0"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_remind_status_lists_scheduled_habits() {
    let dir = tempfile::tempdir().unwrap();
    add_habit(dir.path(), &["habit", "add", "Vitamins", "--reminder", "8:00"]);
    add_habit(dir.path(), &["habit", "add", "Read"]);

    let status = run_json(dir.path(), &["remind", "status"]);
    assert_eq!(status["enabled"], true);
    assert!(status["last_fired"].is_null());
    let habits = status["habits"].as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["reminder_time"], "08:00");
}
