//! Basic CLI E2E tests.
//!
//! Tests invoke the built `moveit` binary with `MOVEIT_DATA_DIR` pointed at
//! a temporary directory and verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_moveit"))
        .args(args)
        .env("MOVEIT_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run `moveit run` feeding `input` on stdin.
fn run_session(data_dir: &Path, args: &[&str], input: &str) -> (String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_moveit"))
        .arg("run")
        .args(args)
        .env("MOVEIT_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

#[test]
fn test_profile_show_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["profile", "show"]);
    assert_eq!(code, 0, "profile show failed");

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["level"], 1);
    assert_eq!(parsed["current_experience"], 0);
    assert_eq!(parsed["experience_to_next_level"], 64);
    assert_eq!(parsed["challenges_completed"], 0);
}

#[test]
fn test_profile_reset() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["profile", "reset"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("progress reset"));
}

#[test]
fn test_config_get_default_duration() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "countdown.duration_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1500");
}

#[test]
fn test_config_set_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "countdown.duration_secs", "90"]);
    assert_eq!(code, 0, "config set failed");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "countdown.duration_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "90");
}

#[test]
fn test_config_rejects_zero_duration() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "countdown.duration_secs", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "nope.missing"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_challenge_list_filters_by_category() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["challenge", "list", "--category", "eye"]);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let items = parsed.as_array().unwrap();
    assert!(!items.is_empty());
    assert!(items.iter().all(|c| c["type"] == "eye"));
}

#[test]
fn test_completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("moveit"));
}

#[test]
fn test_run_status_then_quit() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, code) = run_session(dir.path(), &[], "status\nquit\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("Level 1 | 0/64 xp"));
}

#[test]
fn test_run_json_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, code) = run_session(dir.path(), &["--json", "--duration", "5"], "quit\n");
    assert_eq!(code, 0);

    let first = stdout.lines().next().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(parsed["countdown"]["total_secs"], 5);
    assert_eq!(parsed["leveling"]["level"], 1);
}
