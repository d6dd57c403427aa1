//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each test
//! gets its own HOME so runs never touch real user data or each other.

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_HOME: AtomicU32 = AtomicU32::new(0);

fn fresh_home(tag: &str) -> PathBuf {
    let n = NEXT_HOME.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "focusgate-cli-test-{tag}-{}-{n}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).expect("create test home");
    dir
}

/// Run a CLI command against an isolated HOME and return output.
fn run_cli(home: &PathBuf, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "focusgate-cli", "--"])
        .args(args)
        .env("HOME", home)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn timer_status_reports_idle() {
    let home = fresh_home("status");
    let (stdout, _, code) = run_cli(&home, &["timer", "status"]);
    assert_eq!(code, 0, "timer status failed");
    let state: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(state["status"], "idle");
}

#[test]
fn block_add_then_list() {
    let home = fresh_home("block");
    let (stdout, _, code) = run_cli(&home, &["block", "add", "facebook.com"]);
    assert_eq!(code, 0, "block add failed");
    let rule: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rule["pattern"], "facebook.com");

    let (stdout, _, code) = run_cli(&home, &["block", "list"]);
    assert_eq!(code, 0, "block list failed");
    let rules: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rules.as_array().unwrap().len(), 1);
}

#[test]
fn check_blocks_while_focusing() {
    let home = fresh_home("check");
    run_cli(&home, &["block", "add", "facebook.com"]);

    // Idle: allowed.
    let (stdout, _, _) = run_cli(&home, &["check", "https://www.facebook.com/feed"]);
    let decision: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(decision["blocked"], false);

    // Focusing: blocked. The session survives between invocations via the
    // persisted engine snapshot.
    let (_, _, code) = run_cli(&home, &["timer", "start"]);
    assert_eq!(code, 0, "timer start failed");
    let (stdout, _, _) = run_cli(&home, &["check", "https://www.facebook.com/feed"]);
    let decision: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(decision["blocked"], true);
}

#[test]
fn config_get_and_set() {
    let home = fresh_home("config");
    let (stdout, _, code) = run_cli(&home, &["config", "get", "pomodoro.focus_duration"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (_, _, code) = run_cli(&home, &["config", "set", "pomodoro.focus_duration", "50"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&home, &["config", "get", "pomodoro.focus_duration"]);
    assert_eq!(stdout.trim(), "50");
}

#[test]
fn config_rejects_unknown_key() {
    let home = fresh_home("badkey");
    let (_, stderr, code) = run_cli(&home, &["config", "set", "pomodoro.bogus", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error"), "stderr was: {stderr}");
}

#[test]
fn quote_prints_text_and_author() {
    let home = fresh_home("quote");
    let (stdout, _, code) = run_cli(&home, &["quote"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("--"), "stdout was: {stdout}");
}
