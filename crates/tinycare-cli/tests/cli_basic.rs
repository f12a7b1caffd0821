//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with an isolated config directory and
//! verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &Path, args: &[&str], stdin: impl AsRef<[u8]>) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tinycare"))
        .args(args)
        .env("TINYCARE_CONFIG_DIR", dir)
        .env_remove("TINYCARE_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    {
        let mut input = child.stdin.take().expect("stdin is piped");
        input.write_all(stdin.as_ref()).expect("Failed to write stdin");
    }

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn event_types(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(|line| {
            let value: serde_json::Value =
                serde_json::from_str(line).expect("stdout lines are JSON events");
            value["type"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

#[test]
fn test_config_list_defaults() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"], "");
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["break_time"], 1);
    assert_eq!(json["twitter"]["consumer_key"], "");
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "break_time", "4"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "break_time"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "4");
}

#[test]
fn test_config_set_rejects_zero_break_time() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "break_time", "0"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("break_time"));

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "break_time"], "");
    assert_eq!(stdout.trim(), "1");
}

#[test]
fn test_config_get_unknown_key() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "twitter.nope"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_run_without_credentials_warns_and_keeps_going() {
    let dir = TempDir::new().unwrap();
    let input = concat!(
        r#"{"type":"active_document_changed","open_count":1,"has_active":false}"#,
        "\n",
        r#"{"type":"document_opened","open_count":1}"#,
        "\n",
    );
    let (stdout, stderr, code) = run_cli(dir.path(), &["run"], input);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stderr.contains("You may be missing some of the Twitter configuration."));
    assert_eq!(
        event_types(&stdout),
        ["CareInitFailed", "BreakArmed", "BreakCancelled", "CanStartTimer"]
    );
}

#[test]
fn test_run_skips_malformed_lines() {
    let dir = TempDir::new().unwrap();
    let input = "not json\n{\"type\":\"document_opened\",\"open_count\":0}\n";
    let (stdout, _, code) = run_cli(dir.path(), &["run"], input);
    assert_eq!(code, 0);
    assert_eq!(event_types(&stdout), ["CareInitFailed", "CanStartTimer"]);
}

#[test]
fn test_run_skips_non_utf8_lines() {
    let dir = TempDir::new().unwrap();
    let input = b"\xff\xfe\n{\"type\":\"document_opened\",\"open_count\":0}\n";
    let (stdout, stderr, code) = run_cli(dir.path(), &["run"], input);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(event_types(&stdout), ["CareInitFailed", "CanStartTimer"]);
}

#[test]
fn test_run_rejects_non_positive_break_time() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["run", "--break-time", "-2"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("break_time"));
}

#[test]
fn test_config_set_repairs_invalid_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "break_time = 0\n\n[twitter]\nconsumer_key = \"ck\"\n",
    )
    .unwrap();

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "break_time"], "");
    assert_eq!(code, 1);

    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "break_time", "5"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "break_time"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "5");
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "twitter.consumer_key"], "");
    assert_eq!(stdout.trim(), "ck");
}

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"], "");
    assert_eq!(code, 0);
    assert!(stdout.contains("tinycare"));
}
