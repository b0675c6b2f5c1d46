//! Integration tests for the themer CLI surface
//!
//! Every case here fails or finishes before a browser would be launched.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn themer() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("themer"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("THEMER_LOG");
    cmd
}

fn write_config(dir: &Path, body: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.join("themer.json");
    std::fs::write(&path, serde_json::to_string_pretty(body).expect("json")).expect("write");
    path
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help() {
    themer().assert().code(2).stderr(predicate::str::contains(
        "Upload and download Help Center themes",
    ));
}

#[test]
fn test_help_lists_commands() {
    themer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("down"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_up_help_documents_persist() {
    themer()
        .args(["up", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--persist"))
        .stdout(predicate::str::contains("--job-timeout"));
}

#[test]
fn test_version_command_shows_version() {
    themer()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "themer {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = themer()
        .args(["--json", "version"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_no_color_env_accepts_any_value() {
    for value in ["1", "true", "yes"] {
        themer()
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("themer "));
    }
}

#[test]
fn test_no_color_flag_is_accepted() {
    themer()
        .env_remove("NO_COLOR")
        .args(["--no-color", "version"])
        .assert()
        .success();
}

// --- Argument errors ---

#[test]
fn test_up_requires_source() {
    themer().arg("up").assert().code(2);
}

#[test]
fn test_unknown_command_exits_with_error() {
    themer().arg("sideways").assert().failure();
}

// --- Config failures (no browser involved) ---

#[test]
fn test_up_with_missing_config_file_fails() {
    themer()
        .args(["up", "/definitely/missing/themer.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("loading config"));
}

#[test]
fn test_up_with_malformed_config_fails() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("themer.json");
    std::fs::write(&path, "{ not json").expect("write");

    themer()
        .arg("up")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}

#[test]
fn test_up_with_invalid_domain_fails() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = write_config(
        dir.path(),
        &serde_json::json!({
            "domain": "ftp://acme.zendesk.com",
            "email": "agent@example.com",
            "password": "secret",
        }),
    );

    themer()
        .arg("up")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid domain"));
}

#[test]
fn test_up_with_missing_target_folder_fails_before_login() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = write_config(
        dir.path(),
        &serde_json::json!({
            "domain": "acme.zendesk.com",
            "email": "agent@example.com",
            "password": "secret",
            "target": "./no-such-theme",
        }),
    );

    themer()
        .arg("up")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid theme source"))
        .stderr(predicate::str::contains("attempt login").not());
}

#[test]
fn test_up_json_error_reports_code() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = write_config(
        dir.path(),
        &serde_json::json!({
            "domain": "acme.zendesk.com",
            "email": "agent@example.com",
            "password": "secret",
            "target": "./no-such-theme",
        }),
    );

    let output = themer()
        .arg("--json")
        .arg("up")
        .arg(&path)
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "invalid_source");
}

#[test]
fn test_up_config_without_target_needs_terminal_for_folder() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = write_config(
        dir.path(),
        &serde_json::json!({
            "domain": "acme.zendesk.com",
            "email": "agent@example.com",
            "password": "secret",
        }),
    );

    themer()
        .arg("up")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing required setting: target"));
}

#[test]
fn test_down_without_config_needs_terminal() {
    themer()
        .arg("down")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing required setting: domain"));
}
