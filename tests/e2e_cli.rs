//! CLI end-to-end tests
//!
//! Tests for the playgate command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the playgate binary
#[allow(deprecated)]
fn playgate_cmd() -> Command {
    Command::cargo_bin("playgate").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = playgate_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = playgate_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("playgate"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = playgate_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "playgate {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_start_help() {
    let mut cmd = playgate_cmd();
    cmd.args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start the HTTP server"));
}

#[test]
fn test_cli_classify_mega_link() {
    let mut cmd = playgate_cmd();
    cmd.args(["classify", "https://mega.nz/file/ABC#KEY"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://mega.nz/embed/ABC#KEY"))
        .stdout(predicate::str::contains("no-referrer"));
}

#[test]
fn test_cli_classify_unknown_host() {
    let mut cmd = playgate_cmd();
    cmd.args(["classify", "https://random-host.example/v/1", "--provider", "Pdrain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"frame\""))
        .stdout(predicate::str::contains("\"referrer_policy\": \"origin\""));
}

#[test]
fn test_cli_classify_honours_relay_toggle() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("playgate.toml");
    fs::write(&config_path, "[classifier]\nrelay_direct_media = true\n").unwrap();

    let mut cmd = playgate_cmd();
    cmd.arg("--config")
        .arg(&config_path)
        .args(["classify", "https://cdn.example/ep.mp4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("relayed_video"));
}

#[test]
fn test_cli_classify_requires_url() {
    let mut cmd = playgate_cmd();
    cmd.arg("classify").assert().failure();
}

#[test]
fn test_cli_resolve_unreachable_link_fails_open() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("playgate.toml");
    fs::write(&config_path, "[resolver]\ntimeout_secs = 1\n").unwrap();

    let mut cmd = playgate_cmd();
    cmd.arg("--config")
        .arg(&config_path)
        .args(["resolve", "http://127.0.0.1:1/safelink"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://127.0.0.1:1/safelink"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("playgate.toml");
    fs::write(
        &config_path,
        r#"
[server]
port = 9000

[metadata]
base_url = "https://api.example/v1"
"#,
    )
    .unwrap();

    let mut cmd = playgate_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("0.0.0.0:9000"))
        .stdout(predicate::str::contains("https://api.example/v1"));
}

#[test]
fn test_cli_validate_reports_warnings() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("playgate.toml");
    fs::write(&config_path, "[server]\nport = 8081\n").unwrap();

    let mut cmd = playgate_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("metadata.base_url is not set"));
}

#[test]
fn test_cli_validate_rejects_invalid_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("playgate.toml");
    fs::write(&config_path, "[session]\nexpiry_secs = 0\n").unwrap();

    let mut cmd = playgate_cmd();
    cmd.arg("validate").arg(&config_path).assert().failure();
}

#[test]
fn test_cli_validate_missing_file() {
    let mut cmd = playgate_cmd();
    cmd.args(["validate", "/nonexistent/playgate.toml"])
        .assert()
        .failure();
}
