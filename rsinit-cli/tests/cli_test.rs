#![allow(deprecated)] // Command::cargo_bin; the macro form needs a same-package binary

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

// RSINIT_* variables from the runner would leak into the flags.
// Nothing listens on port 1.
const UNREACHABLE_URI: &str = "mongodb://127.0.0.1:1";

fn rsinit_cmd() -> Command {
    let mut cmd = Command::cargo_bin("rsinit").unwrap();
    cmd.env_remove("RSINIT_URI")
        .env_remove("RSINIT_SET_NAME")
        .env_remove("RSINIT_MEMBER_HOST")
        .env_remove("RSINIT_CONFIG")
        .env_remove("RSINIT_SETTLE_MS")
        .env_remove("RSINIT_POLL_ATTEMPTS")
        .env_remove("RSINIT_SERVER_SELECTION_TIMEOUT_MS")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn help_lists_flags() {
    rsinit_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--set-name"))
        .stdout(contains("--member-host"))
        .stdout(contains("--settle-ms"));
}

#[test]
fn unknown_flag_is_usage_error() {
    rsinit_cmd().arg("--bogus").assert().failure().code(2);
}

#[test]
fn unreachable_server_is_reported_and_fails() {
    rsinit_cmd()
        .args(["--uri", UNREACHABLE_URI, "--server-selection-timeout-ms", "300"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Error checking replica set status"))
        .stdout(contains("Initializing").not());
}

#[test]
fn env_vars_are_honoured() {
    rsinit_cmd()
        .env("RSINIT_URI", UNREACHABLE_URI)
        .env("RSINIT_SERVER_SELECTION_TIMEOUT_MS", "300")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Error checking replica set status"));
}

#[test]
fn config_file_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rsinit.json");
    std::fs::write(
        &path,
        format!(
            r#"{{"connection": {{"uri": "{}", "server_selection_timeout_ms": 300}}}}"#,
            UNREACHABLE_URI
        ),
    )
    .unwrap();

    rsinit_cmd()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Error checking replica set status"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    rsinit_cmd()
        .arg("--config")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Configuration error"));
}

#[test]
fn empty_set_name_is_rejected() {
    rsinit_cmd()
        .args(["--uri", UNREACHABLE_URI, "--set-name", ""])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Invalid replica set config"));
}

#[test]
fn bad_uri_is_connection_error() {
    rsinit_cmd()
        .args(["--uri", "http://localhost:27017"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Connection error"));
}
