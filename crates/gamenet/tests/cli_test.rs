//! Integration tests for the `gamenet` CLI binary.
//!
//! Argument parsing, help output, completions and the offline MAC helpers
//! run without a server; the end-to-end cases talk to a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `gamenet` binary with env isolation.
///
/// Clears all `GAMENET_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn gamenet_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("gamenet");
    cmd.env("HOME", "/tmp/gamenet-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/gamenet-cli-test-nonexistent")
        .env_remove("GAMENET_PROFILE")
        .env_remove("GAMENET_SERVER")
        .env_remove("GAMENET_USERNAME")
        .env_remove("GAMENET_PASSWORD")
        .env_remove("GAMENET_OUTPUT")
        .env_remove("GAMENET_INSECURE")
        .env_remove("GAMENET_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_blocking(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || gamenet_cmd().args(&args).output().unwrap())
        .await
        .unwrap()
}

fn status_body() -> serde_json::Value {
    json!([
        {
            "id": 1,
            "name": "PC-01",
            "mac_address": "AA:BB:CC:DD:EE:01",
            "ip_address": "10.0.0.11",
            "is_online": true,
            "vhd_name": "Win11-Games"
        },
        {
            "id": 2,
            "name": "PC-02",
            "mac_address": "AA:BB:CC:DD:EE:02",
            "ip_address": null,
            "is_online": false,
            "vhd_name": "Win11-Games"
        }
    ])
}

async fn status_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/clients/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = gamenet_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    gamenet_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("GameNet")
            .and(predicate::str::contains("clients"))
            .and(predicate::str::contains("dashboard"))
            .and(predicate::str::contains("vhd")),
    );
}

#[test]
fn test_version_flag() {
    gamenet_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gamenet"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    gamenet_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    gamenet_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── MAC helpers ─────────────────────────────────────────────────────

#[test]
fn test_mac_format_masks_input() {
    gamenet_cmd()
        .args(["mac", "format", "aa-bb-cc-dd-ee-ff-00"])
        .assert()
        .success()
        .stdout("AA:BB:CC:DD:EE:FF\n");
}

#[test]
fn test_mac_validate_accepts_lowercase() {
    gamenet_cmd()
        .args(["mac", "validate", "aa:bb:cc:dd:ee:ff"])
        .assert()
        .success()
        .stdout("AA:BB:CC:DD:EE:FF\n");
}

#[test]
fn test_mac_validate_rejects_dashes() {
    let output = gamenet_cmd()
        .args(["mac", "validate", "AA-BB-CC-DD-EE-FF"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("XX:XX:XX:XX:XX:XX"), "Expected format hint:\n{text}");
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = gamenet_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_clients_list_without_server() {
    let output = gamenet_cmd().args(["clients", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("config"), "Expected config hint:\n{text}");
}

#[test]
fn test_unknown_profile() {
    let output = gamenet_cmd()
        .args(["--profile", "lab", "dashboard"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("lab"));
}

#[test]
fn test_config_path() {
    gamenet_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── End to end ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_clients_list_json() {
    let server = status_server().await;

    let output = run_blocking(vec![
        "--server".into(),
        server.uri(),
        "-o".into(),
        "json".into(),
        "clients".into(),
        "list".into(),
    ])
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["PC-01", "PC-02"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clients_list_filter() {
    let server = status_server().await;

    let output = run_blocking(vec![
        "--server".into(),
        server.uri(),
        "-o".into(),
        "plain".into(),
        "clients".into(),
        "list".into(),
        "--filter".into(),
        "pc-02".into(),
    ])
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reboot_offline_client_is_refused() {
    let server = status_server().await;

    let output = run_blocking(vec![
        "--server".into(),
        server.uri(),
        "--yes".into(),
        "clients".into(),
        "reboot".into(),
        "2".into(),
    ])
    .await;

    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("offline"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dashboard_counts_plain() {
    let server = status_server().await;

    let output = run_blocking(vec![
        "--server".into(),
        server.uri(),
        "-o".into(),
        "plain".into(),
        "dashboard".into(),
        "--no-traffic".into(),
    ])
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1 1 2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_add_rejects_bad_mac_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clients/add"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/clients"))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_blocking(vec![
        "--server".into(),
        server.uri(),
        "clients".into(),
        "add".into(),
        "--name".into(),
        "PC-09".into(),
        "--mac".into(),
        "AABBCC".into(),
    ])
    .await;

    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("mac"));
}
