//! Integration tests for the `xsched` CLI binary.
//!
//! Argument parsing, help output, completions and config handling run
//! without a scheduler; the remaining tests drive a wiremock scheduler.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `xsched` binary with env isolation.
///
/// Clears all `XSCHED_*` env vars and points the config file at a
/// nonexistent path so tests never touch the user's real configuration.
fn xsched_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("xsched");
    cmd.env("HOME", "/tmp/xsched-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/xsched-cli-test-nonexistent")
        .env("XSCHED_CONFIG", "/tmp/xsched-cli-test-nonexistent/config.toml")
        .env("NO_COLOR", "1")
        .env_remove("XSCHED_PROFILE")
        .env_remove("XSCHED_HOST")
        .env_remove("XSCHED_PORT")
        .env_remove("XSCHED_PASSWORD")
        .env_remove("XSCHED_OUTPUT")
        .env_remove("XSCHED_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Same as [`xsched_cmd`], aimed at a mock scheduler.
fn xsched_at(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = xsched_cmd();
    cmd.args(["--host", "127.0.0.1", "--port"])
        .arg(server.address().port().to_string());
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mock_scheduler(status: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/xScheduleQuery"))
        .and(query_param("Query", "GetPlayingStatus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/xScheduleQuery"))
        .and(query_param("Query", "GetPlayLists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "playlists": [
                {"name": "Xmas", "id": "1", "lengthms": "120000"},
                {"name": "Halloween", "id": "2", "lengthms": "90000"},
            ]
        })))
        .mount(&server)
        .await;
    server
}

/// Run a prepared command off the async runtime.
async fn output_of(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn commands_sent(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/xScheduleCommand")
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "Command")
                .map(|(_, v)| v.into_owned())
        })
        .collect()
}

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = xsched_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    xsched_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("xSchedule")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("playlists"))
            .and(predicate::str::contains("volume")),
    );
}

#[test]
fn test_version_flag() {
    xsched_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("xsched"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    xsched_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    xsched_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = xsched_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_status_without_config_explains_setup() {
    xsched_cmd()
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No scheduler configured").and(predicate::str::contains("config init")));
}

#[test]
fn test_unknown_profile_is_not_found() {
    xsched_cmd()
        .args(["--profile", "attic", "status"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("attic"));
}

#[test]
fn test_invalid_output_format() {
    let output = xsched_cmd()
        .args(["--output", "invalid", "status"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_unreachable_scheduler_is_connection_error() {
    // Port 9 (discard) is closed on test hosts.
    xsched_cmd()
        .args(["--host", "127.0.0.1", "--port", "9", "--timeout", "2", "status"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not connect"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_override() {
    xsched_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/xsched-cli-test-nonexistent/config.toml"));
}

#[test]
fn test_config_show_no_config() {
    // Renders the defaults when no file exists.
    xsched_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("poll_active"));
}

#[test]
fn test_config_show_masks_passwords() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "[profiles.default]\nhost = \"10.0.0.2\"\npassword = \"hunter2\"\n",
    );
    xsched_cmd()
        .env("XSCHED_CONFIG", &path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.0.0.2").and(predicate::str::contains("hunter2").not()));
}

#[test]
fn test_config_profiles_marks_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "default_profile = \"garage\"\n\n[profiles.garage]\nhost = \"10.0.0.2\"\n\n[profiles.yard]\nhost = \"10.0.0.3\"\n",
    );
    xsched_cmd()
        .env("XSCHED_CONFIG", &path)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("garage *").and(predicate::str::contains("yard")));
}

#[test]
fn test_config_use_switches_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "default_profile = \"garage\"\n\n[profiles.garage]\nhost = \"10.0.0.2\"\n\n[profiles.yard]\nhost = \"10.0.0.3\"\n",
    );
    xsched_cmd()
        .env("XSCHED_CONFIG", &path)
        .args(["config", "use", "yard"])
        .assert()
        .success();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("default_profile = \"yard\""), "{written}");
}

// ── Against a mock scheduler ────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json() {
    let server = mock_scheduler(json!({
        "status": "playing",
        "playlist": "Xmas",
        "step": "Intro",
        "positionms": "5000",
        "lengthms": "30000",
        "volume": "60",
    }))
    .await;

    let mut cmd = xsched_at(&server);
    cmd.args(["--output", "json", "status"]);
    let output = output_of(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["status"], "playing");
    assert_eq!(body["playlist"], "Xmas");
    assert_eq!(body["volume"], 60);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_playlists_plain() {
    let server = mock_scheduler(json!({"status": "idle"})).await;

    let mut cmd = xsched_at(&server);
    cmd.args(["--output", "plain", "playlists", "list"]);
    let output = output_of(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Xmas\nHalloween");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_play_sends_command() {
    let server = mock_scheduler(json!({"status": "idle"})).await;
    Mock::given(method("GET"))
        .and(path("/xScheduleCommand"))
        .and(query_param("Command", "Play specified playlist looped"))
        .and(query_param("Parameters", "Halloween"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
        .mount(&server)
        .await;

    let mut cmd = xsched_at(&server);
    cmd.args(["play", "Halloween", "--looped"]);
    let output = output_of(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(commands_sent(&server).await, vec!["Play specified playlist looped"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_play_unknown_playlist_exits_not_found() {
    let server = mock_scheduler(json!({"status": "idle"})).await;

    let mut cmd = xsched_at(&server);
    cmd.args(["play", "Easter"]);
    let output = output_of(cmd).await;

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
    assert!(commands_sent(&server).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_output_on_when_already_on_sends_nothing() {
    let server = mock_scheduler(json!({"status": "idle", "outputtolights": "true"})).await;

    let mut cmd = xsched_at(&server);
    cmd.args(["output", "on"]);
    let output = output_of(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(commands_sent(&server).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_command_exit_code() {
    let server = mock_scheduler(json!({"status": "idle"})).await;
    Mock::given(method("GET"))
        .and(path("/xScheduleCommand"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "Nothing playing."})))
        .mount(&server)
        .await;

    let mut cmd = xsched_at(&server);
    cmd.arg("next");
    let output = output_of(cmd).await;

    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("Nothing playing."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_close_requires_yes_when_not_interactive() {
    let server = mock_scheduler(json!({"status": "idle"})).await;

    let mut cmd = xsched_at(&server);
    cmd.arg("close");
    let output = output_of(cmd).await;

    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(commands_sent(&server).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_raw_query_prints_reply() {
    let server = mock_scheduler(json!({"status": "idle"})).await;
    Mock::given(method("GET"))
        .and(path("/xScheduleQuery"))
        .and(query_param("Query", "GetMatrices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matrices": ["Tree"]})))
        .mount(&server)
        .await;

    let mut cmd = xsched_at(&server);
    cmd.args(["--output", "json-compact", "query", "GetMatrices"]);
    let output = output_of(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"{"matrices":["Tree"]}"#
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_prints_events_of_first_cycle() {
    let server = mock_scheduler(json!({"status": "playing", "playlist": "Xmas", "step": "Intro"})).await;

    let mut cmd = xsched_at(&server);
    cmd.args(["--output", "plain", "watch", "--events-only"])
        .timeout(std::time::Duration::from_secs(3));
    let output = output_of(cmd).await;

    // Killed by the timeout; only the output matters.
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("playlist_started"), "{}", combined_output(&output));
    assert!(stdout.contains("step_changed"), "{}", combined_output(&output));
}
