//! Integration tests for the `onuctl` CLI binary.
//!
//! Argument parsing, help output, completions and exit codes run without an
//! API; the session flows run the binary against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `onuctl` binary with env isolation.
///
/// Clears all `ONUCTL_*` env vars and points config and data directories at
/// `home` so tests never touch the user's real configuration or sessions.
fn onuctl_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("onuctl");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ONUCTL_PROFILE")
        .env_remove("ONUCTL_API_URL")
        .env_remove("ONUCTL_OUTPUT")
        .env_remove("ONUCTL_INSECURE")
        .env_remove("ONUCTL_TIMEOUT")
        .env_remove("ONUCTL_USERNAME")
        .env_remove("ONUCTL_PASSWORD");
    cmd
}

fn nowhere() -> PathBuf {
    PathBuf::from("/tmp/onuctl-cli-test-nonexistent")
}

fn session_file(home: &Path) -> PathBuf {
    home.join("data")
        .join("onuctl")
        .join("sessions")
        .join("default.json")
}

/// Persist a fresh session for `api_url` as if `onuctl login` had run.
fn seed_session(home: &Path, api_url: &str) {
    let file = session_file(home);
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    let body = json!({
        "api_url": format!("{api_url}/"),
        "username": "noc",
        "token": "test-token",
        "issued_at": chrono::Utc::now().to_rfc3339(),
    });
    std::fs::write(file, body.to_string()).unwrap();
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = onuctl_cmd(&nowhere()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    onuctl_cmd(&nowhere()).arg("--help").assert().success().stdout(
        predicate::str::contains("ONU")
            .and(predicate::str::contains("login"))
            .and(predicate::str::contains("olt"))
            .and(predicate::str::contains("onu")),
    );
}

#[test]
fn test_onu_help_lists_operations() {
    onuctl_cmd(&nowhere())
        .args(["onu", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("autofind")
                .and(predicate::str::contains("register"))
                .and(predicate::str::contains("search"))
                .and(predicate::str::contains("optical"))
                .and(predicate::str::contains("delete"))
                .and(predicate::str::contains("reboot")),
        );
}

#[test]
fn test_version_flag() {
    onuctl_cmd(&nowhere())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("onuctl"));
}

#[test]
fn test_register_requires_description() {
    onuctl_cmd(&nowhere())
        .args(["onu", "register", "1", "--sn", "HWTC1234567890AB", "--fsp", "0/1/2"])
        .args(["--service", "100"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--description"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    onuctl_cmd(&nowhere())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Configuration and session errors ────────────────────────────────

#[test]
fn test_no_config_points_to_init() {
    let output = onuctl_cmd(&nowhere()).args(["olt", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("config init"), "Expected hint in output:\n{text}");
}

#[test]
fn test_unknown_profile() {
    let output = onuctl_cmd(&nowhere())
        .args(["--profile", "prod", "olt", "list"])
        .output()
        .unwrap();
    let text = combined_output(&output);
    assert!(text.contains("prod"), "Expected profile name in output:\n{text}");
}

#[test]
fn test_not_signed_in_is_auth_error() {
    let home = tempfile::tempdir().unwrap();
    onuctl_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "olt", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("onuctl login"));
}

#[test]
fn test_logout_without_session_succeeds() {
    let home = tempfile::tempdir().unwrap();
    onuctl_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "logout"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No session"));
}

// ── Flows against a mock API ────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_login_then_list_then_logout() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "test-token", "token_type": "bearer" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/device/"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "OLT-North", "vendor": "Huawei", "model": "MA5800-X7" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/device/1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "online" })))
        .mount(&server)
        .await;

    onuctl_cmd(home.path())
        .env("ONUCTL_USERNAME", "noc")
        .env("ONUCTL_PASSWORD", "s3cret")
        .args(["--api-url", &server.uri(), "login"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Signed in"));
    assert!(session_file(home.path()).exists());

    onuctl_cmd(home.path())
        .args(["--api-url", &server.uri(), "--output", "json", "olt", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("OLT-North").and(predicate::str::contains("\"online\"")),
        );

    onuctl_cmd(home.path())
        .args(["--api-url", &server.uri(), "logout"])
        .assert()
        .success();
    assert!(!session_file(home.path()).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wrong_password_exits_with_auth_code() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "no user" })))
        .expect(1)
        .mount(&server)
        .await;

    onuctl_cmd(home.path())
        .env("ONUCTL_USERNAME", "noc")
        .env("ONUCTL_PASSWORD", "wrong")
        .args(["--api-url", &server.uri(), "login"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid username or password"));
    assert!(!session_file(home.path()).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rejected_token_clears_session() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    seed_session(home.path(), &server.uri());

    Mock::given(method("GET"))
        .and(path("/device/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    onuctl_cmd(home.path())
        .args(["--api-url", &server.uri(), "olt", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Session expired"));
    assert!(!session_file(home.path()).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_search_unknown_serial_is_not_found() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    seed_session(home.path(), &server.uri());

    Mock::given(method("POST"))
        .and(path("/device/1/onu/search/sn"))
        .and(body_json(json!({ "sn": "HWTC1234567890AB" })))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "not found" })))
        .expect(1)
        .mount(&server)
        .await;

    onuctl_cmd(home.path())
        .args(["--api-url", &server.uri(), "onu", "search", "1", "HWTC1234567890AB"])
        .assert()
        .code(4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_short_serial_is_rejected_locally() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    seed_session(home.path(), &server.uri());

    Mock::given(method("POST"))
        .and(path("/device/1/onu/search/sn"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    onuctl_cmd(home.path())
        .args(["--api-url", &server.uri(), "onu", "search", "1", "HWTC12"])
        .assert()
        .code(2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_delete_requires_yes_when_not_interactive() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    seed_session(home.path(), &server.uri());

    Mock::given(method("DELETE"))
        .and(path("/device/1/onu/delete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    onuctl_cmd(home.path())
        .args(["--api-url", &server.uri(), "onu", "delete", "1", "HWTC1234567890AB"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_delete_with_yes() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    seed_session(home.path(), &server.uri());

    Mock::given(method("DELETE"))
        .and(path("/device/1/onu/delete"))
        .and(body_json(json!({ "sn": "HWTC1234567890AB" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    onuctl_cmd(home.path())
        .args(["--api-url", &server.uri(), "--yes", "onu", "delete", "1", "HWTC1234567890AB"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Deleted ONU HWTC1234567890AB"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_register_resolves_service_by_vlan() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    seed_session(home.path(), &server.uri());

    Mock::given(method("GET"))
        .and(path("/device/1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 5, "vlan": 100 },
            { "id": 6, "vlan": 200 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/device/1/onu/search/sn"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/device/1/onu/add"))
        .and(body_json(json!({
            "description": "user1",
            "SN": "HWTC1234567890AB",
            "FSP": "0/1/2",
            "nativevlan": false,
            "service_id": 5,
            "interface": "0/1",
            "port": "2"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ONTID": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    onuctl_cmd(home.path())
        .args(["--api-url", &server.uri(), "--output", "plain"])
        .args(["onu", "register", "1", "--sn", "HWTC1234567890AB", "--fsp", "0/1/2"])
        .args(["--service", "100", "--description", "user1"])
        .assert()
        .success()
        .stdout(predicate::str::diff("7\n"));
}
