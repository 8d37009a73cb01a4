//! End-to-end tests for the querywait binary
//!
//! Every test points `--config-file` at a temp dir so the user's real
//! config never leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create an isolated test command
fn querywait(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("querywait").unwrap();
    cmd.env_remove("QUERYWAIT_PROFILE")
        .env_remove("QUERYWAIT_ENDPOINT")
        .env_remove("QUERYWAIT_CONFIG_FILE")
        .env_remove("RUST_LOG")
        .arg("--config-file")
        .arg(config_dir.path().join("config.toml"));
    cmd
}

/// Run a blocking command without starving the mock server
async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("EXAMPLES:"))
        .stdout(predicate::str::contains("EXIT CODES:"));
}

#[test]
fn test_wait_help_lists_conditions() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .args(["wait", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("count-gte=N"))
        .stdout(predicate::str::contains("--backoff-multiplier"));
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_args_is_usage_error() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_missing_condition_is_usage_error() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .args(["wait", "--endpoint", "http://127.0.0.1:1/q", "q"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("--for"));
}

#[test]
fn test_bad_duration_is_usage_error() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .args(["wait", "--for", "any", "--timeout", "soon", "q"])
        .assert()
        .code(5);
}

#[test]
fn test_invalid_condition_exit_code() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .args(["wait", "--for", "count>3", "--endpoint", "http://127.0.0.1:1/q", "q"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("count>3"));
}

#[test]
fn test_invalid_condition_wins_over_bad_backoff() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .args(["wait", "--for", "some", "--backoff-multiplier", "0.5", "q"])
        .assert()
        .code(4);
}

#[test]
fn test_invalid_backoff_exit_code() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .args([
            "wait",
            "--for",
            "any",
            "--min-interval",
            "10s",
            "--max-interval",
            "1s",
            "--endpoint",
            "http://127.0.0.1:1/q",
            "q",
        ])
        .assert()
        .code(5);

    querywait(&dir)
        .args([
            "wait",
            "--for",
            "any",
            "--backoff-multiplier",
            "1.0",
            "--endpoint",
            "http://127.0.0.1:1/q",
            "q",
        ])
        .assert()
        .code(5);
}

#[test]
fn test_no_endpoint_exit_code() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .args(["wait", "--for", "any", "q"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("No query endpoint"));
}

#[test]
fn test_unresolved_template_variable() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .args([
            "wait",
            "--for",
            "any",
            "--endpoint",
            "http://127.0.0.1:1/q",
            "order:{{id}}",
        ])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("id"));
}

#[test]
fn test_unreachable_endpoint_is_query_error() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .args([
            "wait",
            "--for",
            "any",
            "--request-timeout",
            "2s",
            "--endpoint",
            "http://127.0.0.1:1/q",
            "q",
        ])
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_succeeds_and_prints_records() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({"query": "order:42"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"records": [{"id": 1}, {"id": 2}]})),
        )
        .mount(&server)
        .await;

    let mut cmd = querywait(&dir);
    cmd.args([
        "wait",
        "--for",
        "count=2",
        "--min-interval",
        "50ms",
        "--max-interval",
        "100ms",
        "--endpoint",
        &format!("{}/query", server.uri()),
        "--var",
        "id=42",
        "-q",
        "order:{{id}}",
    ]);

    let assert = run(cmd).await.success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let records: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(records, json!([{"id": 1}, {"id": 2}]));

    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_attempts_exhausted() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let mut cmd = querywait(&dir);
    cmd.args([
        "wait",
        "--for",
        "any",
        "--max-attempts",
        "2",
        "--min-interval",
        "50ms",
        "--endpoint",
        &server.uri(),
        "q",
    ]);

    run(cmd)
        .await
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("attempt budget exhausted"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_times_out() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": 1}]})))
        .mount(&server)
        .await;

    let mut cmd = querywait(&dir);
    cmd.args([
        "wait",
        "--for",
        "none",
        "--timeout",
        "500ms",
        "--min-interval",
        "100ms",
        "--endpoint",
        &server.uri(),
        "q",
    ]);

    run(cmd)
        .await
        .code(1)
        .stderr(predicate::str::contains("timed out"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_is_not_retried() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("index unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = querywait(&dir);
    cmd.args(["wait", "--for", "any", "--endpoint", &server.uri(), "q"]);

    run(cmd)
        .await
        .code(3)
        .stderr(predicate::str::contains("index unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_query_command_uses_profile() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({"query": "level:error", "limit": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": [{"n": 1}]})))
        .expect(1)
        .mount(&server)
        .await;

    querywait(&dir)
        .args([
            "profile",
            "set",
            "local",
            "--endpoint",
            &format!("{}/search", server.uri()),
        ])
        .assert()
        .success();

    let mut cmd = querywait(&dir);
    cmd.args(["query", "--limit", "5", "-o", "yaml", "level:error"]);

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("n: 1"));
}

#[test]
fn test_profile_lifecycle() {
    let dir = TempDir::new().unwrap();

    querywait(&dir)
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles configured"));

    querywait(&dir)
        .args([
            "profile",
            "set",
            "staging",
            "--endpoint",
            "http://staging.example/query",
            "--header",
            "X-Api-Key=${STAGING_KEY}",
            "--default",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));

    querywait(&dir)
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("staging"))
        .stdout(predicate::str::contains("(default)"));

    querywait(&dir)
        .args(["profile", "show", "staging", "-o", "json"])
        .env("STAGING_KEY", "k-123")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"is_default\": true"))
        .stdout(predicate::str::contains("k-123"));

    // The stored file keeps the reference, not the value
    let stored = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(stored.contains("${STAGING_KEY}"));

    querywait(&dir)
        .args(["profile", "remove", "staging"])
        .assert()
        .success();

    querywait(&dir)
        .args(["profile", "show", "staging"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_profile_path() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .args(["profile", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_corrupt_config_exit_code() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "not = [valid").unwrap();

    querywait(&dir)
        .args(["wait", "--for", "any", "--endpoint", "http://127.0.0.1:1/q", "q"])
        .assert()
        .code(5);
}

#[test]
fn test_invalid_condition_wins_over_corrupt_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "not = [valid").unwrap();

    querywait(&dir)
        .args(["wait", "--for", "bogus", "--endpoint", "http://127.0.0.1:1/q", "q"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("bogus"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_huge_timeout_behaves_as_unbounded() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&server)
        .await;

    let mut cmd = querywait(&dir);
    cmd.args([
        "wait",
        "--for",
        "any",
        "--timeout",
        "10000000000000000000",
        "-q",
        "--endpoint",
        &server.uri(),
        "q",
    ]);

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("\"id\": 1"));
}

#[test]
fn test_huge_config_timeout_does_not_crash() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[wait]\ntimeout_secs = 18446744073709551615\n",
    )
    .unwrap();

    querywait(&dir)
        .args([
            "wait",
            "--for",
            "any",
            "--max-attempts",
            "1",
            "--request-timeout",
            "2s",
            "--endpoint",
            "http://127.0.0.1:1/q",
            "q",
        ])
        .assert()
        .code(3);
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    querywait(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("querywait"));
}
