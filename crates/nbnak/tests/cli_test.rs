//! Integration tests for the `nbnak` binary.
//!
//! Argument handling and config errors run without a Netbox instance; the
//! end-to-end cases point the binary at a wiremock server through a
//! temporary config file.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `nbnak` binary with env isolation.
///
/// Clears all `NBNAK_*` env vars and points HOME at a nonexistent path so
/// tests never read the user's real `~/.nbnak.cfg`.
fn nbnak_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("nbnak");
    cmd.env("HOME", "/tmp/nbnak-cli-test-nonexistent")
        .env_remove("NBNAK_CONFIG")
        .env_remove("NBNAK_API_URL")
        .env_remove("NBNAK_API_KEY")
        .env_remove("NBNAK_SEARCH_DOMAIN")
        .env_remove("NBNAK_TIMEOUT")
        .env_remove("NBNAK_INSECURE")
        .env_remove("NBNAK_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn write_config(api_url: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".cfg")
        .tempfile()
        .unwrap();
    write!(
        file,
        "[nbnak]\napi_url = {api_url}\napi_key = 0123456789abcdef\nsearch_domain = dc1.example.net\n"
    )
    .unwrap();
    file
}

fn page(results: serde_json::Value) -> serde_json::Value {
    json!({ "count": null, "next": null, "previous": null, "results": results })
}

async fn mock_leaf1(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/dcim/devices/"))
        .and(query_param("name", "leaf1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(json!([{"id": 3, "name": "leaf1"}]))),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/devices/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3, "name": "leaf1"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/interfaces/"))
        .and(query_param("device_id", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([
            {
                "id": 1,
                "name": "Ethernet1",
                "description": "uplink",
                "connected_endpoint_type": "dcim.interface",
                "mode": {"value": "access"},
                "untagged_vlan": {"id": 4, "vid": 40, "name": "users"}
            },
            {
                "id": 2,
                "name": "Ethernet2",
                "connected_endpoint_type": null
            }
        ]))))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/ipam/vlans/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([
            {"id": 4, "vid": 40, "name": "users"}
        ]))))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    nbnak_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Netbox")
            .and(predicate::str::contains("--device"))
            .and(predicate::str::contains("--ports"))
            .and(predicate::str::contains("--vlans")),
    );
}

#[test]
fn test_version_flag() {
    nbnak_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nbnak"));
}

#[test]
fn test_completions_bash() {
    nbnak_cmd()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Usage and config errors ─────────────────────────────────────────

#[test]
fn test_ports_without_device_is_usage_error() {
    let output = nbnak_cmd().arg("--ports").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("--device"), "Expected '--device' in:\n{text}");
}

#[test]
fn test_missing_config_file() {
    let output = nbnak_cmd().arg("--vlans").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let text = combined_output(&output);
    assert!(
        text.contains("Configuration file not found") && text.contains(".nbnak.cfg"),
        "Expected missing-config diagnostic:\n{text}"
    );
}

#[test]
fn test_config_without_api_key() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[nbnak]\napi_url = https://netbox.example.net/api").unwrap();
    let output = nbnak_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("--vlans")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_users_not_implemented() {
    let file = write_config("http://127.0.0.1:9/api");
    let output = nbnak_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("--users")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let text = combined_output(&output);
    assert!(text.contains("not yet implemented"), "Got:\n{text}");
}

#[test]
fn test_unreachable_netbox() {
    let file = write_config("http://127.0.0.1:9/api");
    nbnak_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("--vlans")
        .assert()
        .code(7)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_no_sections_renders_empty_document() {
    let file = write_config("http://127.0.0.1:9/api");
    nbnak_cmd()
        .arg("--config")
        .arg(file.path())
        .assert()
        .success()
        .stdout("---\n{}\n");
}

// ── End-to-end against a mocked Netbox ──────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_document() {
    let server = MockServer::start().await;
    mock_leaf1(&server).await;
    let file = write_config(&format!("{}/api", server.uri()));

    let output = nbnak_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["--device", "leaf1", "--ports", "--vlans"])
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(stdout.starts_with("---\n"), "Got:\n{stdout}");
    assert!(stdout.contains("hostname: leaf1\n"));
    assert!(stdout.contains("  Ethernet1:\n    descr: uplink\n"));
    assert!(stdout.contains("    type: access\n    untagged: 40\n"));
    assert!(stdout.contains("  Ethernet2:\n    clean: true\n"));
    assert!(stdout.contains("vlans:\n  40:\n    name: users\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_output() {
    let server = MockServer::start().await;
    mock_leaf1(&server).await;
    let file = write_config(&format!("{}/api", server.uri()));

    let output = nbnak_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["--device", "leaf1", "--output", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc, json!({"hostname": "leaf1"}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_device_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/devices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([]))))
        .mount(&server)
        .await;
    let file = write_config(&format!("{}/api", server.uri()));

    let output = nbnak_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["--device", "ghost"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let text = combined_output(&output);
    assert!(
        text.contains("Device not found. Tried: ghost, ghost.dc1.example.net"),
        "Got:\n{text}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_api_url_flag_overrides_config() {
    let server = MockServer::start().await;
    mock_leaf1(&server).await;
    let file = write_config("http://127.0.0.1:9/api");

    nbnak_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("--api-url")
        .arg(format!("{}/api", server.uri()))
        .arg("--vlans")
        .assert()
        .success()
        .stdout("---\nvlans:\n  40:\n    name: users\n");
}
