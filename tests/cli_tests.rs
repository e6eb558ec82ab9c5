//! E2E tests for ref-footnotes CLI

#![allow(deprecated)] // cargo_bin deprecation - will update when assert_cmd stabilizes replacement

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ref_footnotes() -> Command {
    Command::cargo_bin("ref-footnotes").unwrap()
}

#[test]
fn test_help() {
    ref_footnotes()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("title"));
}

#[test]
fn test_version() {
    ref_footnotes()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ref-footnotes"));
}

#[test]
fn test_process_help() {
    ref_footnotes()
        .args(["process", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--debug"))
        .stdout(predicate::str::contains("--transport"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--error-log-dir"));
}

#[test]
fn test_process_requires_output() {
    ref_footnotes()
        .args(["process", "input.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_process_file_not_found() {
    let dir = tempdir().unwrap();
    ref_footnotes()
        .args(["process", "nonexistent.md"])
        .arg(dir.path().join("out.md"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_process_rejects_unknown_transport() {
    ref_footnotes()
        .args(["process", "in.md", "out.md", "--transport", "carrier-pigeon"])
        .assert()
        .failure();
}

#[test]
fn test_process_separators_only() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.md");
    let output = dir.path().join("out.md");
    fs::write(&input, "Claim[^1][^2].\n\n[^1]: A book.\n[^2]: Another.\n").unwrap();

    ref_footnotes()
        .args(["process"])
        .arg(&input)
        .arg(&output)
        .arg("--error-log-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"separators_inserted\":1"))
        .stdout(predicate::str::contains("error_log").not())
        .stderr(predicate::str::contains("Footnote commas inserted: 1"));

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Claim[^1]<sup>,</sup>[^2].\n\n[^1]: A book.\n[^2]: Another.\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_process_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><head><title>Fine Page</title></head></html>", "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(503).set_body_raw(
            "<html><head><title>Just a moment...</title></head></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let input = dir.path().join("in.md");
    let output = dir.path().join("out.md");
    let doc = format!(
        "Text[^a][^b].\n\n[^a]: {0}/ok\n[^b]: {0}/blocked\n",
        server.uri()
    );
    fs::write(&input, doc).unwrap();

    ref_footnotes()
        .args(["process"])
        .arg(&input)
        .arg(&output)
        .arg("--error-log-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"footnotes_rewritten\":2"))
        .stdout(predicate::str::contains("\"errors\":1"))
        .stderr(predicate::str::contains("Errors logged to:"));

    let out = fs::read_to_string(&output).unwrap();
    assert!(out.contains(&format!("[^a]: [Fine Page]({}/ok) retrieved on ", server.uri())));
    assert!(out.contains(&format!(
        "[^b]: [Error retrieving title]({}/blocked) retrieved on ",
        server.uri()
    )));

    let logs: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("errors-"))
        .collect();
    assert_eq!(logs.len(), 1);
}

#[test]
fn test_title_help() {
    ref_footnotes()
        .args(["title", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--transport"));
}

#[test]
fn test_title_no_args() {
    ref_footnotes()
        .arg("title")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_title_invalid_url_reports_error() {
    let dir = tempdir().unwrap();
    ref_footnotes()
        .args(["title", "not-a-url", "--error-log-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ok\":false"))
        .stdout(predicate::str::contains("Error retrieving title"));
}
