//! CLI capture integration tests
//!
//! These tests run the `rulewatch` binary against a wiremock server and a
//! scratch database.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_sources(dir: &TempDir, entries: &[(&str, String)]) -> PathBuf {
    let mut text = String::new();
    for (id, url) in entries {
        text.push_str(&format!("[[sources]]\nid = \"{}\"\nurl = \"{}\"\n\n", id, url));
    }
    let path = dir.path().join("sources.toml");
    fs::write(&path, text).unwrap();
    path
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rulewatch"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_capture_then_list_live_rules() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/easylist.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("! Title: Test\n||ads.example^\n##.banner\n"),
        )
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("rules.db");
    let sources = write_sources(
        &temp_dir,
        &[("easylist", format!("{}/easylist.txt", server.uri()))],
    );

    let output = run(
        temp_dir.path(),
        &[
            "--db",
            db.to_str().unwrap(),
            "capture",
            "--sources",
            sources.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "capture failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let out = stdout(&output);
    assert!(out.starts_with("easylist\t"), "unexpected output: {}", out);
    assert!(out.contains("\t200\t+2 -0 =0"), "unexpected output: {}", out);

    let output = run(
        temp_dir.path(),
        &["--db", db.to_str().unwrap(), "live", "--source", "easylist"],
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output), "##.banner\n||ads.example^\n");

    let output = run(
        temp_dir.path(),
        &["--db", db.to_str().unwrap(), "snapshots", "--source", "easylist"],
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output).lines().count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_fetch_is_recorded_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("rules.db");
    let sources = write_sources(
        &temp_dir,
        &[("gone", format!("{}/gone.txt", server.uri()))],
    );

    let output = run(
        temp_dir.path(),
        &[
            "--db",
            db.to_str().unwrap(),
            "capture",
            "--sources",
            sources.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("\t404\t"));

    let output = run(
        temp_dir.path(),
        &["--db", db.to_str().unwrap(), "snapshots", "--source", "gone"],
    );
    let listing = stdout(&output);
    assert!(listing.contains("\t404\t-"), "unexpected listing: {}", listing);
}

#[test]
fn test_capture_requires_input() {
    let temp_dir = TempDir::new().unwrap();
    let output = run(temp_dir.path(), &["capture"]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_sources_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("rules.db");
    let sources = write_sources(&temp_dir, &[("bad", "ftp://example.com/list.txt".to_string())]);

    let output = run(
        temp_dir.path(),
        &[
            "--db",
            db.to_str().unwrap(),
            "capture",
            "--sources",
            sources.to_str().unwrap(),
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}
