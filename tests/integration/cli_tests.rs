//! CLI integration tests
//!
//! These tests run the manifestkit binary against the fixture project.

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to the manifestkit binary
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_manifestkit"))
}

/// Run manifestkit with arguments and return (stdout, stderr, success)
fn run_cli(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(binary_path())
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// A throwaway project holding a single manifest
fn scratch_manifest(contents: &str) -> tempfile::TempDir {
    let dir = tempfile::Builder::new().prefix("manifestkit").tempdir().unwrap();
    fs::write(dir.path().join("AndroidManifest.xml"), contents).unwrap();
    dir
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    let (stdout, _, success) = run_cli(&["--help"]);
    assert!(success);
    assert!(stdout.contains("--separate-process"));
    assert!(stdout.contains("--ignore-processes"));
    assert!(stdout.contains("--strict"));
}

#[test]
fn test_version() {
    AssertCommand::new(binary_path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_terminal_report() {
    let project = fixtures_path().join("project");
    let (stdout, _, success) = run_cli(&[&path_arg(&project)]);

    assert!(success);
    assert!(stdout.contains("com.example.notes"));
    assert!(stdout.contains("com.example.notes.MainActivity"));
    assert!(stdout.contains("android.intent.action.MAIN"));
    assert!(stdout.contains("Summary: 2 manifests"));
}

#[test]
fn test_single_manifest_file() {
    let manifest = fixtures_path().join("project/app/src/main/AndroidManifest.xml");
    let (stdout, _, success) = run_cli(&["--format", "json", "--quiet", &path_arg(&manifest)]);

    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["total_manifests"], 1);
    assert_eq!(value["manifests"][0]["source_set"], "main");
}

// ============================================================================
// JSON Output
// ============================================================================

#[test]
fn test_json_stdout() {
    let project = fixtures_path().join("project");
    let (stdout, _, success) = run_cli(&["--format", "json", "--quiet", &path_arg(&project)]);

    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["total_manifests"], 2);
    assert_eq!(value["failed"], 0);

    let main = &value["manifests"][1]["manifest"]["package"];
    assert_eq!(main["package_name"], "com.example.notes");
    assert_eq!(main["services"][0]["process_name"], "com.example.notes:sync");
}

#[test]
fn test_json_output_file() {
    let out_dir = tempfile::Builder::new().prefix("manifestkit").tempdir().unwrap();
    let out_file = out_dir.path().join("report.json");
    let project = fixtures_path().join("project");

    let (stdout, _, success) = run_cli(&[
        "--format",
        "json",
        "--output",
        &path_arg(&out_file),
        &path_arg(&project),
    ]);

    assert!(success);
    assert!(stdout.contains("Report written to"));

    let written = fs::read_to_string(&out_file).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["total_manifests"], 2);
}

#[test]
fn test_ignore_processes_flag() {
    let manifest = fixtures_path().join("project/app/src/main/AndroidManifest.xml");
    let (stdout, _, success) = run_cli(&[
        "--format",
        "json",
        "--quiet",
        "--ignore-processes",
        &path_arg(&manifest),
    ]);

    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        value["manifests"][0]["manifest"]["package"]["services"][0]["process_name"],
        "com.example.notes"
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_invalid_manifest_fails() {
    let invalid = fixtures_path().join("invalid");
    let (stdout, stderr, success) = run_cli(&[&path_arg(&invalid)]);

    assert!(!success);
    assert!(stdout.contains("does not specify package"));
    assert!(stderr.contains("failed to parse"));
}

#[test]
fn test_invalid_manifest_still_reported_as_json() {
    let invalid = fixtures_path().join("invalid");
    let (stdout, _, success) = run_cli(&["--format", "json", "--quiet", &path_arg(&invalid)]);

    assert!(!success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["failed"], 1);
    assert_eq!(value["manifests"][0]["status"], "error");
}

#[test]
fn test_missing_path_fails() {
    AssertCommand::new(binary_path())
        .arg(fixtures_path().join("no-such-project"))
        .assert()
        .failure();
}

#[test]
fn test_strict_rejects_unknown_tags() {
    let project = scratch_manifest(
        r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.strict">
            <application>
                <widget-thing android:name=".Unknown"/>
                <activity android:name=".Main"/>
            </application>
        </manifest>"#,
    );
    let root = path_arg(project.path());

    let (stdout, _, success) = run_cli(&["--format", "json", "--quiet", &root]);
    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        value["manifests"][0]["manifest"]["package"]["activities"][0]["name"],
        "com.example.strict.Main"
    );

    let (stdout, _, success) = run_cli(&["--strict", &root]);
    assert!(!success);
    assert!(stdout.contains("Bad element under <application>: widget-thing"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_sets_format() {
    let project = scratch_manifest(
        r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.configured">
            <application android:label="@string/app_name"/>
        </manifest>"#,
    );
    fs::write(
        project.path().join("manifestkit.toml"),
        "[report]\nformat = \"json\"\n\n[resources.strings]\napp_name = \"Configured\"\n",
    )
    .unwrap();

    let (stdout, _, success) = run_cli(&["--quiet", &path_arg(project.path())]);
    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        value["manifests"][0]["manifest"]["package"]["package_name"],
        "com.example.configured"
    );
}
