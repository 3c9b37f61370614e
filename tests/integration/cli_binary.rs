//! Integration tests for the sdkgen binary.
//!
//! Each test isolates configuration lookup by pointing HOME, XDG_CONFIG_HOME
//! and --workspace at temporary directories.

#![cfg(unix)]

use crate::integration::test_utils::ModelTree;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn sdkgen(home: &Path, tree: &ModelTree, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sdkgen"))
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("SDKGEN_LOG")
        .arg("--workspace")
        .arg(home)
        .arg("--input")
        .arg(tree.input.path())
        .arg("--output")
        .arg(tree.output.path())
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn run_prints_records_and_summary() {
    let home = TempDir::new().unwrap();
    let tree = ModelTree::new();
    tree.add_service("s3", "com.amazonaws.s3#AmazonS3");

    let output = sdkgen(
        home.path(),
        &tree,
        &["--quiet", "run", "s3", "--build-command", "true"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stdout={} stderr={}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("\"event\": \"started\""));
    assert!(stdout.contains("\"build\": \"success\""));
    assert!(stdout.contains("Processing 1 SDKs"));
    assert!(stdout.contains("Total time:"));
}

#[test]
fn failed_build_exits_non_zero() {
    let home = TempDir::new().unwrap();
    let tree = ModelTree::new();
    tree.add_service("s3", "com.amazonaws.s3#AmazonS3");

    let output = sdkgen(
        home.path(),
        &tree,
        &["--quiet", "run", "s3", "--build-command", "exit 3"],
    );
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"build\": \"failed\""));
    assert!(stdout.contains("Processing 1 SDKs"));
}

#[test]
fn logs_go_to_stderr_not_stdout() {
    let home = TempDir::new().unwrap();
    let tree = ModelTree::new();
    tree.add_service("s3", "com.amazonaws.s3#AmazonS3");

    let output = sdkgen(home.path(), &tree, &["--verbose", "list"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "s3");
    assert!(String::from_utf8_lossy(&output.stderr).contains("sdkgen starting"));
}

#[test]
fn workspace_config_file_is_honored() {
    let home = TempDir::new().unwrap();
    let tree = ModelTree::new();
    std::fs::write(
        home.path().join("sdkgen.toml"),
        "[codegen]\nnamespace_prefix = \"corp.\"\n",
    )
    .unwrap();

    let output = sdkgen(
        home.path(),
        &tree,
        &["--quiet", "names", "com.amazonaws.s3#AmazonS3"],
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("\"namespace\": \"corp.s3\""));
}
