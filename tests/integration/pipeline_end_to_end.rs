//! End-to-end runs through the real shell build runner.

#![cfg(unix)]

use crate::integration::test_utils::{ModelTree, RecordingProgress};
use sdkgen::cli::{Commands, RunContext};
use sdkgen::config::SdkgenConfig;
use serde_json::Value;
use std::sync::Arc;

fn run_command(units: &[&str], build_command: &str) -> Commands {
    Commands::Run {
        units: units.iter().map(|u| u.to_string()).collect(),
        all: false,
        workers: None,
        build_command: Some(build_command.to_string()),
    }
}

fn context(config: SdkgenConfig, progress: &Arc<RecordingProgress>) -> RunContext {
    RunContext::from_config(config).with_progress(progress.clone())
}

#[tokio::test]
async fn s3_generates_configuration_and_cleans_build_dir() {
    let tree = ModelTree::new();
    tree.add_service("s3", "com.amazonaws.s3#AmazonS3");
    let progress = Arc::new(RecordingProgress::default());

    let out = context(tree.config(), &progress)
        .execute(&run_command(&["s3"], "test -f smithy-build.json && test -d build"))
        .await
        .unwrap();
    assert!(out.success, "summary: {}", out.text);
    assert!(out.text.contains("Processing 1 SDKs"));

    let ws = tree.workspace("s3");
    let config: Value =
        serde_json::from_str(&std::fs::read_to_string(ws.join("smithy-build.json")).unwrap())
            .unwrap();
    let plugin = &config["plugins"]["unison-codegen"];
    assert_eq!(plugin["namespace"], "aws.s3");
    assert_eq!(plugin["name"], "s3");
    assert_eq!(plugin["service"], "com.amazonaws.s3#AmazonS3");
    assert_eq!(plugin["outputDir"], "generated");

    assert!(ws.join("model/s3.json").exists());
    assert!(ws.join("smithy-build.log").exists());
    assert!(!ws.join("build").exists());
    assert!(!ws.join("errors.txt").exists());

    let completed = progress.events("completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["build"], "success");
    assert_eq!(completed[0]["key"], "com.amazonaws.s3#AmazonS3");
}

#[tokio::test]
async fn failed_build_writes_error_excerpt() {
    let tree = ModelTree::new();
    tree.add_service("s3", "com.amazonaws.s3#AmazonS3");
    let progress = Arc::new(RecordingProgress::default());

    let script = "echo 'resolving model'; echo 'ERROR: missing trait'; \
                  for i in 1 2 3; do echo \"  context $i\"; done; exit 2";
    let out = context(tree.config(), &progress)
        .execute(&run_command(&["s3"], script))
        .await
        .unwrap();
    assert!(!out.success);

    let ws = tree.workspace("s3");
    let errors = std::fs::read_to_string(ws.join("errors.txt")).unwrap();
    assert_eq!(
        errors,
        "resolving model\nERROR: missing trait\n  context 1\n  context 2\n  context 3\n"
    );
    assert!(!ws.join("build").exists());
    assert!(ws.join("model").exists());

    let completed = progress.events("completed");
    assert_eq!(completed[0]["build"], "failed");
    assert!(completed[0]["error"]
        .as_str()
        .unwrap()
        .contains("exit status 2"));
}

#[tokio::test]
async fn unit_without_description_is_skipped() {
    let tree = ModelTree::new();
    tree.add_empty_unit("ghost");
    tree.add_service("sqs", "com.amazonaws.sqs#AmazonSQS");
    let progress = Arc::new(RecordingProgress::default());

    let out = context(tree.config(), &progress)
        .execute(&run_command(&["ghost", "sqs"], "true"))
        .await
        .unwrap();
    assert!(out.success, "skipped units do not fail the run");

    assert!(!tree.workspace("ghost").exists());
    assert!(tree.workspace("sqs").join("smithy-build.json").exists());

    let completed = progress.events("completed");
    assert_eq!(completed.len(), 2);
    let ghost = completed.iter().find(|r| r["sdk_id"] == "ghost").unwrap();
    assert_eq!(ghost["build"], "skipped");
}

#[tokio::test]
async fn rerun_produces_identical_configuration() {
    let tree = ModelTree::new();
    tree.add_service("dynamodb", "com.amazonaws.dynamodb#DynamoDB_20120810");
    let progress = Arc::new(RecordingProgress::default());
    let ctx = context(tree.config(), &progress);
    let config_path = tree.workspace("dynamodb").join("smithy-build.json");

    ctx.execute(&run_command(&["dynamodb"], "true")).await.unwrap();
    let first = std::fs::read(&config_path).unwrap();
    ctx.execute(&run_command(&["dynamodb"], "true")).await.unwrap();
    let second = std::fs::read(&config_path).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn stale_errors_removed_after_successful_rerun() {
    let tree = ModelTree::new();
    tree.add_service("ec2", "com.amazonaws.ec2#AmazonEC2");
    let progress = Arc::new(RecordingProgress::default());
    let ctx = context(tree.config(), &progress);
    let errors = tree.workspace("ec2").join("errors.txt");

    ctx.execute(&run_command(&["ec2"], "echo ERROR boom; exit 1"))
        .await
        .unwrap();
    assert!(errors.exists());

    ctx.execute(&run_command(&["ec2"], "true")).await.unwrap();
    assert!(!errors.exists());
}

#[tokio::test]
async fn missing_build_tool_still_cleans_up() {
    let tree = ModelTree::new();
    tree.add_service("sns", "com.amazonaws.sns#AmazonSimpleNotificationService");
    let progress = Arc::new(RecordingProgress::default());

    let out = context(tree.config(), &progress)
        .execute(&run_command(&["sns"], "definitely-not-a-real-build-tool-xyz"))
        .await
        .unwrap();
    assert!(!out.success);

    let ws = tree.workspace("sns");
    assert!(!ws.join("build").exists());
    assert!(ws.join("smithy-build.json").exists());
    // shell reports command-not-found as exit 127
    let completed = progress.events("completed");
    assert_eq!(completed[0]["build"], "failed");
}

#[tokio::test]
async fn all_flag_processes_every_unit() {
    let tree = ModelTree::new();
    tree.add_service("iam", "com.amazonaws.iam#AWSIdentityManagementV20100508");
    tree.add_service("sts", "com.amazonaws.sts#AWSSecurityTokenServiceV20110615");
    let progress = Arc::new(RecordingProgress::default());

    let out = context(tree.config(), &progress)
        .execute(&Commands::Run {
            units: Vec::new(),
            all: true,
            workers: Some(1),
            build_command: Some("true".to_string()),
        })
        .await
        .unwrap();
    assert!(out.success);
    assert!(out.text.contains("Processing 2 SDKs"));
    assert!(out.text.contains("Using 1 workers"));
    assert!(tree.workspace("iam").join("smithy-build.json").exists());
    assert!(tree.workspace("sts").join("smithy-build.json").exists());
}

#[tokio::test]
async fn repeated_unit_on_command_line_builds_once() {
    let tree = ModelTree::new();
    tree.add_service("s3", "com.amazonaws.s3#AmazonS3");
    let progress = Arc::new(RecordingProgress::default());

    let out = context(tree.config(), &progress)
        .execute(&run_command(
            &["s3", "s3"],
            "test -d build && sleep 0.2 && test -d build",
        ))
        .await
        .unwrap();
    assert!(out.success, "summary: {}", out.text);
    assert!(out.text.contains("Processing 1 SDKs"));
    assert_eq!(progress.events("completed").len(), 1);
}
