//! Scheduler behavior: concurrency bound, failure isolation, complete reporting.

use crate::integration::test_utils::{ModelTree, RecordingProgress, TrackingRunner};
use sdkgen::pipeline::PipelineContext;
use sdkgen::report::UnitOutcome;
use sdkgen::scheduler::{PoolPolicy, Scheduler};
use std::sync::Arc;
use std::time::Duration;

fn scheduler(
    tree: &ModelTree,
    runner: Arc<TrackingRunner>,
    policy: PoolPolicy,
    progress: Arc<RecordingProgress>,
) -> Scheduler {
    let ctx = PipelineContext::with_runner(&tree.config(), runner).unwrap();
    Scheduler::new(Arc::new(ctx), policy, progress)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_builds_never_exceed_pool_size() {
    let tree = ModelTree::new();
    let units: Vec<String> = (0..10).map(|i| format!("svc{}", i)).collect();
    for unit in &units {
        tree.add_service(unit, &format!("com.example.{}#Service", unit));
    }

    let runner = Arc::new(TrackingRunner::new(Duration::from_millis(40)));
    let progress = Arc::new(RecordingProgress::default());
    let policy = PoolPolicy {
        workers_per_core: 4,
        hard_cap: 3,
        parallelism: 8,
    };
    let summary = scheduler(&tree, runner.clone(), policy, progress.clone())
        .run(units.clone())
        .await;

    assert_eq!(summary.workers, 3);
    assert!(runner.peak() <= 3, "peak concurrency {}", runner.peak());
    assert!(runner.peak() >= 1);
    assert_eq!(summary.results.len(), 10);
    assert_eq!(summary.count(UnitOutcome::Succeeded), 10);
    assert_eq!(progress.events("started").len(), 10);
    assert_eq!(progress.events("completed").len(), 10);
}

#[tokio::test]
async fn every_unit_reports_exactly_one_terminal_state() {
    let tree = ModelTree::new();
    tree.add_service("s3", "com.amazonaws.s3#AmazonS3");
    tree.add_service("ec2", "com.amazonaws.ec2#AmazonEC2");
    tree.add_service("lambda", "com.amazonaws.lambda#AWSGirApiService");
    tree.add_empty_unit("ghost");
    std::fs::create_dir_all(tree.input.path().join("broken")).unwrap();
    std::fs::write(tree.input.path().join("broken/broken.json"), "[1, 2").unwrap();

    let runner = Arc::new(
        TrackingRunner::new(Duration::from_millis(5))
            .failing("ec2")
            .panicking("lambda"),
    );
    let progress = Arc::new(RecordingProgress::default());
    let units: Vec<String> = ["s3", "ec2", "lambda", "ghost", "broken"]
        .iter()
        .map(|u| u.to_string())
        .collect();

    let summary = scheduler(&tree, runner, PoolPolicy::new(4, 64), progress.clone())
        .run(units)
        .await;

    let outcomes: Vec<(String, UnitOutcome)> = summary
        .results
        .iter()
        .map(|r| (r.unit.clone(), r.outcome))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("s3".to_string(), UnitOutcome::Succeeded),
            ("ec2".to_string(), UnitOutcome::Failed),
            ("lambda".to_string(), UnitOutcome::Errored),
            ("ghost".to_string(), UnitOutcome::Skipped),
            ("broken".to_string(), UnitOutcome::Errored),
        ]
    );
    assert_eq!(
        summary.results.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
    assert_eq!(progress.events("completed").len(), 5);

    // the panicking unit's guard still removed its build directory
    assert!(!tree.workspace("lambda").join("build").exists());
    assert!(tree.workspace("lambda").join("smithy-build.json").exists());
    // the failed unit got diagnostics, the others did not
    assert!(tree.workspace("ec2").join("errors.txt").exists());
    assert!(!tree.workspace("s3").join("errors.txt").exists());
}

#[tokio::test]
async fn all_failing_run_still_summarizes() {
    let tree = ModelTree::new();
    tree.add_service("s3", "com.amazonaws.s3#AmazonS3");
    tree.add_service("sqs", "com.amazonaws.sqs#AmazonSQS");
    let runner = Arc::new(
        TrackingRunner::new(Duration::from_millis(1))
            .failing("s3")
            .failing("sqs"),
    );
    let progress = Arc::new(RecordingProgress::default());

    let summary = scheduler(&tree, runner, PoolPolicy::new(4, 64), progress)
        .run(vec!["s3".to_string(), "sqs".to_string()])
        .await;

    assert_eq!(summary.count(UnitOutcome::Failed), 2);
    assert!(!summary.all_ok());
    let text = summary.render(false);
    assert!(text.contains("Processing 2 SDKs"));
    assert!(text.contains("0 succeeded, 2 failed"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn repeated_unit_runs_once() {
    let tree = ModelTree::new();
    tree.add_service("s3", "com.amazonaws.s3#AmazonS3");
    tree.add_service("ec2", "com.amazonaws.ec2#AmazonEC2");

    let runner = Arc::new(TrackingRunner::new(Duration::from_millis(100)));
    let progress = Arc::new(RecordingProgress::default());
    let units: Vec<String> = ["s3", "s3", "ec2", "s3"]
        .iter()
        .map(|u| u.to_string())
        .collect();

    let policy = PoolPolicy::new(4, 64);
    let summary = scheduler(&tree, runner.clone(), policy, progress.clone())
        .run(units)
        .await;

    let ran: Vec<&str> = summary.results.iter().map(|r| r.unit.as_str()).collect();
    assert_eq!(ran, vec!["s3", "ec2"]);
    assert_eq!(summary.count(UnitOutcome::Succeeded), 2);
    assert_eq!(runner.builds(), 2);
    assert_eq!(runner.lost_build_dirs(), 0);
    assert_eq!(progress.events("started").len(), 2);
}

#[tokio::test]
async fn path_like_unit_ids_are_errored_without_touching_disk() {
    let tree = ModelTree::new();
    tree.add_service("s3", "com.amazonaws.s3#AmazonS3");
    let outside = tree.output.path().parent().unwrap().join("build");
    let existed = outside.exists();

    let runner = Arc::new(TrackingRunner::new(Duration::from_millis(1)));
    let progress = Arc::new(RecordingProgress::default());
    let units: Vec<String> = ["..", "/srv", "s3/../..", "s3"]
        .iter()
        .map(|u| u.to_string())
        .collect();

    let policy = PoolPolicy::new(4, 64);
    let summary = scheduler(&tree, runner.clone(), policy, progress.clone())
        .run(units)
        .await;

    let outcomes: Vec<UnitOutcome> = summary.results.iter().map(|r| r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            UnitOutcome::Errored,
            UnitOutcome::Errored,
            UnitOutcome::Errored,
            UnitOutcome::Succeeded,
        ]
    );
    assert_eq!(runner.builds(), 1);
    assert_eq!(outside.exists(), existed);
    assert!(!tree.output.path().join("smithy-build.json").exists());

    let completed = progress.events("completed");
    let rejected = completed.iter().find(|r| r["sdk_id"] == "..").unwrap();
    assert_eq!(rejected["error_kind"], "invalid_unit");
    assert!(rejected.get("path").is_none());
}
