//! End-to-end runs over real folders.

use crate::cancellation::CancellationToken;
use crate::config::{FolderMapping, StepSpec};
use crate::core::OperationKind;
use crate::errors::TransferError;
use crate::executors::ExecutorSet;
use crate::guard::PathLocks;
use crate::pipeline::{PipelineRunner, RetryConfig, RunState};
use crate::testing::{FolderFixture, MemoryEndpoint, RecordingNotifier};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const COPY: &str = "copy:@FolderPathOrigin:@SFTPPathDestination";
const VERIFY: &str = "verify:@FolderPathOrigin:@SFTPPathDestination";
const MOVE: &str = "move:@FolderPathOrigin:@ProcessedFilesOnSuccess";
const DELETE: &str = "delete:@FolderPathOrigin";
const NOTIFY: &str = "notify:@EmailNotify";
const INSPECT: &str = "inspect:@InspectLocation";

struct Harness {
    runner: PipelineRunner,
    remote: Arc<MemoryEndpoint>,
    notifier: Arc<RecordingNotifier>,
}

fn harness(remote: MemoryEndpoint, notifier: RecordingNotifier) -> Harness {
    let remote = Arc::new(remote);
    let notifier = Arc::new(notifier);
    let executors = ExecutorSet::new(
        Arc::clone(&remote) as Arc<dyn crate::transport::RemoteEndpoint>,
        Arc::new(PathLocks::default()),
        RetryConfig::default(),
    );
    Harness {
        runner: PipelineRunner::new(Arc::new(executors), Arc::clone(&notifier) as _),
        remote,
        notifier,
    }
}

fn steps(tasks: &[(&str, i32, &str)]) -> Vec<StepSpec> {
    tasks
        .iter()
        .map(|(name, order, task)| StepSpec::new(*name, *order, *task))
        .collect()
}

fn names(dir: &std::path::Path) -> Vec<String> {
    FolderFixture::file_names(dir).unwrap()
}

#[tokio::test]
async fn test_happy_path_local_destination() {
    let root = tempfile::tempdir().unwrap();
    let fixture = FolderFixture::new(root.path()).unwrap();
    fixture.write_origin("a.txt", "alpha").unwrap();
    fixture.write_origin("b.txt", "beta").unwrap();
    let mapping = fixture.mapping(steps(&[
        ("Copy @Name", 1, COPY),
        ("Verify", 2, VERIFY),
        ("Move", 3, MOVE),
        ("Delete", 4, DELETE),
        ("Notify", 5, NOTIFY),
    ]));
    let h = harness(MemoryEndpoint::new(), RecordingNotifier::new());

    let summary = h.runner.run(&mapping, &CancellationToken::new()).await;

    assert_eq!(summary.state, RunState::Done);
    assert!(summary.succeeded());
    assert_eq!(summary.operations[0].name, "Copy Orders");
    assert_eq!(names(&fixture.destination()), vec!["a.txt", "b.txt"]);
    assert_eq!(names(&fixture.success()), vec!["a.txt", "b.txt"]);
    assert!(names(&fixture.origin()).is_empty());
    assert!(names(&fixture.error()).is_empty());
    assert!(summary.error_routing.is_none());

    let reports = h.notifier.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].processed_files, vec!["a.txt", "b.txt"]);
    assert_eq!(reports[0].steps.len(), 4);
    assert_eq!(summary.report.steps.len(), 5);
    assert!(summary.report.all_steps_succeeded());
    assert_eq!(summary.report.run_id, reports[0].run_id);
}

#[tokio::test]
async fn test_failed_copy_short_circuits_and_routes_once() {
    let root = tempfile::tempdir().unwrap();
    let fixture = FolderFixture::new(root.path()).unwrap();
    fixture.write_origin("a.txt", "alpha").unwrap();
    fixture.write_origin("b.txt", "beta").unwrap();
    let mut mapping = fixture.mapping(steps(&[
        ("Copy", 1, COPY),
        ("Verify", 2, VERIFY),
        ("Move", 3, MOVE),
        ("Notify", 4, NOTIFY),
    ]));
    mapping.destination = "SFTP:/upload".to_string();
    let remote = MemoryEndpoint::new().fail_next_uploads(vec![
        TransferError::PermissionDenied("/upload/a.txt".into()),
        TransferError::PermissionDenied("/upload/b.txt".into()),
    ]);
    let h = harness(remote, RecordingNotifier::new());

    let summary = h.runner.run(&mapping, &CancellationToken::new()).await;

    assert_eq!(summary.state, RunState::Failed);
    assert_eq!(summary.executed_kinds(), vec![OperationKind::Copy]);
    assert_eq!(h.remote.upload_attempts(), 2);
    assert_eq!(h.notifier.call_count(), 0);

    assert_eq!(names(&fixture.error()), vec!["a.txt", "b.txt"]);
    assert!(names(&fixture.origin()).is_empty());
    assert!(names(&fixture.success()).is_empty());

    let labels: Vec<&str> = summary.report.steps.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Copy to destination", "Move to error folder"]);
    let routing = summary.error_routing.expect("run should have routed files");
    assert!(routing.result.succeeded, "{}", routing.result.message);
}

#[tokio::test]
async fn test_failed_verify_records_failed_files() {
    let root = tempfile::tempdir().unwrap();
    let fixture = FolderFixture::new(root.path()).unwrap();
    fixture.write_origin("a.txt", "alpha").unwrap();
    let mapping = fixture.mapping(steps(&[
        ("Copy", 1, COPY),
        ("Verify", 2, "verify:@FolderPathOrigin:@ProcessedFilesOnSuccess"),
        ("Move", 3, MOVE),
    ]));
    let h = harness(MemoryEndpoint::new(), RecordingNotifier::new());

    let summary = h.runner.run(&mapping, &CancellationToken::new()).await;

    assert_eq!(summary.state, RunState::Failed);
    assert_eq!(
        summary.executed_kinds(),
        vec![OperationKind::Copy, OperationKind::Verify]
    );
    assert_eq!(summary.report.processed_files, vec!["a.txt"]);
    assert_eq!(summary.report.failed_files, vec!["a.txt"]);
    assert_eq!(names(&fixture.error()), vec!["a.txt"]);
    assert!(names(&fixture.success()).is_empty());
}

#[tokio::test]
async fn test_inspection_applies_to_later_copies() {
    let root = tempfile::tempdir().unwrap();
    let fixture = FolderFixture::new(root.path()).unwrap();
    fixture.write_origin("a.txt", "ORD-00042\n").unwrap();
    let mut mapping = fixture
        .mapping(steps(&[("Inspect", 1, INSPECT), ("Copy", 2, COPY), ("Verify", 3, VERIFY)]))
        .with_inspect_location("00001__0005_0009");
    mapping.destination = "SFTP:/upload/@Inspect_VAR".to_string();
    let h = harness(MemoryEndpoint::new().with_dir("/upload"), RecordingNotifier::new());

    let summary = h.runner.run(&mapping, &CancellationToken::new()).await;

    assert_eq!(summary.state, RunState::Done, "{:?}", summary.report.steps);
    assert_eq!(h.remote.uploads(), vec!["/upload/42/a.txt"]);
    assert!(summary.operations[1].inspection.is_active());
}

#[tokio::test]
async fn test_rooted_inspection_destination_stays_local() {
    let root = tempfile::tempdir().unwrap();
    let fixture = FolderFixture::new(root.path()).unwrap();
    fixture.write_origin("a.txt", "ORD-00042\n").unwrap();
    let mut mapping = fixture
        .mapping(steps(&[("Inspect", 1, INSPECT), ("Copy", 2, COPY), ("Verify", 3, VERIFY)]))
        .with_inspect_location("00001__0005_0009");
    mapping.destination = fixture.destination().join("@Inspect_VAR").display().to_string();
    let h = harness(MemoryEndpoint::new(), RecordingNotifier::new());

    let summary = h.runner.run(&mapping, &CancellationToken::new()).await;

    assert_eq!(summary.state, RunState::Done, "{:?}", summary.report.steps);
    assert_eq!(h.remote.upload_attempts(), 0);
    assert_eq!(names(&fixture.destination().join("42")), vec!["a.txt"]);
}

#[tokio::test]
async fn test_equal_order_keeps_declaration_order() {
    let root = tempfile::tempdir().unwrap();
    let fixture = FolderFixture::new(root.path()).unwrap();
    fixture.write_origin("a.txt", "ORD-00042\n").unwrap();

    let mut inspect_first = fixture
        .mapping(steps(&[("Inspect", 1, INSPECT), ("Copy", 1, COPY)]))
        .with_inspect_location("00001__0005_0009");
    inspect_first.destination = "SFTP:/upload/@Inspect_VAR".to_string();
    let h = harness(MemoryEndpoint::new().with_dir("/upload"), RecordingNotifier::new());
    h.runner.run(&inspect_first, &CancellationToken::new()).await;
    assert_eq!(h.remote.uploads(), vec!["/upload/42/a.txt"]);

    let mut copy_first = fixture
        .mapping(steps(&[("Copy", 1, COPY), ("Inspect", 1, INSPECT)]))
        .with_inspect_location("00001__0005_0009");
    copy_first.destination = "SFTP:/upload/@Inspect_VAR".to_string();
    let h = harness(MemoryEndpoint::new().with_dir("/upload"), RecordingNotifier::new());
    let summary = h.runner.run(&copy_first, &CancellationToken::new()).await;
    assert_eq!(
        summary.executed_kinds(),
        vec![OperationKind::Copy, OperationKind::Inspect]
    );
    assert_eq!(h.remote.uploads(), vec!["/upload/@Inspect_VAR/a.txt"]);
}

#[tokio::test]
async fn test_notify_without_processed_files_is_noop() {
    let root = tempfile::tempdir().unwrap();
    let fixture = FolderFixture::new(root.path()).unwrap();
    let mapping = fixture.mapping(steps(&[("Copy", 1, COPY), ("Notify", 2, NOTIFY)]));
    let h = harness(MemoryEndpoint::new(), RecordingNotifier::new());

    let summary = h.runner.run(&mapping, &CancellationToken::new()).await;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(h.notifier.call_count(), 0);
    assert!(summary.operations[0].result.message.contains("No files to copy"));
}

#[tokio::test]
async fn test_notifier_failure_does_not_fail_run() {
    let root = tempfile::tempdir().unwrap();
    let fixture = FolderFixture::new(root.path()).unwrap();
    fixture.write_origin("a.txt", "alpha").unwrap();
    let mapping = fixture.mapping(steps(&[("Copy", 1, COPY), ("Notify", 2, NOTIFY)]));
    let h = harness(MemoryEndpoint::new(), RecordingNotifier::failing("smtp down"));

    let summary = h.runner.run(&mapping, &CancellationToken::new()).await;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(h.notifier.call_count(), 1);
    assert!(summary.operations[1].result.message.contains("smtp down"));
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let root = tempfile::tempdir().unwrap();
    let fixture = FolderFixture::new(root.path()).unwrap();
    fixture.write_origin("a.txt", "alpha").unwrap();
    let mapping = fixture.mapping(steps(&[("Copy", 1, COPY)]));
    let h = harness(MemoryEndpoint::new(), RecordingNotifier::new());
    let token = CancellationToken::new();
    token.cancel("shutdown");

    let summary = h.runner.run(&mapping, &token).await;

    assert_eq!(summary.state, RunState::Cancelled);
    assert!(summary.operations.is_empty());
    assert!(names(&fixture.destination()).is_empty());
}

#[tokio::test]
async fn test_invalid_steps_are_skipped() {
    let root = tempfile::tempdir().unwrap();
    let fixture = FolderFixture::new(root.path()).unwrap();
    fixture.write_origin("a.txt", "alpha").unwrap();
    let mapping: FolderMapping =
        fixture.mapping(steps(&[("Upload", 1, "upload:@FolderPathOrigin"), ("Copy", 2, COPY)]));
    let h = harness(MemoryEndpoint::new(), RecordingNotifier::new());

    let summary = h.runner.run(&mapping, &CancellationToken::new()).await;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.executed_kinds(), vec![OperationKind::Copy]);
}
