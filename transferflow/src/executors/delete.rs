//! Delete origin files.

use super::files::{is_locked, list_source_files};
use super::{FileOperation, RunContext, Shared};
use crate::core::{Operation, OperationKind};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Deletes every file of argument 1, or of the mapping's origin when the
/// argument is absent.
///
/// Files that vanished are skipped; files held open by another process are
/// skipped with a warning.
pub struct DeleteExecutor {
    shared: Shared,
}

impl DeleteExecutor {
    pub(crate) fn new(shared: Shared) -> Self {
        Self { shared }
    }
}

#[async_trait]
impl FileOperation for DeleteExecutor {
    fn label(&self) -> &'static str {
        OperationKind::Delete.report_label()
    }

    async fn execute(&self, op: &mut Operation, ctx: &RunContext<'_>) {
        let origin = match op.non_empty_arg(1) {
            Some(origin) => origin.to_string(),
            None if !ctx.mapping.origin.trim().is_empty() => ctx.mapping.origin.clone(),
            None => {
                op.result.fail("Delete requires an origin folder (argument 1)");
                return;
            }
        };

        let files = match list_source_files(&origin).await {
            Ok(files) => files,
            Err(err) => {
                op.result.fail(format!("Cannot read origin folder: {err}"));
                return;
            }
        };
        if files.is_empty() {
            op.result.succeed(format!("No files to delete in {origin}"));
            return;
        }

        let mut deleted = 0usize;
        for file in &files {
            if ctx.is_cancelled() {
                break;
            }
            let _guard = self.shared.locks.lock(&file.path).await;
            if !file.path.exists() {
                debug!(file = %file.name, "File already gone");
                op.result
                    .push_line(format!("{} no longer exists, skipped", file.name));
                continue;
            }
            if is_locked(&file.path).await {
                warn!(step = %op.name, file = %file.name, "File is in use, skipping delete");
                op.result
                    .push_line(format!("Warning: {} is in use by another process, skipped", file.name));
                continue;
            }
            match tokio::fs::remove_file(&file.path).await {
                Ok(()) => {
                    op.result.push_line(format!("Deleted {}", file.name));
                    deleted += 1;
                }
                Err(err) => {
                    warn!(step = %op.name, file = %file.name, error = %err, "Delete failed");
                    op.result
                        .push_line(format!("Failed to delete {}: {err}", file.name));
                }
            }
        }

        if ctx.is_cancelled() {
            op.result
                .fail(format!("Cancelled after deleting {deleted} of {} file(s)", files.len()));
        } else if deleted > 0 {
            op.result
                .succeed(format!("{deleted} of {} file(s) deleted", files.len()));
        } else {
            op.result.fail("No file was deleted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::config::FolderMapping;
    use crate::executors::ExecutorSet;
    use crate::guard::PathLocks;
    use crate::pipeline::RetryConfig;
    use crate::testing::MemoryEndpoint;
    use std::sync::Arc;
    use std::time::Duration;

    async fn run_delete(mapping: &FolderMapping, arg: Option<String>) -> Operation {
        let set = ExecutorSet::new(
            Arc::new(MemoryEndpoint::new()),
            Arc::new(PathLocks::default()),
            RetryConfig::default(),
        );
        run_delete_with(&set, mapping, arg).await
    }

    async fn run_delete_with(
        set: &ExecutorSet,
        mapping: &FolderMapping,
        arg: Option<String>,
    ) -> Operation {
        let token = CancellationToken::new();
        let mut op = Operation::new(OperationKind::Delete, "Delete", vec![arg]);
        set.for_kind(OperationKind::Delete)
            .unwrap()
            .execute(&mut op, &RunContext::new(mapping, &token))
            .await;
        op
    }

    #[tokio::test]
    async fn test_deletes_every_file() {
        let origin = tempfile::tempdir().unwrap();
        std::fs::write(origin.path().join("a.txt"), "a").unwrap();
        std::fs::write(origin.path().join("b.txt"), "b").unwrap();
        let mapping = FolderMapping::new("Orders", "/in", "/out");

        let op = run_delete(&mapping, Some(origin.path().display().to_string())).await;

        assert!(op.result.succeeded, "{}", op.result.message);
        assert_eq!(std::fs::read_dir(origin.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_defaults_to_mapping_origin() {
        let origin = tempfile::tempdir().unwrap();
        std::fs::write(origin.path().join("a.txt"), "a").unwrap();
        let mapping = FolderMapping::new("Orders", origin.path().display().to_string(), "/out");

        let op = run_delete(&mapping, None).await;

        assert!(op.result.succeeded);
        assert!(!origin.path().join("a.txt").exists());
    }

    #[tokio::test]
    async fn test_empty_folder_succeeds() {
        let origin = tempfile::tempdir().unwrap();
        let mapping = FolderMapping::new("Orders", "/in", "/out");

        let op = run_delete(&mapping, Some(origin.path().display().to_string())).await;

        assert!(op.result.succeeded);
    }

    #[tokio::test]
    async fn test_unreadable_origin_fails() {
        let mapping = FolderMapping::new("Orders", "", "/out");

        let op = run_delete(&mapping, None).await;

        assert!(!op.result.succeeded);
    }

    #[tokio::test]
    async fn test_vanished_file_is_skipped_and_fails() {
        let origin = tempfile::tempdir().unwrap();
        let path = origin.path().join("a.txt");
        std::fs::write(&path, "a").unwrap();
        let locks = Arc::new(PathLocks::default());
        let set = ExecutorSet::new(
            Arc::new(MemoryEndpoint::new()),
            Arc::clone(&locks),
            RetryConfig::default(),
        );
        let mapping = FolderMapping::new("Orders", "/in", "/out");

        // Holding the lock parks the executor after it listed the file.
        let guard = locks.lock(&path).await;
        let remove_then_release = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            std::fs::remove_file(&path).unwrap();
            drop(guard);
        };
        let (op, ()) = futures::join!(
            run_delete_with(&set, &mapping, Some(origin.path().display().to_string())),
            remove_then_release
        );

        assert!(!op.result.succeeded);
        assert!(op.result.message.contains("a.txt no longer exists, skipped"));
        assert_eq!(op.result.last_line(), "No file was deleted");
    }

    #[cfg(windows)]
    #[tokio::test]
    async fn test_file_in_use_is_skipped_and_fails() {
        use std::os::windows::fs::OpenOptionsExt;

        let origin = tempfile::tempdir().unwrap();
        let path = origin.path().join("a.txt");
        std::fs::write(&path, "a").unwrap();
        let _held = std::fs::OpenOptions::new()
            .read(true)
            .share_mode(0)
            .open(&path)
            .unwrap();
        let mapping = FolderMapping::new("Orders", "/in", "/out");

        let op = run_delete(&mapping, Some(origin.path().display().to_string())).await;

        assert!(!op.result.succeeded);
        assert!(op.result.message.contains("Warning: a.txt is in use by another process"));
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_skipped_and_fails() {
        use std::os::unix::fs::PermissionsExt;

        let origin = tempfile::tempdir().unwrap();
        let path = origin.path().join("a.txt");
        std::fs::write(&path, "a").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::File::open(&path).is_ok() {
            // Privileged users read through permission bits.
            return;
        }
        let mapping = FolderMapping::new("Orders", "/in", "/out");

        let op = run_delete(&mapping, Some(origin.path().display().to_string())).await;

        assert!(!op.result.succeeded);
        assert!(op.result.message.contains("Warning: a.txt is in use by another process"));
        assert!(path.exists());
    }
}
