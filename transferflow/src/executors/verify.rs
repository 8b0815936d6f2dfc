//! Verify that copied files are present at their destination.

use super::files::{list_source_files, local_size, SourceFile};
use super::{directory_for_file, Destination, FileOperation, RunContext, Shared};
use crate::core::{InspectionContext, Operation, OperationKind};
use crate::transport::join_remote;
use async_trait::async_trait;
use std::path::Path;
use tracing::warn;

enum Finding {
    Present(String),
    Missing(String),
    SizeMismatch { path: String, expected: u64, actual: u64 },
    Error(String),
}

/// Checks that every file of argument 1 exists under argument 2.
///
/// Local destinations also require equal sizes. Missing, mismatched, and
/// unreadable files are added to the failed list and fail the step. The
/// inspection value is recomputed here per file, independently of the copy.
pub struct VerifyExecutor {
    shared: Shared,
}

impl VerifyExecutor {
    pub(crate) fn new(shared: Shared) -> Self {
        Self { shared }
    }

    async fn verify_one(
        &self,
        destination: &Destination,
        inspection: &InspectionContext,
        file: &SourceFile,
    ) -> Finding {
        let dir = match directory_for_file(destination, inspection, file).await {
            Ok(dir) => dir,
            Err(err) => return Finding::Error(err.to_string()),
        };

        if destination.is_local() {
            let target = Path::new(&dir).join(&file.name);
            let path = target.display().to_string();
            return match local_size(&target).await {
                Ok(Some(actual)) if actual == file.size => Finding::Present(path),
                Ok(Some(actual)) => Finding::SizeMismatch {
                    path,
                    expected: file.size,
                    actual,
                },
                Ok(None) => Finding::Missing(path),
                Err(err) => Finding::Error(err.to_string()),
            };
        }

        let target = join_remote(&dir, &file.name);
        match self.shared.remote.exists(&target).await {
            Ok(true) => Finding::Present(target),
            Ok(false) => Finding::Missing(target),
            Err(err) => Finding::Error(err.to_string()),
        }
    }
}

#[async_trait]
impl FileOperation for VerifyExecutor {
    fn label(&self) -> &'static str {
        OperationKind::Verify.report_label()
    }

    async fn execute(&self, op: &mut Operation, ctx: &RunContext<'_>) {
        let (Some(origin), Some(target)) = (
            op.non_empty_arg(1).map(str::to_string),
            op.non_empty_arg(2).map(str::to_string),
        ) else {
            op.result.fail(
                "Verify requires an origin folder (argument 1) and a destination (argument 2)",
            );
            return;
        };

        let files = match list_source_files(&origin).await {
            Ok(files) => files,
            Err(err) => {
                op.result.fail(format!("Cannot read origin folder: {err}"));
                return;
            }
        };
        if files.is_empty() {
            op.result.succeed(format!("No files to verify in {origin}"));
            return;
        }

        let destination = Destination::classify(&target);
        let inspection = op.inspection.clone();

        for file in &files {
            if ctx.is_cancelled() {
                break;
            }
            let _guard = self.shared.locks.lock(&file.path).await;
            match self.verify_one(&destination, &inspection, file).await {
                Finding::Present(path) => {
                    op.result.push_line(format!("Verified {} at {path}", file.name));
                }
                Finding::Missing(path) => {
                    warn!(step = %op.name, file = %file.name, "File missing at destination");
                    op.result.push_line(format!("Missing {} at {path}", file.name));
                    op.result.failed.push(file.name.clone());
                }
                Finding::SizeMismatch {
                    path,
                    expected,
                    actual,
                } => {
                    warn!(step = %op.name, file = %file.name, expected, actual, "Size mismatch");
                    op.result.push_line(format!(
                        "Size mismatch for {} at {path}: expected {expected} bytes, found {actual}",
                        file.name
                    ));
                    op.result.failed.push(file.name.clone());
                }
                Finding::Error(reason) => {
                    warn!(step = %op.name, file = %file.name, error = %reason, "Verification failed");
                    op.result
                        .push_line(format!("Could not verify {}: {reason}", file.name));
                    op.result.failed.push(file.name.clone());
                }
            }
        }

        if !destination.is_local() {
            self.shared.remote.disconnect().await;
        }

        if ctx.is_cancelled() {
            op.result.fail("Verification cancelled");
        } else if op.result.failed.is_empty() {
            op.result
                .succeed(format!("All {} file(s) present at destination", files.len()));
        } else {
            op.result.fail(format!(
                "{} of {} file(s) failed verification",
                op.result.failed.len(),
                files.len()
            ));
        }
    }
}
