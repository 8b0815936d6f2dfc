//! Copy files to a local directory or the remote endpoint.

use super::files::{ensure_local_dir, list_source_files, SourceFile};
use super::{directory_for_file, Destination, FileOperation, RunContext, Shared};
use crate::core::{InspectionContext, Operation, OperationKind, OperationResult};
use crate::errors::TransferflowError;
use crate::pipeline::with_retry;
use crate::transport::{create_dir_all, join_remote};
use async_trait::async_trait;
use std::path::Path;
use tracing::{info, warn};

/// Copies every file of argument 1 into argument 2.
///
/// Local copies overwrite. Remote uploads are retried on transient failures
/// and the session is released once the step ends. The step succeeds if at
/// least one file was copied, or if there was nothing to copy.
pub struct CopyExecutor {
    shared: Shared,
}

impl CopyExecutor {
    pub(crate) fn new(shared: Shared) -> Self {
        Self { shared }
    }

    async fn copy_one(
        &self,
        destination: &Destination,
        inspection: &InspectionContext,
        file: &SourceFile,
        result: &mut OperationResult,
    ) -> Result<String, TransferflowError> {
        let dir = directory_for_file(destination, inspection, file).await?;

        if destination.is_local() {
            let dir = Path::new(&dir);
            if let Err(err) = ensure_local_dir(dir).await {
                warn!(dir = %dir.display(), error = %err, "Could not create destination folder");
                result.push_line(format!("Warning: could not create {}: {err}", dir.display()));
            }
            let target = dir.join(&file.name);
            tokio::fs::copy(&file.path, &target).await?;
            return Ok(target.display().to_string());
        }

        let remote = self.shared.remote.as_ref();
        if let Err(err) = create_dir_all(remote, &dir).await {
            warn!(dir = %dir, error = %err, "Could not create remote folder");
            result.push_line(format!("Warning: could not create remote folder {dir}: {err}"));
        }
        let target = join_remote(&dir, &file.name);
        let remote_path = target.as_str();
        let bytes = with_retry(&self.shared.retry, &file.name, move || {
            remote.upload(&file.path, remote_path)
        })
        .await?;
        info!(file = %file.name, remote = %target, bytes, "Uploaded file");
        Ok(target)
    }
}

#[async_trait]
impl FileOperation for CopyExecutor {
    fn label(&self) -> &'static str {
        OperationKind::Copy.report_label()
    }

    async fn execute(&self, op: &mut Operation, ctx: &RunContext<'_>) {
        let (Some(origin), Some(target)) = (
            op.non_empty_arg(1).map(str::to_string),
            op.non_empty_arg(2).map(str::to_string),
        ) else {
            op.result
                .fail("Copy requires an origin folder (argument 1) and a destination (argument 2)");
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
            op.result.succeed(format!("No files to copy in {origin}"));
            return;
        }

        let destination = Destination::classify(&target);
        let inspection = op.inspection.clone();
        op.result.push_line(format!(
            "Copying {} file(s) to {} {}",
            files.len(),
            destination.kind_label(),
            destination.template()
        ));

        let mut copied = 0usize;
        for file in &files {
            if ctx.is_cancelled() {
                break;
            }
            let _guard = self.shared.locks.lock(&file.path).await;
            match self.copy_one(&destination, &inspection, file, &mut op.result).await {
                Ok(location) => {
                    op.result.push_line(format!("Copied {} to {location}", file.name));
                    op.result.processed.push(file.name.clone());
                    copied += 1;
                }
                Err(err) => {
                    warn!(step = %op.name, file = %file.name, error = %err, "Copy failed");
                    op.result.push_line(format!("Failed to copy {}: {err}", file.name));
                }
            }
        }

        if !destination.is_local() {
            self.shared.remote.disconnect().await;
        }

        if ctx.is_cancelled() {
            op.result
                .fail(format!("Cancelled after copying {copied} of {} file(s)", files.len()));
        } else if copied > 0 {
            op.result
                .succeed(format!("{copied} of {} file(s) copied", files.len()));
        } else {
            op.result.fail("No file was copied");
        }
    }
}
