//! Route files to the mapping's error folder after a failed step.

use super::files::{ensure_local_dir, list_source_files, local_size, move_file, SourceFile};
use super::{FileOperation, RunContext, Shared};
use crate::core::Operation;
use crate::utils::{file_suffix, now_utc, suffixed_file_name};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Moves every file of the failed step's origin into the error folder.
///
/// The origin is argument 1, falling back to the mapping's origin. The
/// destination is always the mapping's error path. An existing file of the
/// same name is never overwritten: the incoming file gets a timestamp suffix.
pub struct MoveToErrorExecutor {
    shared: Shared,
}

impl MoveToErrorExecutor {
    pub(crate) fn new(shared: Shared) -> Self {
        Self { shared }
    }
}

async fn route_one(file: &SourceFile, error_dir: &Path) -> std::io::Result<PathBuf> {
    let mut target = error_dir.join(&file.name);
    if local_size(&target).await?.is_some() {
        let renamed = suffixed_file_name(&file.name, &file_suffix(&now_utc()));
        target = error_dir.join(renamed);
    }
    move_file(&file.path, &target).await?;
    Ok(target)
}

#[async_trait]
impl FileOperation for MoveToErrorExecutor {
    fn label(&self) -> &'static str {
        "Move to error folder"
    }

    async fn execute(&self, op: &mut Operation, ctx: &RunContext<'_>) {
        let error_path = ctx.mapping.error_path.trim();
        if error_path.is_empty() {
            op.result
                .fail("No error folder is configured for this mapping");
            return;
        }
        let origin = op
            .non_empty_arg(1)
            .map_or_else(|| ctx.mapping.origin.clone(), str::to_string);
        if origin.trim().is_empty() {
            op.result.fail("No origin folder to route to the error folder");
            return;
        }

        let error_dir = Path::new(error_path);
        if let Err(err) = ensure_local_dir(error_dir).await {
            op.result
                .fail(format!("Cannot create error folder {error_path}: {err}"));
            return;
        }

        let files = match list_source_files(&origin).await {
            Ok(files) => files,
            Err(err) => {
                op.result.fail(format!("Cannot read origin folder: {err}"));
                return;
            }
        };
        if files.is_empty() {
            op.result
                .succeed(format!("No files to move to the error folder from {origin}"));
            return;
        }

        let mut moved = 0usize;
        for file in &files {
            let _guard = self.shared.locks.lock(&file.path).await;
            match route_one(file, error_dir).await {
                Ok(target) => {
                    op.result
                        .push_line(format!("Moved {} to {}", file.name, target.display()));
                    moved += 1;
                }
                Err(err) => {
                    warn!(file = %file.name, error = %err, "Could not move file to error folder");
                    op.result
                        .push_line(format!("Failed to move {} to the error folder: {err}", file.name));
                }
            }
        }

        if moved > 0 {
            op.result.succeed(format!(
                "{moved} of {} file(s) moved to the error folder",
                files.len()
            ));
        } else {
            op.result.fail("No file was moved to the error folder");
        }
    }
}
