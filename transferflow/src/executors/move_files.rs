//! Move files to the success folder.

use super::files::{ensure_local_dir, list_source_files, local_size, move_file, SourceFile};
use super::{FileOperation, RunContext, Shared};
use crate::core::{Operation, OperationKind};
use crate::utils::{backup_file_name, now_utc};
use async_trait::async_trait;
use std::path::Path;
use tracing::{info, warn};

enum Moved {
    Fresh,
    AlreadyPresent,
    ReplacedWithBackup(String),
}

/// Moves every file of argument 1 into the folder named by argument 2.
///
/// A same-named file of equal size is taken as already moved and the source
/// is deleted. A different size backs the existing file up under a
/// timestamped name first.
pub struct MoveExecutor {
    shared: Shared,
}

impl MoveExecutor {
    pub(crate) fn new(shared: Shared) -> Self {
        Self { shared }
    }
}

async fn move_one(file: &SourceFile, target_dir: &Path) -> std::io::Result<Moved> {
    let target = target_dir.join(&file.name);
    match local_size(&target).await? {
        None => {
            move_file(&file.path, &target).await?;
            Ok(Moved::Fresh)
        }
        Some(size) if size == file.size => {
            tokio::fs::remove_file(&file.path).await?;
            Ok(Moved::AlreadyPresent)
        }
        Some(_) => {
            let backup = backup_file_name(&file.name, &now_utc());
            tokio::fs::rename(&target, target_dir.join(&backup)).await?;
            move_file(&file.path, &target).await?;
            Ok(Moved::ReplacedWithBackup(backup))
        }
    }
}

#[async_trait]
impl FileOperation for MoveExecutor {
    fn label(&self) -> &'static str {
        OperationKind::Move.report_label()
    }

    async fn execute(&self, op: &mut Operation, ctx: &RunContext<'_>) {
        let (Some(origin), Some(target)) = (
            op.non_empty_arg(1).map(str::to_string),
            op.non_empty_arg(2).map(str::to_string),
        ) else {
            op.result
                .fail("Move requires an origin folder (argument 1) and a success folder (argument 2)");
            return;
        };

        let target_dir = Path::new(&target);
        match ensure_local_dir(target_dir).await {
            Ok(true) => op.result.push_line(format!("Created folder {target}")),
            Ok(false) => {}
            Err(err) => {
                op.result
                    .fail(format!("Cannot create success folder {target}: {err}"));
                return;
            }
        }

        let files = match list_source_files(&origin).await {
            Ok(files) => files,
            Err(err) => {
                op.result.fail(format!("Cannot read origin folder: {err}"));
                return;
            }
        };
        if files.is_empty() {
            op.result.succeed(format!("No files to move in {origin}"));
            return;
        }

        let mut moved = 0usize;
        for file in &files {
            if ctx.is_cancelled() {
                break;
            }
            let _guard = self.shared.locks.lock(&file.path).await;
            match move_one(file, target_dir).await {
                Ok(Moved::Fresh) => {
                    op.result.push_line(format!("Moved {} to {target}", file.name));
                    moved += 1;
                }
                Ok(Moved::AlreadyPresent) => {
                    op.result.push_line(format!(
                        "{} already present in {target} with the same size, origin removed",
                        file.name
                    ));
                    moved += 1;
                }
                Ok(Moved::ReplacedWithBackup(backup)) => {
                    info!(file = %file.name, backup = %backup, "Backed up existing file");
                    op.result.push_line(format!(
                        "Moved {} to {target}, previous version kept as {backup}",
                        file.name
                    ));
                    moved += 1;
                }
                Err(err) => {
                    warn!(step = %op.name, file = %file.name, error = %err, "Move failed");
                    op.result
                        .push_line(format!("Failed to move {}: {err}", file.name));
                }
            }
        }

        if ctx.is_cancelled() {
            op.result
                .fail(format!("Cancelled after moving {moved} of {} file(s)", files.len()));
        } else if moved > 0 {
            op.result
                .succeed(format!("{moved} of {} file(s) moved to {target}", files.len()));
        } else {
            op.result.fail("No file was moved");
        }
    }
}
