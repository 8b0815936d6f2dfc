//! File operation executors.
//!
//! Each executor implements one file-touching [`OperationKind`]. Executors
//! never return errors: per-file failures are appended to the operation's
//! result message and the executor moves on to the next file. The step as a
//! whole succeeds or fails according to its own rule.
//!
//! Every per-file sequence runs while holding that file's [`PathLocks`]
//! entry, and cancellation is checked between files.

mod copy;
mod delete;
mod destination;
mod files;
mod move_error;
mod move_files;
mod verify;

pub use copy::CopyExecutor;
pub use delete::DeleteExecutor;
pub use destination::{is_local_path, Destination};
pub use files::{list_source_files, SourceFile};
pub use move_error::MoveToErrorExecutor;
pub use move_files::MoveExecutor;
pub use verify::VerifyExecutor;

use crate::cancellation::CancellationToken;
use crate::config::FolderMapping;
use crate::core::{InspectionContext, Operation, OperationKind};
use crate::errors::InspectError;
use crate::guard::PathLocks;
use crate::pipeline::RetryConfig;
use crate::resolve::{clean_inspected, inspect_file};
use crate::transport::RemoteEndpoint;
use async_trait::async_trait;
use std::sync::Arc;

/// Per-run context handed to every executor.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    /// The folder mapping being run.
    pub mapping: &'a FolderMapping,
    /// Cancellation for the whole run.
    pub token: &'a CancellationToken,
}

impl<'a> RunContext<'a> {
    /// Creates a new run context.
    #[must_use]
    pub fn new(mapping: &'a FolderMapping, token: &'a CancellationToken) -> Self {
        Self { mapping, token }
    }

    /// Returns true if the run was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// An executor for one kind of file operation.
#[async_trait]
pub trait FileOperation: Send + Sync {
    /// Returns the label used for this executor's step outcome.
    fn label(&self) -> &'static str;

    /// Executes `op`, writing its outcome into `op.result`.
    async fn execute(&self, op: &mut Operation, ctx: &RunContext<'_>);
}

/// Collaborators shared by every executor.
#[derive(Clone)]
pub(crate) struct Shared {
    pub(crate) remote: Arc<dyn RemoteEndpoint>,
    pub(crate) locks: Arc<PathLocks>,
    pub(crate) retry: RetryConfig,
}

/// The full set of executors used by the pipeline runner.
pub struct ExecutorSet {
    copy: CopyExecutor,
    verify: VerifyExecutor,
    move_success: MoveExecutor,
    move_error: MoveToErrorExecutor,
    delete: DeleteExecutor,
    locks: Arc<PathLocks>,
}

impl ExecutorSet {
    /// Creates executors sharing one endpoint, lock registry, and retry policy.
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteEndpoint>, locks: Arc<PathLocks>, retry: RetryConfig) -> Self {
        let shared = Shared {
            remote,
            locks: Arc::clone(&locks),
            retry,
        };
        Self {
            copy: CopyExecutor::new(shared.clone()),
            verify: VerifyExecutor::new(shared.clone()),
            move_success: MoveExecutor::new(shared.clone()),
            move_error: MoveToErrorExecutor::new(shared.clone()),
            delete: DeleteExecutor::new(shared),
            locks,
        }
    }

    /// Returns the executor for `kind`, or `None` for kinds the runner
    /// handles itself.
    #[must_use]
    pub fn for_kind(&self, kind: OperationKind) -> Option<&dyn FileOperation> {
        match kind {
            OperationKind::Copy => Some(&self.copy),
            OperationKind::Verify => Some(&self.verify),
            OperationKind::Move => Some(&self.move_success),
            OperationKind::Delete => Some(&self.delete),
            OperationKind::Inspect | OperationKind::Notify => None,
        }
    }

    /// Returns the executor that routes files to the error folder.
    #[must_use]
    pub fn move_to_error(&self) -> &dyn FileOperation {
        &self.move_error
    }

    /// Returns the shared lock registry.
    #[must_use]
    pub fn locks(&self) -> &Arc<PathLocks> {
        &self.locks
    }
}

/// Resolves the destination directory for one file.
///
/// With inspection active, the file is read and the cleaned value replaces
/// `@Inspect_VAR` in a fresh copy of the template.
pub(crate) async fn directory_for_file(
    destination: &Destination,
    inspection: &InspectionContext,
    file: &SourceFile,
) -> Result<String, InspectError> {
    if !inspection.is_active() {
        return Ok(destination.directory_for(None));
    }
    let raw = inspect_file(&file.path, inspection.instruction()).await?;
    let value = clean_inspected(&raw);
    tracing::debug!(file = %file.name, value = %value, "Inspected file content");
    Ok(destination.directory_for(Some(&value)))
}
