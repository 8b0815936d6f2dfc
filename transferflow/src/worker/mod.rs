//! The polling worker.
//!
//! One tick runs every folder mapping in declaration order, then sweeps idle
//! path locks. A run that panics is logged and counted as failed; the tick
//! moves on to the next mapping. Ticks are separated by the configured poll interval; the wait
//! ends early when the token is cancelled.

use crate::cancellation::CancellationToken;
use crate::config::{AppSettings, AppTask, FolderMapping};
use crate::core::ExecutionReport;
use crate::executors::ExecutorSet;
use crate::guard::PathLocks;
use crate::notify::Notifier;
use crate::pipeline::{PipelineRunner, RunState, RunSummary};
use crate::transport::RemoteEndpoint;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Runs the configured folder mappings on a fixed interval.
pub struct Worker {
    app_task: AppTask,
    settings: AppSettings,
    runner: PipelineRunner,
    locks: Arc<PathLocks>,
}

impl Worker {
    /// Creates a worker over `app_task`, sharing one endpoint and one lock
    /// registry across every run.
    #[must_use]
    pub fn new(
        app_task: AppTask,
        settings: AppSettings,
        endpoint: Arc<dyn RemoteEndpoint>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let locks = Arc::new(PathLocks::from_settings(&settings.guard));
        let executors = ExecutorSet::new(endpoint, Arc::clone(&locks), settings.retry.clone());
        Self {
            app_task,
            settings,
            runner: PipelineRunner::new(Arc::new(executors), notifier),
            locks,
        }
    }

    /// Returns the application task.
    #[must_use]
    pub fn app_task(&self) -> &AppTask {
        &self.app_task
    }

    /// Returns the lock registry.
    #[must_use]
    pub fn locks(&self) -> &Arc<PathLocks> {
        &self.locks
    }

    /// Runs one tick: every folder mapping, then a lock sweep.
    ///
    /// A failed or panicking mapping does not stop the tick. Cancellation is
    /// checked between mappings.
    pub async fn run_once(&self, token: &CancellationToken) -> Vec<RunSummary> {
        let mut summaries = Vec::with_capacity(self.app_task.folder_maps.len());
        for mapping in &self.app_task.folder_maps {
            if token.is_cancelled() {
                break;
            }
            let summary = AssertUnwindSafe(self.runner.run(mapping, token))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| abandoned_run(mapping, payload.as_ref()));
            if !summary.succeeded() {
                warn!(
                    folder = %mapping.display_name(),
                    state = ?summary.state,
                    "Folder run did not complete"
                );
            }
            summaries.push(summary);
        }

        let swept = self.locks.sweep();
        if swept > 0 {
            debug!(swept, remaining = self.locks.len(), "Swept idle path locks");
        }
        summaries
    }

    /// Runs ticks until `token` is cancelled.
    pub async fn run(&self, token: &CancellationToken) {
        info!(
            app = %self.app_task.name,
            version = %self.app_task.version,
            mappings = self.app_task.folder_maps.len(),
            poll_interval_ms = self.settings.poll_interval_ms,
            "Worker started"
        );

        while !token.is_cancelled() {
            self.run_once(token).await;
            tokio::select! {
                () = token.cancelled() => break,
                () = tokio::time::sleep(self.settings.poll_interval()) => {}
            }
        }

        info!(reason = %token.reason().unwrap_or_default(), "Worker stopped");
    }
}

fn abandoned_run(mapping: &FolderMapping, payload: &(dyn Any + Send)) -> RunSummary {
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(folder = %mapping.display_name(), %reason, "Folder run panicked, abandoning it");
    RunSummary {
        state: RunState::Failed,
        report: ExecutionReport::new(mapping.display_name()),
        operations: Vec::new(),
        error_routing: None,
    }
}
