//! Pipeline runner: executes one folder mapping's operations in order.
//!
//! The run is a small state machine. Each operation moves it to the state of
//! its kind; the first failed operation moves it to [`RunState::Failed`],
//! routes the origin files to the error folder, and ends the run. An Inspect
//! step switches content inspection on for every later Copy and Verify.

use super::PipelineBuilder;
use crate::cancellation::CancellationToken;
use crate::config::FolderMapping;
use crate::core::{ExecutionReport, InspectionContext, Operation, OperationKind, StepOutcome};
use crate::executors::{ExecutorSet, RunContext};
use crate::notify::Notifier;
use crate::observability::SpanTimer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

/// States of one folder-mapping run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing executed yet.
    Ready,
    /// Content inspection was enabled.
    Inspecting,
    /// Copying files.
    Copying,
    /// Verifying copies.
    Verifying,
    /// Moving files to the success folder.
    Moving,
    /// Deleting origin files.
    Deleting,
    /// Notifying.
    Notifying,
    /// Every operation succeeded.
    Done,
    /// An operation failed and files were routed to the error folder.
    Failed,
    /// The run was cancelled.
    Cancelled,
}

impl RunState {
    /// Returns the state entered when executing `kind`.
    #[must_use]
    pub fn for_kind(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Inspect => Self::Inspecting,
            OperationKind::Copy => Self::Copying,
            OperationKind::Verify => Self::Verifying,
            OperationKind::Move => Self::Moving,
            OperationKind::Delete => Self::Deleting,
            OperationKind::Notify => Self::Notifying,
        }
    }

    /// Returns true for `Done`, `Failed`, and `Cancelled`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }
}

/// The outcome of one folder-mapping run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Final state.
    pub state: RunState,
    /// Accumulated report.
    pub report: ExecutionReport,
    /// Operations that were executed, in order.
    pub operations: Vec<Operation>,
    /// The error-routing operation, if the run failed.
    pub error_routing: Option<Operation>,
}

impl RunSummary {
    /// Returns true if the run reached `Done`.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == RunState::Done
    }

    /// Returns the kinds of the executed operations.
    #[must_use]
    pub fn executed_kinds(&self) -> Vec<OperationKind> {
        self.operations.iter().map(|op| op.kind).collect()
    }
}

/// Runs folder mappings against a shared executor set and notifier.
pub struct PipelineRunner {
    executors: Arc<ExecutorSet>,
    notifier: Arc<dyn Notifier>,
}

impl PipelineRunner {
    /// Creates a new runner.
    #[must_use]
    pub fn new(executors: Arc<ExecutorSet>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            executors,
            notifier,
        }
    }

    /// Returns the executor set.
    #[must_use]
    pub fn executors(&self) -> &Arc<ExecutorSet> {
        &self.executors
    }

    /// Runs every step of `mapping` to a terminal state.
    pub async fn run(&self, mapping: &FolderMapping, token: &CancellationToken) -> RunSummary {
        let report = ExecutionReport::new(mapping.display_name());
        let span = info_span!(
            "folder_run",
            folder = %mapping.display_name(),
            run_id = %report.run_id
        );
        self.run_steps(mapping, token, report).instrument(span).await
    }

    async fn run_steps(
        &self,
        mapping: &FolderMapping,
        token: &CancellationToken,
        mut report: ExecutionReport,
    ) -> RunSummary {
        let ctx = RunContext::new(mapping, token);
        let mut inspection = InspectionContext::inactive();
        let mut state = RunState::Ready;
        let mut executed: Vec<Operation> = Vec::new();
        let mut error_routing = None;

        info!("Starting run");
        for mut op in PipelineBuilder::new(mapping).build() {
            if token.is_cancelled() {
                state = RunState::Cancelled;
                break;
            }
            state = RunState::for_kind(op.kind);
            let timer = SpanTimer::start(op.name.clone());

            let label = match op.kind {
                OperationKind::Inspect => {
                    inspection = InspectionContext::active(op.arg(1).unwrap_or_default());
                    op.inspection = inspection.clone();
                    op.result.succeed(format!(
                        "Content inspection enabled with instruction '{}'",
                        inspection.instruction()
                    ));
                    op.kind.report_label()
                }
                OperationKind::Notify => {
                    self.notify(mapping, &report, &mut op).await;
                    op.kind.report_label()
                }
                kind => {
                    op.inspection = inspection.clone();
                    match self.executors.for_kind(kind) {
                        Some(executor) => {
                            executor.execute(&mut op, &ctx).await;
                            executor.label()
                        }
                        None => {
                            op.result.fail(format!("No executor for {kind}"));
                            kind.report_label()
                        }
                    }
                }
            };

            match op.kind {
                OperationKind::Copy => report
                    .processed_files
                    .extend(op.result.processed.iter().cloned()),
                OperationKind::Verify => report
                    .failed_files
                    .extend(op.result.failed.iter().cloned()),
                _ => {}
            }
            let duration_ms = timer.finish();
            report.record(
                StepOutcome::new(label, op.result.message.clone(), op.result.succeeded)
                    .with_duration_ms(duration_ms),
            );
            info!(
                step = %op.name,
                kind = %op.kind,
                success = op.result.succeeded,
                duration_ms,
                "Step finished"
            );

            let failed = !op.result.succeeded;
            executed.push(op);

            if token.is_cancelled() {
                state = RunState::Cancelled;
                break;
            }
            if failed {
                if let Some(failed_op) = executed.last() {
                    error_routing = Some(self.route_to_error(failed_op, &ctx, &mut report).await);
                }
                state = RunState::Failed;
                break;
            }
        }

        if !state.is_terminal() {
            state = RunState::Done;
        }
        match state {
            RunState::Done => info!(steps = executed.len(), "Run completed"),
            RunState::Cancelled => warn!(
                reason = %token.reason().unwrap_or_default(),
                "Run cancelled"
            ),
            _ => error!(steps = executed.len(), "Run failed"),
        }

        RunSummary {
            state,
            report,
            operations: executed,
            error_routing,
        }
    }

    async fn notify(&self, mapping: &FolderMapping, report: &ExecutionReport, op: &mut Operation) {
        if !report.has_processed_files() {
            op.result.succeed("No processed files, notification skipped");
            return;
        }
        match self.notifier.notify(mapping, report).await {
            Ok(()) => op.result.succeed(format!(
                "Report for {} file(s) sent to '{}'",
                report.processed_files.len(),
                mapping.notify_target
            )),
            Err(err) => {
                warn!(error = %err, "Notification failed");
                op.result
                    .succeed(format!("Notification could not be delivered: {err}"));
            }
        }
    }

    async fn route_to_error(
        &self,
        failed: &Operation,
        ctx: &RunContext<'_>,
        report: &mut ExecutionReport,
    ) -> Operation {
        let executor = self.executors.move_to_error();
        warn!(
            step = %failed.name,
            error_path = %ctx.mapping.error_path,
            "Step failed, routing files to the error folder"
        );

        let timer = SpanTimer::start(executor.label());
        let mut routing = Operation::new(
            OperationKind::Move,
            executor.label(),
            vec![failed.non_empty_arg(1).map(str::to_string)],
        );
        executor.execute(&mut routing, ctx).await;

        report.record(
            StepOutcome::new(
                executor.label(),
                routing.result.message.clone(),
                routing.result.succeeded,
            )
            .with_duration_ms(timer.finish()),
        );
        if !routing.result.succeeded {
            error!(detail = %routing.result.last_line(), "Error routing failed");
        }
        routing
    }
}
