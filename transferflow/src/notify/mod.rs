//! Run notifications.
//!
//! The runner hands the accumulated [`ExecutionReport`] to a [`Notifier`]
//! when a Notify step is reached with at least one processed file. Delivery
//! is the notifier's business; [`render_html`] produces the report body.

mod html;

pub use html::{escape_html, render_html};

use crate::config::FolderMapping;
use crate::core::ExecutionReport;
use crate::errors::NotifyError;
use async_trait::async_trait;

/// Receives the report of a successful run.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers the report for `mapping`.
    async fn notify(
        &self,
        mapping: &FolderMapping,
        report: &ExecutionReport,
    ) -> Result<(), NotifyError>;
}

/// A notifier that writes a report summary to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(
        &self,
        mapping: &FolderMapping,
        report: &ExecutionReport,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            folder = %report.folder_name,
            run_id = %report.run_id,
            target = %mapping.notify_target,
            processed = report.processed_files.len(),
            failed = report.failed_files.len(),
            steps = report.steps.len(),
            "Run report ready"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_notifier_never_fails() {
        let mapping = FolderMapping::new("Orders", "/in", "/out");
        let mut report = ExecutionReport::new("Orders");
        report.processed_files.push("a.txt".into());

        assert!(LoggingNotifier.notify(&mapping, &report).await.is_ok());
    }
}
