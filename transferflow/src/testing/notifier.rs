//! Recording notifier.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::FolderMapping;
use crate::core::ExecutionReport;
use crate::errors::NotifyError;
use crate::notify::Notifier;

/// A notifier that keeps every report it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    reports: Mutex<Vec<ExecutionReport>>,
    fail_with: Option<String>,
}

impl RecordingNotifier {
    /// Creates a new recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier that records and then fails with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
            fail_with: Some(reason.into()),
        }
    }

    /// Returns the recorded reports.
    #[must_use]
    pub fn reports(&self) -> Vec<ExecutionReport> {
        self.reports.lock().clone()
    }

    /// Returns the number of notifications received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.reports.lock().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        mapping: &FolderMapping,
        report: &ExecutionReport,
    ) -> Result<(), NotifyError> {
        self.reports.lock().push(report.clone());
        match &self.fail_with {
            Some(reason) => Err(NotifyError::new(mapping.notify_target.clone(), reason.clone())),
            None => Ok(()),
        }
    }
}
