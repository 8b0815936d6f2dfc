//! Execution report for one folder-mapping run.

use crate::utils::{now_utc, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Step label.
    pub label: String,
    /// The step's cumulative message.
    pub message: String,
    /// Whether the step succeeded.
    pub success: bool,
    /// When the step finished.
    pub timestamp: Timestamp,
    /// Wall-clock duration.
    pub duration_ms: f64,
}

impl StepOutcome {
    /// Creates a new outcome stamped with the current time.
    #[must_use]
    pub fn new(label: impl Into<String>, message: impl Into<String>, success: bool) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
            success,
            timestamp: now_utc(),
            duration_ms: 0.0,
        }
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Accumulated record of one folder-mapping run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Folder mapping name.
    pub folder_name: String,
    /// When the run started.
    pub timestamp: Timestamp,
    /// Files processed by Copy steps.
    pub processed_files: Vec<String>,
    /// Files that failed verification.
    pub failed_files: Vec<String>,
    /// Step outcomes in execution order.
    pub steps: Vec<StepOutcome>,
}

impl ExecutionReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(folder_name: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            folder_name: folder_name.into(),
            timestamp: now_utc(),
            processed_files: Vec::new(),
            failed_files: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Returns true if at least one file was processed.
    #[must_use]
    pub fn has_processed_files(&self) -> bool {
        !self.processed_files.is_empty()
    }

    /// Returns true if every recorded step succeeded.
    #[must_use]
    pub fn all_steps_succeeded(&self) -> bool {
        self.steps.iter().all(|step| step.success)
    }

    /// Appends a step outcome.
    pub fn record(&mut self, outcome: StepOutcome) {
        self.steps.push(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_is_empty() {
        let report = ExecutionReport::new("Orders");
        assert_eq!(report.folder_name, "Orders");
        assert!(!report.has_processed_files());
        assert!(report.all_steps_succeeded());
        assert_eq!(report.run_id.get_version_num(), 4);
    }

    #[test]
    fn test_record_keeps_order() {
        let mut report = ExecutionReport::new("Orders");
        report.record(StepOutcome::new("Copy to destination", "ok", true));
        report.record(StepOutcome::new("Destination verification", "missing", false).with_duration_ms(3.5));

        assert_eq!(report.steps[0].label, "Copy to destination");
        assert_eq!(report.steps[1].duration_ms, 3.5);
        assert!(!report.all_steps_succeeded());
    }

    #[test]
    fn test_report_serializes() {
        let mut report = ExecutionReport::new("Orders");
        report.processed_files.push("a.txt".into());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["folder_name"], "Orders");
        assert_eq!(json["processed_files"][0], "a.txt");
    }
}
