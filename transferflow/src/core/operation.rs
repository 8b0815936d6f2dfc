//! Runtime operations and their results.

use super::OperationKind;
use crate::utils::{clock_prefix, now_utc};
use serde::{Deserialize, Serialize};

/// Maximum number of positional arguments in a step specification.
pub const MAX_ARGS: usize = 5;

/// Content inspection settings carried through one pipeline run.
///
/// Set once when the runner reaches an Inspect step; every later Copy and
/// Verify in the same run sees the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionContext {
    active: bool,
    instruction: String,
}

impl InspectionContext {
    /// Returns a context with inspection disabled.
    #[must_use]
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Returns a context that applies `instruction` to every file.
    #[must_use]
    pub fn active(instruction: impl Into<String>) -> Self {
        Self {
            active: true,
            instruction: instruction.into(),
        }
    }

    /// Returns true if inspection is enabled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the inspection instruction.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}

/// Mutable outcome of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Whether the operation succeeded.
    pub succeeded: bool,
    /// Cumulative, timestamped log of every sub-step.
    pub message: String,
    /// Files handled successfully.
    pub processed: Vec<String>,
    /// Files missing or mismatched at the destination.
    pub failed: Vec<String>,
}

impl OperationResult {
    /// Appends a `[HH:MM:SS] text` line to the message.
    pub fn push_line(&mut self, text: impl AsRef<str>) {
        if !self.message.is_empty() {
            self.message.push('\n');
        }
        self.message.push_str(&clock_prefix(&now_utc()));
        self.message.push(' ');
        self.message.push_str(text.as_ref());
    }

    /// Records a final success line.
    pub fn succeed(&mut self, text: impl AsRef<str>) {
        self.push_line(text);
        self.succeeded = true;
    }

    /// Records a final failure line.
    pub fn fail(&mut self, text: impl AsRef<str>) {
        self.push_line(text);
        self.succeeded = false;
    }

    /// Returns the last line of the message without its timestamp.
    #[must_use]
    pub fn last_line(&self) -> &str {
        let line = self.message.lines().last().unwrap_or_default();
        line.split_once("] ").map_or(line, |(_, text)| text)
    }
}

/// The resolved, executable form of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// The operation kind.
    pub kind: OperationKind,
    /// Display name with its placeholder substituted.
    pub name: String,
    args: [Option<String>; MAX_ARGS],
    /// Outcome, written by the executor.
    pub result: OperationResult,
    /// Inspection settings, assigned by the runner before execution.
    pub inspection: InspectionContext,
}

impl Operation {
    /// Creates an operation. Arguments past the fifth are ignored.
    #[must_use]
    pub fn new(
        kind: OperationKind,
        name: impl Into<String>,
        args: impl IntoIterator<Item = Option<String>>,
    ) -> Self {
        let mut slots: [Option<String>; MAX_ARGS] = Default::default();
        for (slot, arg) in slots.iter_mut().zip(args) {
            *slot = arg;
        }
        Self {
            kind,
            name: name.into(),
            args: slots,
            result: OperationResult::default(),
            inspection: InspectionContext::inactive(),
        }
    }

    /// Returns the 1-indexed argument, or `None` when absent or out of range.
    #[must_use]
    pub fn arg(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|index| self.args.get(index))
            .and_then(Option::as_deref)
    }

    /// Returns the 1-indexed argument if it is present and not blank.
    #[must_use]
    pub fn non_empty_arg(&self, position: usize) -> Option<&str> {
        self.arg(position).filter(|value| !value.trim().is_empty())
    }

    /// Returns all argument slots.
    #[must_use]
    pub fn args(&self) -> &[Option<String>; MAX_ARGS] {
        &self.args
    }

    /// Sets the inspection context.
    #[must_use]
    pub fn with_inspection(mut self, inspection: InspectionContext) -> Self {
        self.inspection = inspection;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_args_are_one_indexed() {
        let op = Operation::new(
            OperationKind::Copy,
            "Copy",
            vec![Some("/in".to_string()), None, Some("x".to_string())],
        );

        assert_eq!(op.arg(0), None);
        assert_eq!(op.arg(1), Some("/in"));
        assert_eq!(op.arg(2), None);
        assert_eq!(op.arg(3), Some("x"));
        assert_eq!(op.arg(6), None);
    }

    #[test]
    fn test_extra_args_ignored() {
        let args = (0..8).map(|i| Some(i.to_string()));
        let op = Operation::new(OperationKind::Copy, "Copy", args);
        assert_eq!(op.arg(5), Some("4"));
        assert_eq!(op.args().len(), MAX_ARGS);
    }

    #[test]
    fn test_non_empty_arg() {
        let op = Operation::new(OperationKind::Delete, "Delete", vec![Some("  ".to_string())]);
        assert_eq!(op.arg(1), Some("  "));
        assert_eq!(op.non_empty_arg(1), None);
    }

    #[test]
    fn test_result_message_is_cumulative() {
        let mut result = OperationResult::default();
        result.push_line("Copying a.txt");
        result.succeed("1 file(s) copied");

        let lines: Vec<&str> = result.message.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Copying a.txt"));
        assert!(result.succeeded);
        assert_eq!(result.last_line(), "1 file(s) copied");
    }

    #[test]
    fn test_result_fail_clears_flag() {
        let mut result = OperationResult::default();
        result.succeed("ok");
        result.fail("later failure");
        assert!(!result.succeeded);
    }

    #[test]
    fn test_inspection_context() {
        assert!(!InspectionContext::inactive().is_active());
        let ctx = InspectionContext::active("00001_0001_0005");
        assert!(ctx.is_active());
        assert_eq!(ctx.instruction(), "00001_0001_0005");
    }
}
