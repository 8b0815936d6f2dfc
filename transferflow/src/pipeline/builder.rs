//! Pipeline builder: step specifications to operations.

use crate::config::{FolderMapping, StepSpec};
use crate::core::{Operation, OperationKind, MAX_ARGS};
use crate::errors::BuildError;
use crate::resolve::{display_name, resolve_token};

/// Separator between the tokens of a step specification.
pub const STEP_SEPARATOR: char = ':';

/// Builds one operation from `step`, resolving its arguments against
/// `mapping`.
///
/// The first token names the operation kind. Each of the next five tokens
/// has its `@name` placeholder resolved; a token that does not resolve
/// becomes an absent argument. Further tokens are ignored.
pub fn build_operation(step: &StepSpec, mapping: &FolderMapping) -> Result<Operation, BuildError> {
    let mut tokens = step.task.split(STEP_SEPARATOR);
    let kind: OperationKind = tokens.next().unwrap_or_default().parse()?;
    let args = tokens
        .take(MAX_ARGS)
        .map(|token| resolve_token(token, mapping));

    Ok(Operation::new(kind, display_name(&step.name, mapping), args))
}

/// Builder for the ordered operations of one folder mapping.
#[derive(Debug, Clone, Copy)]
pub struct PipelineBuilder<'a> {
    mapping: &'a FolderMapping,
}

impl<'a> PipelineBuilder<'a> {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(mapping: &'a FolderMapping) -> Self {
        Self { mapping }
    }

    /// Returns the mapping's steps sorted by order. Equal orders keep their
    /// declaration order.
    #[must_use]
    pub fn sorted_steps(&self) -> Vec<&'a StepSpec> {
        let mut steps: Vec<&StepSpec> = self.mapping.steps.iter().collect();
        steps.sort_by_key(|step| step.order);
        steps
    }

    /// Builds every valid step, in execution order.
    ///
    /// Rejected steps are logged and dropped; they never yield a partial
    /// operation.
    #[must_use]
    pub fn build(&self) -> Vec<Operation> {
        self.sorted_steps()
            .into_iter()
            .filter_map(|step| match build_operation(step, self.mapping) {
                Ok(op) => Some(op),
                Err(err) => {
                    tracing::warn!(
                        folder = %self.mapping.display_name(),
                        step = %step.name,
                        task = %step.task,
                        error = %err,
                        "Skipping invalid step"
                    );
                    None
                }
            })
            .collect()
    }
}
