//! Core domain model types for transferflow.
//!
//! This module contains the runtime types shared by the builder, the
//! executors, and the runner:
//! - The closed set of operation kinds
//! - Operations with their resolved arguments and mutable result
//! - The per-run inspection context
//! - The execution report handed to notifiers

mod kind;
mod operation;
mod report;

pub use kind::OperationKind;
pub use operation::{InspectionContext, Operation, OperationResult, MAX_ARGS};
pub use report::{ExecutionReport, StepOutcome};
