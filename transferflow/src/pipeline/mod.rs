//! Pipeline building and execution.
//!
//! This module provides:
//! - The pipeline builder (step specifications to operations)
//! - The pipeline runner state machine
//! - Retry with exponential backoff for remote transfers

mod builder;
mod retry;
mod runner;

#[cfg(test)]
mod integration_tests;

pub use builder::{build_operation, PipelineBuilder, STEP_SEPARATOR};
pub use retry::{
    should_retry, with_retry, BackoffStrategy, JitterStrategy, RetryConfig, RetryDecision,
    RetryError, RetryState, Retryable,
};
pub use runner::{PipelineRunner, RunState, RunSummary};
