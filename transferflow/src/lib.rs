//! # Transferflow
//!
//! A configuration-driven file-transfer pipeline runner.
//!
//! Each configured folder mapping owns an ordered list of typed steps
//! (inspect, copy, verify, move, delete, notify). Transferflow turns those
//! steps into executable operations and runs them against a local or SFTP
//! destination with:
//!
//! - **Variable substitution**: `@Field` placeholders resolved against the mapping
//! - **Content-driven templating**: per-file values read out of file content
//! - **Per-path locking**: at most one in-flight sequence per source file
//! - **Bounded retries**: exponential backoff for transient transport failures
//! - **Short-circuit execution**: the first failing step routes files to the error folder
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use transferflow::prelude::*;
//!
//! let app_task = load_app_task("apptasks.json")?;
//! let settings = AppSettings::load("settings.json")?;
//!
//! let endpoint = Arc::new(SftpEndpoint::new(settings.remote.clone()));
//! let worker = Worker::new(app_task, settings, endpoint, Arc::new(LoggingNotifier));
//! worker.run(&CancellationToken::new()).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod core;
pub mod errors;
pub mod executors;
pub mod guard;
pub mod notify;
pub mod observability;
pub mod pipeline;
pub mod resolve;
pub mod testing;
pub mod transport;
pub mod utils;
pub mod worker;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{
        load_app_task, AppSettings, AppTask, FolderMapping, StepSpec, TransferCredentials,
    };
    pub use crate::core::{
        ExecutionReport, InspectionContext, Operation, OperationKind, OperationResult,
        StepOutcome,
    };
    pub use crate::errors::{
        BuildError, ConfigError, InspectError, TransferError, TransferflowError,
    };
    pub use crate::executors::{Destination, ExecutorSet, FileOperation, RunContext};
    pub use crate::guard::PathLocks;
    pub use crate::notify::{render_html, LoggingNotifier, Notifier};
    pub use crate::pipeline::{
        with_retry, PipelineBuilder, PipelineRunner, RetryConfig, RunState, RunSummary,
    };
    pub use crate::transport::{RemoteEndpoint, SftpEndpoint};
    pub use crate::worker::Worker;
}
