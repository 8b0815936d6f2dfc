//! Error types for transferflow.
//!
//! The taxonomy separates configuration problems (never retried), transport
//! failures (classified as transient or fatal), and inspection failures that
//! abort processing of a single file.

use thiserror::Error;

/// The main error type for transferflow operations.
#[derive(Debug, Error)]
pub enum TransferflowError {
    /// Configuration could not be loaded or validated.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A step specification could not be turned into an operation.
    #[error("{0}")]
    Build(#[from] BuildError),

    /// A remote transfer failed.
    #[error("{0}")]
    Transfer(#[from] TransferError),

    /// A retried remote transfer gave up.
    #[error("{0}")]
    Retry(#[from] crate::pipeline::RetryError<TransferError>),

    /// Content inspection failed for a file.
    #[error("{0}")]
    Inspect(#[from] InspectError),

    /// The source folder of an operation could not be enumerated.
    #[error("{0}")]
    Source(#[from] SourceError),

    /// The run was cancelled.
    #[error("Run cancelled: {0}")]
    Cancelled(String),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading `settings.json` or `apptasks.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        /// Path of the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for the expected model.
    #[error("Failed to parse configuration file '{path}': {source}")]
    Parse {
        /// Path of the file.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The configuration parsed but failed validation.
    #[error("Invalid configuration: {}", issues.join(", "))]
    Invalid {
        /// Every issue found, in declaration order.
        issues: Vec<String>,
    },
}

impl ConfigError {
    /// Creates a validation error from a list of issues.
    #[must_use]
    pub fn invalid(issues: Vec<String>) -> Self {
        Self::Invalid { issues }
    }
}

/// Rejections produced by the pipeline builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The step specification string was empty.
    #[error("Step specification is empty")]
    EmptySpec,

    /// The first token is not one of the known operation kinds.
    #[error("Unknown operation kind '{0}'")]
    UnknownKind(String),
}

/// Errors raised while enumerating the files of a source folder.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No path was provided.
    #[error("Source path cannot be empty")]
    Empty,

    /// The path is not absolute.
    #[error("Source path must be absolute: {0}")]
    NotAbsolute(String),

    /// The directory does not exist.
    #[error("Directory not found: {0}")]
    NotFound(String),

    /// Reading the directory failed.
    #[error("Failed to read directory '{path}': {source}")]
    Io {
        /// Directory being read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Fatal content inspection errors for a single file.
///
/// Malformed instructions and empty files are not errors; they produce an
/// empty value instead.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The requested line does not exist in the file.
    #[error("Line {line} is out of range (file has {available} lines)")]
    LineOutOfRange {
        /// Requested 1-based line.
        line: usize,
        /// Number of lines in the file.
        available: usize,
    },

    /// The requested column window does not fit the line.
    #[error("Columns {start}..{end} are out of range for line {line} ({length} characters)")]
    ColumnOutOfRange {
        /// Requested 1-based line.
        line: usize,
        /// Requested 1-based start column.
        start: usize,
        /// Requested exclusive end column.
        end: usize,
        /// Length of the line in characters.
        length: usize,
    },

    /// The file could not be read.
    #[error("Failed to read file for inspection: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by a remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Local or remote I/O failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// A connection or operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The SSH transport or SFTP session failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server rejected the credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The server host key did not match the configured fingerprint.
    #[error("Host key rejected: {0}")]
    HostKey(String),

    /// The remote path does not exist.
    #[error("Remote path not found: {0}")]
    NotFound(String),

    /// The server denied access to the path.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Credentials are missing or incomplete.
    #[error("Remote endpoint not configured: {0}")]
    NotConfigured(String),

    /// Any other status reported by the server.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl TransferError {
    /// Returns true if the error is expected to clear up on retry.
    ///
    /// Local I/O errors, timeouts, and transport/session failures are
    /// transient; everything else fails immediately.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Timeout(_) | Self::Transport(_))
    }

    /// Returns true if the session that produced this error should be dropped.
    #[must_use]
    pub fn breaks_session(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Transport(_))
    }
}

impl From<std::io::Error> for TransferError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::TimedOut {
            Self::Timeout(err.to_string())
        } else {
            Self::Io(err.to_string())
        }
    }
}

/// Errors raised by a notifier.
#[derive(Debug, Clone, Error)]
#[error("Notification to '{target}' failed: {reason}")]
pub struct NotifyError {
    /// The notification target.
    pub target: String,
    /// Why delivery failed.
    pub reason: String,
}

impl NotifyError {
    /// Creates a new notify error.
    #[must_use]
    pub fn new(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            reason: reason.into(),
        }
    }
}
