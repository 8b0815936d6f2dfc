//! Tracing subscriber installation and span timing.
//!
//! Log output goes to stdout (human-readable or JSON) and, when a log
//! directory is configured, is mirrored as plain text to
//! `<directory>/processlog.log`.

use crate::config::LogSettings;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use thiserror::Error;
use ::tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Name of the log file written inside the configured log directory.
pub const LOG_FILE_NAME: &str = "processlog.log";

/// Errors raised while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum TracingInitError {
    /// The log file could not be opened.
    #[error("Failed to open log file '{path}': {source}")]
    LogFile {
        /// Path of the log file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A global subscriber was already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global tracing subscriber described by `settings`.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_tracing(settings: &LogSettings) -> Result<(), TracingInitError> {
    let log_file = match settings.directory.as_deref() {
        Some(dir) if !dir.trim().is_empty() => Some(open_log_file(Path::new(dir))?),
        _ => None,
    };

    // The file layer's type depends on the stack below it, so each branch builds its own.
    if settings.json {
        tracing_subscriber::registry()
            .with(build_env_filter(&settings.level))
            .with(fmt::layer().json().with_target(false).with_thread_ids(false))
            .with(log_file.map(file_layer))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(build_env_filter(&settings.level))
            .with(fmt::layer().with_target(false).with_thread_ids(false))
            .with(log_file.map(file_layer))
            .try_init()?;
    }
    Ok(())
}

fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn open_log_file(dir: &Path) -> Result<File, TracingInitError> {
    let path = dir.join(LOG_FILE_NAME);
    let to_error = |source| TracingInitError::LogFile {
        path: path.display().to_string(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(to_error)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(to_error)
}

/// A timer for measuring span durations.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start("copy");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(timer.name(), "copy");
        assert!(timer.finish() >= 10.0);
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");

        open_log_file(&dir).unwrap();

        assert!(dir.join(LOG_FILE_NAME).is_file());
    }

    #[test]
    fn test_open_log_file_appends() {
        use std::io::Write;

        let tmp = tempfile::tempdir().unwrap();
        writeln!(open_log_file(tmp.path()).unwrap(), "first").unwrap();
        writeln!(open_log_file(tmp.path()).unwrap(), "second").unwrap();

        let content = std::fs::read_to_string(tmp.path().join(LOG_FILE_NAME)).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_init_tracing_mirrors_to_log_file() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = LogSettings {
            level: "info".to_string(),
            json: false,
            directory: Some(tmp.path().display().to_string()),
        };

        init_tracing(&settings).unwrap();
        ::tracing::warn!(folder = "Orders", "Mirrored line");

        assert!(matches!(
            init_tracing(&LogSettings::default()),
            Err(TracingInitError::Install(_))
        ));
        let content = std::fs::read_to_string(tmp.path().join(LOG_FILE_NAME)).unwrap();
        assert!(content.contains("Mirrored line"));
        assert!(!content.contains("\u{1b}["), "file output has no ANSI colors");
    }
}
