//! Remote transfer endpoints.
//!
//! Executors talk to the remote side through [`RemoteEndpoint`]; the
//! production implementation is [`SftpEndpoint`]. Remote paths are plain
//! `/`-separated strings.

mod sftp;

pub use sftp::SftpEndpoint;

use crate::errors::TransferError;
use async_trait::async_trait;
use std::path::Path;

/// Prefix marking a destination as remote in configuration.
pub const SFTP_PREFIX: &str = "SFTP:";

/// Operations the executors need from a remote file store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteEndpoint: Send + Sync {
    /// Returns true if `path` exists.
    async fn exists(&self, path: &str) -> Result<bool, TransferError>;

    /// Returns the size of the file at `path`, or `None` if it does not exist.
    async fn file_size(&self, path: &str) -> Result<Option<u64>, TransferError>;

    /// Creates a single directory. The parent must exist.
    async fn create_dir(&self, path: &str) -> Result<(), TransferError>;

    /// Uploads `local` to `remote`, overwriting it. Returns the bytes written.
    ///
    /// Every call opens its own read handle on `local`.
    async fn upload(&self, local: &Path, remote: &str) -> Result<u64, TransferError>;

    /// Releases the session, if any.
    async fn disconnect(&self);
}

/// Creates `path` and every missing parent, walking one segment at a time.
pub async fn create_dir_all(endpoint: &dyn RemoteEndpoint, path: &str) -> Result<(), TransferError> {
    for prefix in path_prefixes(path) {
        if !endpoint.exists(&prefix).await? {
            tracing::debug!(path = %prefix, "Creating remote directory");
            endpoint.create_dir(&prefix).await?;
        }
    }
    Ok(())
}

/// Returns every cumulative prefix of `path`: `/a/b` yields `/a` and `/a/b`.
#[must_use]
pub fn path_prefixes(path: &str) -> Vec<String> {
    let absolute = path.starts_with('/');
    let mut current = String::new();
    let mut prefixes = Vec::new();

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if absolute || !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);
        prefixes.push(current.clone());
    }
    prefixes
}

/// Joins a remote directory and a file name with `/`.
#[must_use]
pub fn join_remote(dir: &str, name: &str) -> String {
    let trimmed = dir.trim_end_matches('/');
    if trimmed.is_empty() && !dir.starts_with('/') {
        name.to_string()
    } else {
        format!("{trimmed}/{name}")
    }
}

/// Removes a leading `SFTP:` marker, ignoring case.
#[must_use]
pub fn strip_sftp_prefix(destination: &str) -> &str {
    match destination.get(..SFTP_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(SFTP_PREFIX) => &destination[SFTP_PREFIX.len()..],
        _ => destination,
    }
}
