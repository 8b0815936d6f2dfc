//! In-memory remote endpoint.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

use crate::errors::TransferError;
use crate::transport::RemoteEndpoint;

#[derive(Debug, Default)]
struct State {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, u64>,
    created_dirs: Vec<String>,
    uploads: Vec<String>,
    upload_attempts: usize,
    upload_failures: VecDeque<TransferError>,
    disconnects: usize,
}

/// A [`RemoteEndpoint`] backed by in-memory maps.
///
/// Directories must exist before files or subdirectories are created in
/// them, matching an SFTP server.
#[derive(Debug, Default)]
pub struct MemoryEndpoint {
    state: Mutex<State>,
}

fn parent_of(path: &str) -> Option<&str> {
    path.rsplit_once('/')
        .map(|(parent, _)| parent)
        .filter(|parent| !parent.is_empty())
}

impl MemoryEndpoint {
    /// Creates an empty endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an existing directory.
    #[must_use]
    pub fn with_dir(self, path: impl Into<String>) -> Self {
        self.state.lock().dirs.insert(path.into());
        self
    }

    /// Adds an existing file of `size` bytes.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, size: u64) -> Self {
        self.state.lock().files.insert(path.into(), size);
        self
    }

    /// Makes the next uploads fail with `errors`, in order.
    #[must_use]
    pub fn fail_next_uploads(self, errors: Vec<TransferError>) -> Self {
        self.state.lock().upload_failures.extend(errors);
        self
    }

    /// Returns the directories created through the endpoint, in order.
    #[must_use]
    pub fn created_dirs(&self) -> Vec<String> {
        self.state.lock().created_dirs.clone()
    }

    /// Returns the remote paths of successful uploads, in order.
    #[must_use]
    pub fn uploads(&self) -> Vec<String> {
        self.state.lock().uploads.clone()
    }

    /// Returns the number of upload attempts, failed ones included.
    #[must_use]
    pub fn upload_attempts(&self) -> usize {
        self.state.lock().upload_attempts
    }

    /// Returns the number of times the session was released.
    #[must_use]
    pub fn disconnects(&self) -> usize {
        self.state.lock().disconnects
    }

    /// Returns true if a file exists at `path`.
    #[must_use]
    pub fn has_file(&self, path: &str) -> bool {
        self.state.lock().files.contains_key(path)
    }
}

impl State {
    fn parent_exists(&self, path: &str) -> bool {
        parent_of(path).map_or(true, |parent| self.dirs.contains(parent))
    }
}

#[async_trait]
impl RemoteEndpoint for MemoryEndpoint {
    async fn exists(&self, path: &str) -> Result<bool, TransferError> {
        let state = self.state.lock();
        Ok(state.dirs.contains(path) || state.files.contains_key(path))
    }

    async fn file_size(&self, path: &str) -> Result<Option<u64>, TransferError> {
        Ok(self.state.lock().files.get(path).copied())
    }

    async fn create_dir(&self, path: &str) -> Result<(), TransferError> {
        let mut state = self.state.lock();
        if !state.parent_exists(path) {
            return Err(TransferError::NotFound(path.to_string()));
        }
        if state.dirs.insert(path.to_string()) {
            state.created_dirs.push(path.to_string());
        }
        Ok(())
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<u64, TransferError> {
        let size = tokio::fs::metadata(local).await?.len();

        let mut state = self.state.lock();
        state.upload_attempts += 1;
        if let Some(err) = state.upload_failures.pop_front() {
            return Err(err);
        }
        if !state.parent_exists(remote) {
            return Err(TransferError::NotFound(remote.to_string()));
        }
        state.files.insert(remote.to_string(), size);
        state.uploads.push(remote.to_string());
        Ok(size)
    }

    async fn disconnect(&self) {
        self.state.lock().disconnects += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_dir_requires_parent() {
        let endpoint = MemoryEndpoint::new().with_dir("/upload");

        assert!(endpoint.create_dir("/upload/a").await.is_ok());
        assert!(matches!(
            endpoint.create_dir("/missing/a").await,
            Err(TransferError::NotFound(_))
        ));
        assert_eq!(endpoint.created_dirs(), vec!["/upload/a"]);
    }

    #[tokio::test]
    async fn test_scripted_upload_failures() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.txt");
        std::fs::write(&local, "abc").unwrap();
        let endpoint = MemoryEndpoint::new()
            .with_dir("/upload")
            .fail_next_uploads(vec![TransferError::Timeout("slow".into())]);

        assert!(endpoint.upload(&local, "/upload/a.txt").await.is_err());
        assert_eq!(endpoint.upload(&local, "/upload/a.txt").await.unwrap(), 3);
        assert_eq!(endpoint.upload_attempts(), 2);
        assert_eq!(endpoint.file_size("/upload/a.txt").await.unwrap(), Some(3));
    }
}
