//! Per-path exclusive locks.
//!
//! Executors hold a file's lock for the whole per-file sequence (inspection,
//! destination substitution, existence check, transfer or delete) so that two
//! callers touching the same absolute path never interleave.
//!
//! Entries are created on first use. [`PathLocks::sweep`] drops entries that
//! nobody holds or waits on and that have been idle longer than the
//! configured TTL; it also runs opportunistically once the registry grows
//! past its sweep threshold.

use crate::config::GuardSettings;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};

struct LockEntry {
    mutex: Arc<Mutex<()>>,
    last_used: parking_lot::Mutex<Instant>,
}

impl LockEntry {
    fn new() -> Self {
        Self {
            mutex: Arc::new(Mutex::new(())),
            last_used: parking_lot::Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_used.lock() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_used.lock().elapsed()
    }
}

/// Registry of per-absolute-path locks.
pub struct PathLocks {
    entries: DashMap<PathBuf, Arc<LockEntry>>,
    idle_ttl: Duration,
    sweep_threshold: usize,
}

impl PathLocks {
    /// Creates a registry with the given idle TTL and sweep threshold.
    #[must_use]
    pub fn new(idle_ttl: Duration, sweep_threshold: usize) -> Self {
        Self {
            entries: DashMap::new(),
            idle_ttl,
            sweep_threshold,
        }
    }

    /// Creates a registry from settings.
    #[must_use]
    pub fn from_settings(settings: &GuardSettings) -> Self {
        Self::new(settings.idle_ttl(), settings.sweep_threshold)
    }

    /// Waits for exclusive access to `path`.
    ///
    /// The lock is released when the returned guard is dropped, including
    /// during unwinding.
    pub async fn lock(&self, path: &Path) -> PathGuard {
        let key = lock_key(path);
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(LockEntry::new()))
            .clone();

        if self.entries.len() > self.sweep_threshold {
            self.sweep();
        }

        let guard = entry.mutex.clone().lock_owned().await;
        entry.touch();
        PathGuard {
            _guard: guard,
            entry,
            path: key,
        }
    }

    /// Removes idle entries nobody holds. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| Arc::strong_count(entry) > 1 || entry.idle_for() < self.idle_ttl);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.entries.len(), "Swept idle path locks");
        }
        removed
    }

    /// Returns the number of registered paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no path is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PathLocks {
    fn default() -> Self {
        Self::from_settings(&GuardSettings::default())
    }
}

impl std::fmt::Debug for PathLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathLocks")
            .field("entries", &self.entries.len())
            .field("idle_ttl", &self.idle_ttl)
            .field("sweep_threshold", &self.sweep_threshold)
            .finish()
    }
}

/// Exclusive access to one path, released on drop.
pub struct PathGuard {
    _guard: OwnedMutexGuard<()>,
    entry: Arc<LockEntry>,
    path: PathBuf,
}

impl PathGuard {
    /// Returns the absolute path this guard protects.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        self.entry.touch();
    }
}

impl std::fmt::Debug for PathGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathGuard").field("path", &self.path).finish()
    }
}

fn lock_key(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
