//! Source enumeration and local file helpers.

use crate::errors::SourceError;
use std::path::{Path, PathBuf};

/// A regular file found in an origin folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Full path.
    pub path: PathBuf,
    /// File name.
    pub name: String,
    /// Size in bytes at enumeration time.
    pub size: u64,
}

/// Lists the regular files directly inside `folder`, sorted by name.
pub async fn list_source_files(folder: &str) -> Result<Vec<SourceFile>, SourceError> {
    if folder.trim().is_empty() {
        return Err(SourceError::Empty);
    }
    let dir = Path::new(folder);
    if !dir.is_absolute() {
        return Err(SourceError::NotAbsolute(folder.to_string()));
    }
    if !tokio::fs::metadata(dir).await.is_ok_and(|meta| meta.is_dir()) {
        return Err(SourceError::NotFound(folder.to_string()));
    }

    let io_error = |source| SourceError::Io {
        path: folder.to_string(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        files.push(SourceFile {
            path: entry.path(),
            name: entry.file_name().to_string_lossy().into_owned(),
            size: meta.len(),
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Creates `dir` and its parents. Returns true if it did not exist before.
pub async fn ensure_local_dir(dir: &Path) -> std::io::Result<bool> {
    if tokio::fs::metadata(dir).await.is_ok_and(|meta| meta.is_dir()) {
        return Ok(false);
    }
    tokio::fs::create_dir_all(dir).await?;
    Ok(true)
}

/// Moves a file, falling back to copy and remove when a rename is refused
/// (for instance across file systems).
pub async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if tokio::fs::copy(from, to).await.is_err() {
                return Err(rename_err);
            }
            tokio::fs::remove_file(from).await
        }
    }
}

/// Returns the size of a local file, or `None` if it does not exist.
pub async fn local_size(path: &Path) -> std::io::Result<Option<u64>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(Some(meta.len())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Returns true if another process holds the file open exclusively.
///
/// Probes with an exclusive read open on the blocking pool. Only Windows
/// enforces sharing modes, so elsewhere this reports files that cannot be
/// opened for reading.
pub async fn is_locked(path: &Path) -> bool {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || exclusive_open_fails(&path))
        .await
        .unwrap_or(true)
}

fn exclusive_open_fails(path: &Path) -> bool {
    let mut options = std::fs::OpenOptions::new();
    options.read(true);
    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        options.share_mode(0);
    }
    options.open(path).is_err()
}
