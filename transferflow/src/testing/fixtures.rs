//! On-disk fixtures for pipeline tests.

use std::path::{Path, PathBuf};

use crate::config::{FolderMapping, StepSpec};

/// A folder layout under a caller-owned root directory.
///
/// Creates `in/`, `out/`, `done/`, and `error/` below the root.
#[derive(Debug, Clone)]
pub struct FolderFixture {
    root: PathBuf,
}

impl FolderFixture {
    /// Creates the layout below `root`.
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let fixture = Self { root: root.into() };
        for dir in ["in", "out", "done", "error"] {
            std::fs::create_dir_all(fixture.root.join(dir))?;
        }
        Ok(fixture)
    }

    /// Returns the origin folder.
    #[must_use]
    pub fn origin(&self) -> PathBuf {
        self.root.join("in")
    }

    /// Returns the local destination folder.
    #[must_use]
    pub fn destination(&self) -> PathBuf {
        self.root.join("out")
    }

    /// Returns the success folder.
    #[must_use]
    pub fn success(&self) -> PathBuf {
        self.root.join("done")
    }

    /// Returns the error folder.
    #[must_use]
    pub fn error(&self) -> PathBuf {
        self.root.join("error")
    }

    /// Writes a file into the origin folder.
    pub fn write_origin(&self, name: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.origin().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Returns the sorted file names in `dir`.
    pub fn file_names(dir: &Path) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Returns a mapping over this layout with `steps`.
    ///
    /// The destination is the local `out/` folder.
    #[must_use]
    pub fn mapping(&self, steps: Vec<StepSpec>) -> FolderMapping {
        let mut mapping = FolderMapping::new(
            "Orders",
            self.origin().display().to_string(),
            self.destination().display().to_string(),
        )
        .with_success_path(self.success().display().to_string())
        .with_error_path(self.error().display().to_string())
        .with_notify_target("ops@example.com");
        for step in steps {
            mapping = mapping.with_step(step);
        }
        mapping
    }
}
