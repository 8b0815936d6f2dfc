//! Local-versus-remote classification of destination strings.

use crate::resolve::INSPECT_PLACEHOLDER;
use crate::transport::strip_sftp_prefix;
use std::path::Path;

/// Where an operation's argument 2 points.
///
/// The classification is made on the literal argument, before any
/// per-file substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A directory on this machine.
    Local(String),
    /// A directory on the remote endpoint, without any `SFTP:` marker.
    Remote(String),
}

impl Destination {
    /// Classifies a destination string.
    ///
    /// In order: a rooted path (`/`, a drive or UNC root) is local, even when
    /// it holds `@Inspect_VAR`; a `./` or `../` path is local; anything else
    /// is remote.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        if is_local_path(raw) {
            Self::Local(raw.to_string())
        } else {
            Self::Remote(strip_sftp_prefix(raw).to_string())
        }
    }

    /// Returns the path template.
    #[must_use]
    pub fn template(&self) -> &str {
        match self {
            Self::Local(path) | Self::Remote(path) => path,
        }
    }

    /// Returns true for a local destination.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Returns the directory for one file, substituting `@Inspect_VAR`.
    #[must_use]
    pub fn directory_for(&self, inspected: Option<&str>) -> String {
        match inspected {
            Some(value) => self.template().replace(INSPECT_PLACEHOLDER, value),
            None => self.template().to_string(),
        }
    }

    /// Returns a short label for messages.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        if self.is_local() {
            "local directory"
        } else {
            "remote endpoint"
        }
    }
}

/// Returns true if `path` names a local directory.
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    if Path::new(path).has_root() || is_windows_rooted(path) {
        return true;
    }
    path.starts_with("./") || path.starts_with("../")
}

fn is_windows_rooted(path: &str) -> bool {
    let bytes = path.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');
    drive || path.starts_with('\\')
}
