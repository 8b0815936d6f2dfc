//! Timestamp utilities.

use chrono::{DateTime, Utc};
use std::path::Path;

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Formats the `[HH:MM:SS]` prefix used for operation message lines.
#[must_use]
pub fn clock_prefix(dt: &Timestamp) -> String {
    dt.format("[%H:%M:%S]").to_string()
}

/// Formats the `yyyyMMdd_HHmmss_fff` suffix used when renaming files.
#[must_use]
pub fn file_suffix(dt: &Timestamp) -> String {
    dt.format("%Y%m%d_%H%M%S_%3f").to_string()
}

/// Inserts `_{suffix}` between a file name's stem and extension.
///
/// `report.txt` with suffix `x` becomes `report_x.txt`; names without an
/// extension get the suffix appended.
#[must_use]
pub fn suffixed_file_name(file_name: &str, suffix: &str) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map_or_else(|| file_name.to_string(), |s| s.to_string_lossy().into_owned());
    match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    }
}

/// Builds the `{stem}_backup_{suffix}{ext}` name for a displaced destination file.
#[must_use]
pub fn backup_file_name(file_name: &str, at: &Timestamp) -> String {
    suffixed_file_name(file_name, &format!("backup_{}", file_suffix(at)))
}
