//! Content inspection: reading a fixed line/column window out of a file.
//!
//! The instruction is a 16-character fixed-width string. Characters at
//! offsets `1..6` hold the 1-based line number, `7..11` the 1-based start
//! column and `12..16` the exclusive end column. Separator characters (`_`)
//! and whitespace padding inside a field are ignored, so `00003__0005_0010`
//! reads line 3, columns 5 to 10.

use crate::errors::InspectError;
use std::path::Path;

/// Destination placeholder replaced by the per-file inspected value.
pub const INSPECT_PLACEHOLDER: &str = "@Inspect_VAR";

const LINE_FIELD: std::ops::Range<usize> = 1..6;
const START_FIELD: std::ops::Range<usize> = 7..11;
const END_FIELD: std::ops::Range<usize> = 12..16;

/// A parsed inspection instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectInstruction {
    /// 1-based line number.
    pub line: usize,
    /// 1-based start column.
    pub start: usize,
    /// Exclusive end column.
    pub end: usize,
}

impl InspectInstruction {
    /// Parses an instruction, returning `None` if any field is not a number.
    #[must_use]
    pub fn parse(instruction: &str) -> Option<Self> {
        let field = |range: std::ops::Range<usize>| -> Option<usize> {
            instruction
                .get(range)?
                .trim_matches(|c: char| c == '_' || c.is_whitespace())
                .parse()
                .ok()
        };
        Some(Self {
            line: field(LINE_FIELD)?,
            start: field(START_FIELD)?,
            end: field(END_FIELD)?,
        })
    }
}

/// Extracts the window described by `instruction` from `text`.
///
/// Empty text yields an empty string. A line or column outside the text is
/// an error; the window is never silently truncated.
pub fn extract_window(text: &str, instruction: &InspectInstruction) -> Result<String, InspectError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Ok(String::new());
    }

    let line = instruction
        .line
        .checked_sub(1)
        .and_then(|index| lines.get(index))
        .ok_or(InspectError::LineOutOfRange {
            line: instruction.line,
            available: lines.len(),
        })?;

    let chars: Vec<char> = line.chars().collect();
    let column_error = || InspectError::ColumnOutOfRange {
        line: instruction.line,
        start: instruction.start,
        end: instruction.end,
        length: chars.len(),
    };
    let begin = instruction.start.checked_sub(1).ok_or_else(column_error)?;
    if instruction.end < begin || instruction.end > chars.len() {
        return Err(column_error());
    }

    Ok(chars[begin..instruction.end].iter().collect())
}

/// Reads `path` and extracts the window described by `instruction`.
///
/// A missing or empty file and a malformed instruction all yield an empty
/// string.
pub async fn inspect_file(path: &Path, instruction: &str) -> Result<String, InspectError> {
    let Some(parsed) = InspectInstruction::parse(instruction) else {
        tracing::warn!(instruction, "Malformed inspection instruction");
        return Ok(String::new());
    };

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(String::new()),
        Err(err) => return Err(err.into()),
    };

    extract_window(&String::from_utf8_lossy(&bytes), &parsed)
}

/// Strips surrounding whitespace and leading zeros from an inspected value.
#[must_use]
pub fn clean_inspected(raw: &str) -> String {
    raw.trim().trim_start_matches('0').trim().to_string()
}
