//! Variable resolution and content inspection.
//!
//! Step arguments and step names reference folder-mapping fields with
//! `@Field` placeholders; destinations may also carry `@Inspect_VAR`, which
//! is filled per file from a fixed window of the file's content.

mod inspect;
mod variable;

pub use inspect::{clean_inspected, extract_window, inspect_file, InspectInstruction, INSPECT_PLACEHOLDER};
pub use variable::{display_name, extract_variable, resolve_token, FieldTable, ResolveError};
