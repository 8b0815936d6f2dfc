//! `@Field` placeholder resolution against a folder mapping.

use crate::config::FolderMapping;
use thiserror::Error;

type Accessor = fn(&FolderMapping) -> &str;

/// Why a placeholder could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The placeholder name was empty or blank.
    #[error("Variable name is empty")]
    EmptyName,

    /// No field carries this name.
    #[error("Unknown variable '{0}'")]
    UnknownField(String),
}

/// The resolvable folder-mapping fields, by their configuration names.
///
/// Names match exactly and case-sensitively.
#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    entries: &'static [(&'static str, Accessor)],
}

static FOLDER_MAPPING_FIELDS: [(&str, Accessor); 7] = [
    ("Name", |m| m.name.as_str()),
    ("FolderPathOrigin", |m| m.origin.as_str()),
    ("SFTPPathDestination", |m| m.destination.as_str()),
    ("ProcessedFilesOnError", |m| m.error_path.as_str()),
    ("ProcessedFilesOnSuccess", |m| m.success_path.as_str()),
    ("EmailNotify", |m| m.notify_target.as_str()),
    ("InspectLocation", |m| m.inspect_location.as_str()),
];

impl Default for FieldTable {
    fn default() -> Self {
        Self::folder_mapping()
    }
}

impl FieldTable {
    /// Returns the table of [`FolderMapping`] fields.
    #[must_use]
    pub fn folder_mapping() -> Self {
        Self {
            entries: &FOLDER_MAPPING_FIELDS,
        }
    }

    /// Returns the resolvable field names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// Resolves `name` against `mapping`.
    pub fn resolve<'a>(
        &self,
        name: &str,
        mapping: &'a FolderMapping,
    ) -> Result<&'a str, ResolveError> {
        if name.trim().is_empty() {
            return Err(ResolveError::EmptyName);
        }
        self.entries
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, accessor)| accessor(mapping))
            .ok_or_else(|| ResolveError::UnknownField(name.to_string()))
    }
}

/// Returns the placeholder name in `text`: everything after the first `@` up
/// to the next space or the end.
#[must_use]
pub fn extract_variable(text: &str) -> Option<&str> {
    let start = text.find('@')? + 1;
    let rest = &text[start..];
    let end = rest.find(' ').unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Resolves one step-specification argument token.
///
/// The token is trimmed and its placeholder resolved. Tokens without a
/// placeholder, or whose placeholder is unknown, resolve to `None`.
#[must_use]
pub fn resolve_token(token: &str, mapping: &FolderMapping) -> Option<String> {
    let name = extract_variable(token.trim())?;
    match FieldTable::folder_mapping().resolve(name, mapping) {
        Ok(value) => Some(value.to_string()),
        Err(err) => {
            tracing::debug!(token, error = %err, "Argument left unresolved");
            None
        }
    }
}

/// Substitutes the placeholder in a step name template.
///
/// Unresolved placeholders become empty; an empty template becomes `"N/A"`.
#[must_use]
pub fn display_name(template: &str, mapping: &FolderMapping) -> String {
    if template.is_empty() {
        return "N/A".to_string();
    }
    match extract_variable(template) {
        Some(name) => {
            let value = FieldTable::folder_mapping()
                .resolve(name, mapping)
                .unwrap_or_default();
            template.replace(&format!("@{name}"), value)
        }
        None => template.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mapping() -> FolderMapping {
        FolderMapping::new("Orders", "/data/in", "SFTP:/upload")
            .with_error_path("/data/error")
            .with_success_path("/data/done")
            .with_notify_target("ops@example.com")
            .with_inspect_location("_00003_0005_0010")
    }

    #[test]
    fn test_resolve_every_field() {
        let m = mapping();
        let table = FieldTable::folder_mapping();
        let resolved: Vec<&str> = table
            .names()
            .map(|name| table.resolve(name, &m).unwrap())
            .collect();

        assert_eq!(
            resolved,
            vec![
                "Orders",
                "/data/in",
                "SFTP:/upload",
                "/data/error",
                "/data/done",
                "ops@example.com",
                "_00003_0005_0010",
            ]
        );
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let m = mapping();
        assert_eq!(
            FieldTable::default().resolve("name", &m),
            Err(ResolveError::UnknownField("name".to_string()))
        );
    }

    #[test]
    fn test_resolve_empty_name() {
        assert_eq!(
            FieldTable::default().resolve(" ", &mapping()),
            Err(ResolveError::EmptyName)
        );
    }

    #[test]
    fn test_extract_variable() {
        assert_eq!(extract_variable("@FolderPathOrigin"), Some("FolderPathOrigin"));
        assert_eq!(extract_variable("Copy @Name now"), Some("Name"));
        assert_eq!(extract_variable("Copy @"), Some(""));
        assert_eq!(extract_variable("literal"), None);
    }

    #[test]
    fn test_resolve_token() {
        let m = mapping();
        assert_eq!(resolve_token(" @FolderPathOrigin ", &m), Some("/data/in".to_string()));
        assert_eq!(resolve_token("/literal/path", &m), None);
        assert_eq!(resolve_token("@Missing", &m), None);
    }

    #[test]
    fn test_display_name() {
        let m = mapping();
        assert_eq!(display_name("Copy @Name to remote", &m), "Copy Orders to remote");
        assert_eq!(display_name("Copy @Unknown", &m), "Copy ");
        assert_eq!(display_name("Plain", &m), "Plain");
        assert_eq!(display_name("", &m), "N/A");
    }
}
