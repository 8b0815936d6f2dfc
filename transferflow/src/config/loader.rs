//! Loading and validation of the JSON configuration files.

use super::{AppSettings, AppTask, FolderMapping};
use crate::errors::ConfigError;
use std::path::Path;
use tracing::info;

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Reads, parses, and validates `apptasks.json`.
pub fn load_app_task(path: impl AsRef<Path>) -> Result<AppTask, ConfigError> {
    let path = path.as_ref();
    let raw = read_file(path)?;
    let task = parse_app_task(&raw).map_err(|err| match err {
        ConfigError::Parse { source, .. } => ConfigError::Parse {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })?;

    info!(
        path = %path.display(),
        app = %task.name,
        version = %task.version,
        folders = task.folder_maps.len(),
        "Loaded task configuration"
    );
    Ok(task)
}

/// Parses and validates a task configuration held in memory.
pub fn parse_app_task(raw: &str) -> Result<AppTask, ConfigError> {
    let task: AppTask = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
        path: "<inline>".to_string(),
        source,
    })?;

    let issues = validate_app_task(&task);
    if issues.is_empty() {
        Ok(task)
    } else {
        Err(ConfigError::invalid(issues))
    }
}

/// Lists every problem in a task configuration.
#[must_use]
pub fn validate_app_task(task: &AppTask) -> Vec<String> {
    let mut issues = Vec::new();

    if task.name.trim().is_empty() {
        issues.push("application name cannot be empty".to_string());
    }
    if task.version.trim().is_empty() {
        issues.push("application version cannot be empty".to_string());
    }
    if task.folder_maps.is_empty() {
        issues.push("at least one folder mapping must be configured".to_string());
    }

    for (index, mapping) in task.folder_maps.iter().enumerate() {
        validate_mapping(mapping, index, &mut issues);
    }
    issues
}

fn validate_mapping(mapping: &FolderMapping, index: usize, issues: &mut Vec<String>) {
    let required = [
        ("name", &mapping.name),
        ("origin", &mapping.origin),
        ("destination", &mapping.destination),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            issues.push(format!("folder_maps[{index}]: {field} cannot be empty"));
        }
    }
    if mapping.steps.is_empty() {
        issues.push(format!(
            "folder_maps[{index}]: at least one step must be configured"
        ));
    }
}

impl AppSettings {
    /// Reads and parses `settings.json`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = read_file(path)?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
