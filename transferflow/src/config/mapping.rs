//! Folder mapping model loaded from `apptasks.json`.

use serde::{Deserialize, Serialize};

/// Top-level task file: an application name, version, and its folder mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppTask {
    /// Application name.
    #[serde(default, alias = "Name")]
    pub name: String,
    /// Application version.
    #[serde(default, alias = "Version")]
    pub version: String,
    /// Configured folder mappings, processed in declaration order.
    #[serde(default, alias = "FolderMaps")]
    pub folder_maps: Vec<FolderMapping>,
}

/// One configured unit of work: an origin folder, its destinations, and an
/// ordered list of steps.
///
/// Immutable once loaded; every polling tick builds fresh operations from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMapping {
    /// Display name.
    #[serde(default, alias = "Name")]
    pub name: String,
    /// Local folder the files are picked up from.
    #[serde(default, alias = "FolderPathOrigin")]
    pub origin: String,
    /// Destination path, local or remote.
    #[serde(default, alias = "SFTPPathDestination")]
    pub destination: String,
    /// Folder receiving files when a step fails.
    #[serde(default, alias = "ProcessedFilesOnError")]
    pub error_path: String,
    /// Folder receiving files after a successful run.
    #[serde(default, alias = "ProcessedFilesOnSuccess")]
    pub success_path: String,
    /// Notification target (a mail address for the mail notifier).
    #[serde(default, alias = "EmailNotify")]
    pub notify_target: String,
    /// Inspection instruction referenced by `@InspectLocation`.
    #[serde(default, alias = "InspectLocation")]
    pub inspect_location: String,
    /// Steps in declaration order.
    #[serde(default, alias = "TasksMaps")]
    pub steps: Vec<StepSpec>,
}

impl FolderMapping {
    /// Creates a mapping with a name, origin, and destination.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            destination: destination.into(),
            ..Default::default()
        }
    }

    /// Sets the error routing folder.
    #[must_use]
    pub fn with_error_path(mut self, path: impl Into<String>) -> Self {
        self.error_path = path.into();
        self
    }

    /// Sets the success routing folder.
    #[must_use]
    pub fn with_success_path(mut self, path: impl Into<String>) -> Self {
        self.success_path = path.into();
        self
    }

    /// Sets the notification target.
    #[must_use]
    pub fn with_notify_target(mut self, target: impl Into<String>) -> Self {
        self.notify_target = target.into();
        self
    }

    /// Sets the inspection instruction.
    #[must_use]
    pub fn with_inspect_location(mut self, instruction: impl Into<String>) -> Self {
        self.inspect_location = instruction.into();
        self
    }

    /// Appends a step.
    #[must_use]
    pub fn with_step(mut self, step: StepSpec) -> Self {
        self.steps.push(step);
        self
    }

    /// Returns the name, or `"N/A"` when empty.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "N/A"
        } else {
            &self.name
        }
    }
}

/// The declarative form of one pipeline step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Name template; may embed one `@Field` placeholder.
    #[serde(default, alias = "Name")]
    pub name: String,
    /// Sort key. Equal values keep declaration order.
    #[serde(default, alias = "Order")]
    pub order: i32,
    /// Step specification string, `kind:arg1:...:arg5`.
    #[serde(default, alias = "Task")]
    pub task: String,
}

impl StepSpec {
    /// Creates a new step.
    #[must_use]
    pub fn new(name: impl Into<String>, order: i32, task: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order,
            task: task.into(),
        }
    }
}
