//! Service configuration.
//!
//! Two JSON files drive the service:
//!
//! - `settings.json` ([`AppSettings`]): polling interval, remote endpoint
//!   credentials, logging, retry, lock-registry and mail settings.
//! - `apptasks.json` ([`AppTask`]): the folder mappings and their steps.
//!
//! Both accept the PascalCase keys of the legacy configuration files through
//! serde aliases.

mod loader;
mod mapping;
mod settings;

pub use loader::{load_app_task, parse_app_task, validate_app_task};
pub use mapping::{AppTask, FolderMapping, StepSpec};
pub use settings::{AppSettings, GuardSettings, LogSettings, MailSettings, TransferCredentials};
