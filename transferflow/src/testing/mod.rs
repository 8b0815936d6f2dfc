//! Testing utilities for transferflow.
//!
//! This module provides:
//! - An in-memory remote endpoint with scripted failures
//! - A notifier that records every report it receives
//! - On-disk folder layouts for pipeline tests

mod endpoint;
mod fixtures;
mod notifier;

pub use endpoint::MemoryEndpoint;
pub use fixtures::FolderFixture;
pub use notifier::RecordingNotifier;
