//! Transferflow service entry point.
//!
//! Reads `settings.json` and `apptasks.json` (overridable through
//! `TRANSFERFLOW_SETTINGS` and `TRANSFERFLOW_TASKS`), then polls until Ctrl-C.

use anyhow::Context;
use std::sync::Arc;
use transferflow::observability::init_tracing;
use transferflow::prelude::*;

const SETTINGS_ENV: &str = "TRANSFERFLOW_SETTINGS";
const TASKS_ENV: &str = "TRANSFERFLOW_TASKS";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings_path = std::env::var(SETTINGS_ENV).unwrap_or_else(|_| "settings.json".into());
    let tasks_path = std::env::var(TASKS_ENV).unwrap_or_else(|_| "apptasks.json".into());

    let settings = AppSettings::load(&settings_path)
        .with_context(|| format!("loading settings from {settings_path}"))?;
    init_tracing(&settings.log).context("installing tracing")?;

    let app_task = load_app_task(&tasks_path)
        .with_context(|| format!("loading tasks from {tasks_path}"))?;

    let issues = settings.remote.validate();
    if !issues.is_empty() {
        tracing::warn!(issues = ?issues, "Remote credentials are incomplete; remote steps will fail");
    }

    let endpoint = Arc::new(SftpEndpoint::new(settings.remote.clone()));
    let worker = Worker::new(app_task, settings, endpoint, Arc::new(LoggingNotifier));

    let token = Arc::new(CancellationToken::new());
    let signal_token = Arc::clone(&token);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal_token.cancel("Ctrl-C received"),
            Err(err) => tracing::error!(error = %err, "Could not listen for Ctrl-C"),
        }
    });

    worker.run(&token).await;
    Ok(())
}
