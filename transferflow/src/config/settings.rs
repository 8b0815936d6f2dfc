//! Service settings loaded from `settings.json`.

use crate::pipeline::RetryConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Process-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Delay between polling ticks, in milliseconds.
    #[serde(alias = "IntervaloEntreExecucoes")]
    pub poll_interval_ms: u64,
    /// Remote endpoint credentials. Stored at the top level of the file.
    #[serde(flatten)]
    pub remote: TransferCredentials,
    /// Mail settings handed to the notifier.
    #[serde(flatten)]
    pub mail: MailSettings,
    /// Log output settings.
    pub log: LogSettings,
    /// Retry policy for remote uploads.
    pub retry: RetryConfig,
    /// Lock registry housekeeping.
    pub guard: GuardSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            remote: TransferCredentials::default(),
            mail: MailSettings::default(),
            log: LogSettings::default(),
            retry: RetryConfig::default(),
            guard: GuardSettings::default(),
        }
    }
}

impl AppSettings {
    /// Returns the polling interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Credentials and timeouts for the remote transfer endpoint.
///
/// `host`, `username`, and `password` may be given either in plain text or
/// base64-encoded. A value that decodes to valid UTF-8 is replaced by the
/// decoded text; anything else is kept as written.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferCredentials {
    /// Server host name or address.
    #[serde(
        rename = "sftp_host",
        alias = "SFTPUrl",
        deserialize_with = "lenient_base64"
    )]
    pub host: String,
    /// Login user.
    #[serde(
        rename = "sftp_user",
        alias = "UsuarioSFTP",
        deserialize_with = "lenient_base64"
    )]
    pub username: String,
    /// Login password.
    #[serde(
        rename = "sftp_password",
        alias = "Senha",
        deserialize_with = "lenient_base64"
    )]
    pub password: String,
    /// Server port.
    #[serde(rename = "sftp_port", alias = "Port")]
    pub port: u16,
    /// Seconds allowed for establishing the connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for any single remote operation.
    pub operation_timeout_secs: u64,
    /// Expected SHA-256 fingerprint of the server host key. Any key is accepted when unset.
    pub host_key_sha256: Option<String>,
}

impl Default for TransferCredentials {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            password: String::new(),
            port: 22,
            connect_timeout_secs: 30,
            operation_timeout_secs: 300,
            host_key_sha256: None,
        }
    }
}

impl TransferCredentials {
    /// Creates credentials with default port and timeouts.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Sets the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connection and operation timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect_secs: u64, operation_secs: u64) -> Self {
        self.connect_timeout_secs = connect_secs;
        self.operation_timeout_secs = operation_secs;
        self
    }

    /// Pins the server host key fingerprint.
    #[must_use]
    pub fn with_host_key_sha256(mut self, fingerprint: impl Into<String>) -> Self {
        self.host_key_sha256 = Some(fingerprint.into());
        self
    }

    /// Returns the connection-establishment timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the per-operation timeout.
    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Lists every configuration problem. Empty means usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.host.trim().is_empty() {
            issues.push("remote host is not configured".to_string());
        }
        if self.username.trim().is_empty() {
            issues.push("remote user is not configured".to_string());
        }
        if self.password.trim().is_empty() {
            issues.push("remote password is not configured".to_string());
        }
        if self.port == 0 {
            issues.push(format!("invalid remote port {}: must be between 1 and 65535", self.port));
        }
        issues
    }

    /// Returns true if [`validate`](Self::validate) finds no issues.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl std::fmt::Debug for TransferCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferCredentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("operation_timeout_secs", &self.operation_timeout_secs)
            .field("host_key_sha256", &self.host_key_sha256)
            .finish()
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default level directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
    /// Optional directory for `processlog.log`.
    pub directory: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
        }
    }
}

/// Housekeeping for the per-path lock registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSettings {
    /// Seconds an unheld lock may stay idle before it is swept.
    pub idle_ttl_secs: u64,
    /// Registry size that triggers an opportunistic sweep.
    pub sweep_threshold: usize,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            idle_ttl_secs: 600,
            sweep_threshold: 1024,
        }
    }
}

impl GuardSettings {
    /// Returns the idle TTL.
    #[must_use]
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }
}

/// Mail settings carried for an external mail notifier.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// Sender address.
    #[serde(rename = "mail_from", alias = "EMAIL_FROM")]
    pub from: String,
    /// SMTP host.
    #[serde(rename = "mail_host", alias = "EMAIL_HOST")]
    pub host: String,
    /// SMTP port.
    #[serde(rename = "mail_port", alias = "EMAIL_PORT")]
    pub port: u16,
    /// SMTP password, plain or base64.
    #[serde(
        rename = "mail_password",
        alias = "EMAIL_SENHA",
        deserialize_with = "lenient_base64"
    )]
    pub password: String,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("from", &self.from)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decodes a base64 value, keeping the literal when it is not base64 of UTF-8 text.
pub(crate) fn decode_lenient(raw: String) -> String {
    if raw.is_empty() {
        return raw;
    }
    match STANDARD.decode(raw.trim()) {
        Ok(bytes) => String::from_utf8(bytes).unwrap_or(raw),
        Err(_) => raw,
    }
}

fn lenient_base64<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(decode_lenient(raw))
}
