//! SFTP endpoint over `russh` and `russh-sftp`.
//!
//! The SSH session is opened lazily on the first call and reused until
//! [`RemoteEndpoint::disconnect`] or until an operation fails at the
//! transport layer, in which case the next call reconnects.

use super::RemoteEndpoint;
use crate::config::TransferCredentials;
use crate::errors::TransferError;
use async_trait::async_trait;
use russh::client;
use russh::keys::{HashAlg, PublicKey};
use russh_sftp::client::error::Error as SftpError;
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::StatusCode;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Verifies the server host key against an optional pinned fingerprint.
struct HostKeyCheck {
    expected_sha256: Option<String>,
}

impl client::Handler for HostKeyCheck {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        let Some(expected) = self.expected_sha256.as_deref() else {
            return Ok(true);
        };
        let actual = server_public_key.fingerprint(HashAlg::Sha256).to_string();
        let expected = expected.trim();
        let matches = actual == expected
            || actual.strip_prefix("SHA256:").is_some_and(|digest| digest == expected);
        if !matches {
            warn!(%actual, "Server host key does not match the pinned fingerprint");
        }
        Ok(matches)
    }
}

struct Connection {
    handle: client::Handle<HostKeyCheck>,
    sftp: SftpSession,
}

/// [`RemoteEndpoint`] backed by an SFTP session.
pub struct SftpEndpoint {
    credentials: TransferCredentials,
    connection: Mutex<Option<Connection>>,
}

impl SftpEndpoint {
    /// Creates an endpoint. No connection is made until the first call.
    #[must_use]
    pub fn new(credentials: TransferCredentials) -> Self {
        Self {
            credentials,
            connection: Mutex::new(None),
        }
    }

    /// Returns the credentials.
    #[must_use]
    pub fn credentials(&self) -> &TransferCredentials {
        &self.credentials
    }

    async fn connect(&self) -> Result<Connection, TransferError> {
        let issues = self.credentials.validate();
        if !issues.is_empty() {
            return Err(TransferError::NotConfigured(issues.join(", ")));
        }

        let creds = &self.credentials;
        let target = format!("{}:{}", creds.host, creds.port);
        let config = Arc::new(client::Config {
            inactivity_timeout: Some(creds.operation_timeout()),
            ..Default::default()
        });
        let handler = HostKeyCheck {
            expected_sha256: creds.host_key_sha256.clone(),
        };

        debug!(%target, "Opening SSH session");
        let mut handle = within(
            creds.connect_timeout(),
            &target,
            client::connect(config, (creds.host.clone(), creds.port), handler),
        )
        .await?
        .map_err(map_ssh_error)?;

        let auth = within(
            creds.connect_timeout(),
            &target,
            handle.authenticate_password(creds.username.clone(), creds.password.clone()),
        )
        .await?
        .map_err(map_ssh_error)?;
        if !auth.success() {
            return Err(TransferError::Authentication(format!(
                "server rejected the password for user '{}'",
                creds.username
            )));
        }

        let channel = within(creds.connect_timeout(), &target, handle.channel_open_session())
            .await?
            .map_err(map_ssh_error)?;
        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(map_ssh_error)?;
        let sftp = within(
            creds.connect_timeout(),
            &target,
            SftpSession::new(channel.into_stream()),
        )
        .await?
        .map_err(map_sftp_error)?;

        info!(%target, user = %creds.username, "SFTP session established");
        Ok(Connection { handle, sftp })
    }

    async fn ensure_connected<'a>(
        &self,
        slot: &'a mut Option<Connection>,
    ) -> Result<&'a Connection, TransferError> {
        if slot.is_none() {
            *slot = Some(self.connect().await?);
        }
        slot.as_ref()
            .ok_or_else(|| TransferError::Transport("SFTP session unavailable".to_string()))
    }

    /// Drops the cached session when `result` shows it is no longer usable.
    fn settle<T>(
        slot: &mut Option<Connection>,
        result: Result<T, TransferError>,
    ) -> Result<T, TransferError> {
        if let Err(err) = &result {
            if err.breaks_session() && slot.take().is_some() {
                debug!(error = %err, "Discarding broken SFTP session");
            }
        }
        result
    }
}

impl std::fmt::Debug for SftpEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SftpEndpoint")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RemoteEndpoint for SftpEndpoint {
    async fn exists(&self, path: &str) -> Result<bool, TransferError> {
        let mut slot = self.connection.lock().await;
        let conn = self.ensure_connected(&mut slot).await?;
        let result = within(self.credentials.operation_timeout(), path, conn.sftp.try_exists(path))
            .await
            .and_then(|res| res.map_err(map_sftp_error));
        Self::settle(&mut slot, result)
    }

    async fn file_size(&self, path: &str) -> Result<Option<u64>, TransferError> {
        let mut slot = self.connection.lock().await;
        let conn = self.ensure_connected(&mut slot).await?;
        let result = within(self.credentials.operation_timeout(), path, conn.sftp.metadata(path))
            .await
            .and_then(|res| match res.map_err(map_sftp_error) {
                Ok(meta) => Ok(Some(meta.size.unwrap_or_default())),
                Err(TransferError::NotFound(_)) => Ok(None),
                Err(err) => Err(err),
            });
        Self::settle(&mut slot, result)
    }

    async fn create_dir(&self, path: &str) -> Result<(), TransferError> {
        let mut slot = self.connection.lock().await;
        let conn = self.ensure_connected(&mut slot).await?;
        let result = within(self.credentials.operation_timeout(), path, conn.sftp.create_dir(path))
            .await
            .and_then(|res| res.map_err(map_sftp_error));
        Self::settle(&mut slot, result)
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<u64, TransferError> {
        let mut source = tokio::fs::File::open(local).await?;

        let mut slot = self.connection.lock().await;
        let conn = self.ensure_connected(&mut slot).await?;
        let transfer = async {
            let mut target = conn.sftp.create(remote).await.map_err(map_sftp_error)?;
            let written = tokio::io::copy(&mut source, &mut target).await?;
            target.shutdown().await?;
            Ok::<u64, TransferError>(written)
        };
        let result = within(self.credentials.operation_timeout(), remote, transfer)
            .await
            .and_then(|res| res);
        Self::settle(&mut slot, result)
    }

    async fn disconnect(&self) {
        let Some(conn) = self.connection.lock().await.take() else {
            return;
        };
        if let Err(err) = conn.sftp.close().await {
            debug!(error = %err, "Closing SFTP subsystem failed");
        }
        if let Err(err) = conn
            .handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
        {
            debug!(error = %err, "Closing SSH session failed");
        }
    }
}

async fn within<F: Future>(
    limit: std::time::Duration,
    what: &str,
    fut: F,
) -> Result<F::Output, TransferError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| TransferError::Timeout(format!("'{what}' did not complete within {limit:?}")))
}

fn map_ssh_error(err: russh::Error) -> TransferError {
    match err {
        russh::Error::UnknownKey => TransferError::HostKey(err.to_string()),
        russh::Error::NotAuthenticated => TransferError::Authentication(err.to_string()),
        other => TransferError::Transport(other.to_string()),
    }
}

fn map_sftp_error(err: SftpError) -> TransferError {
    match err {
        SftpError::Timeout => TransferError::Timeout("SFTP request timed out".to_string()),
        SftpError::IO(msg) => TransferError::Io(msg),
        SftpError::Status(status) => {
            let message = status.error_message.clone();
            match status.status_code {
                StatusCode::NoSuchFile => TransferError::NotFound(message),
                StatusCode::PermissionDenied => TransferError::PermissionDenied(message),
                StatusCode::ConnectionLost | StatusCode::NoConnection => {
                    TransferError::Transport(message)
                }
                _ => TransferError::Protocol(message),
            }
        }
        other => TransferError::Transport(other.to_string()),
    }
}
