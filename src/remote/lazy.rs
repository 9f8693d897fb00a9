//! Lazy-connecting SSH client for dependency injection.
//!
//! The device may be offline when the server starts, so nothing connects
//! until the first command. A session that fails is dropped; the next call
//! reconnects from scratch.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::{CommandOutput, RemoteExecutor, SshSession};
use crate::config::SshConfig;
use crate::error::AppError;

/// Lazy-connecting SSH client.
///
/// # Example
///
/// ```ignore
/// let ssh = LazySshClient::new(config.ssh.clone());
///
/// // Connection happens here
/// let output = ssh.execute("uptime -p", None).await;
/// ```
#[derive(Clone)]
pub struct LazySshClient {
    config: Arc<SshConfig>,
    inner: Arc<Mutex<Option<SshSession>>>,
}

impl LazySshClient {
    /// No connection is attempted until the first command.
    pub fn new(config: SshConfig) -> Self {
        Self {
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Runs `f` with a connected session, connecting first if needed.
    ///
    /// Blocks. Any error drops the session.
    pub fn with_session<F, R>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&SshSession) -> Result<R, AppError>,
    {
        let mut guard = self.lock()?;

        let session = match guard.take() {
            Some(session) => session,
            None => {
                tracing::debug!(host = %self.config.host, "SSH not connected, connecting");
                SshSession::connect(&self.config)?
            }
        };

        let result = f(&session);
        match &result {
            Ok(_) => *guard = Some(session),
            Err(err) => tracing::warn!(error = %err, "Dropping SSH session after failure"),
        }
        result
    }

    /// Whether a session is currently open. Does not connect.
    pub fn is_connected(&self) -> bool {
        self.inner.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<SshSession>>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::Remote("SSH session lock poisoned".to_string()))
    }
}

#[async_trait]
impl RemoteExecutor for LazySshClient {
    async fn execute(&self, command: &str, timeout: Option<Duration>) -> CommandOutput {
        let client = self.clone();
        let command = command.to_string();
        let timeout = timeout.unwrap_or_else(|| self.config.command_timeout());

        tracing::debug!(command = %command, "Executing remote command");
        let joined = tokio::task::spawn_blocking(move || {
            client.with_session(|session| session.exec(&command, timeout))
        })
        .await;

        match joined {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => CommandOutput::failure(err.to_string()),
            Err(err) => CommandOutput::failure(format!("SSH task failed: {}", err)),
        }
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), AppError> {
        let client = self.clone();
        let path = path.to_string();
        let content = content.to_string();

        tokio::task::spawn_blocking(move || {
            client.with_session(|session| session.write_file(&path, &content))
        })
        .await
        .map_err(|e| AppError::Remote(format!("SSH task failed: {}", e)))?
    }
}
