//! Remote command execution on the device.
//!
//! - [`RemoteExecutor`] - the seam services depend on
//! - [`SshSession`] - one authenticated `ssh2` session (blocking)
//! - [`LazySshClient`] - connects on first use, reconnects after failures
//!
//! A command that cannot run at all is still answered with a
//! [`CommandOutput`] (exit code -1, the failure in `stderr`), so callers
//! only ever branch on `success`.

mod client;
mod lazy;
#[cfg(test)]
mod scripted;

pub use client::SshSession;
pub use lazy::LazySshClient;
#[cfg(test)]
pub(crate) use scripted::ScriptedRemote;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;

/// Shared executor handle, as resolved from the DI context.
pub type AppRemote = Arc<dyn RemoteExecutor>;

/// Exit code reported when the command never ran.
pub const NOT_RUN: i32 = -1;

/// Captured result of one remote command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

impl CommandOutput {
    pub fn from_exit(stdout: String, stderr: String, exit_code: i32) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            success: exit_code == 0,
        }
    }

    /// Output for a command that could not be run.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
            exit_code: NOT_RUN,
            success: false,
        }
    }
}

/// Runs shell commands and writes files on the device.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Runs `command` through the remote shell. `None` uses the configured
    /// command timeout. Never fails; see [`CommandOutput::failure`].
    async fn execute(&self, command: &str, timeout: Option<Duration>) -> CommandOutput;

    /// Creates or truncates `path` and writes `content` to it.
    async fn write_file(&self, path: &str, content: &str) -> Result<(), AppError>;
}

/// Single-quotes `s` for a POSIX shell.
pub fn shell_escape(s: &str) -> String {
    let escaped = s.replace('\'', "'\"'\"'");
    format!("'{}'", escaped)
}
