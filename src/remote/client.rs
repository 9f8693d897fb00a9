//! Blocking SSH session over `ssh2`.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use ssh2::Session;

use super::CommandOutput;
use crate::config::SshConfig;
use crate::error::AppError;

fn remote_err(context: &str, err: impl std::fmt::Display) -> AppError {
    AppError::Remote(format!("{}: {}", context, err))
}

/// An authenticated SSH session to the device.
///
/// All methods block; call them from `spawn_blocking`.
pub struct SshSession {
    session: Session,
}

impl SshSession {
    /// Opens a TCP connection, performs the handshake and authenticates.
    ///
    /// Authentication uses the key file when one is configured and present,
    /// otherwise the password, otherwise the ssh-agent.
    pub fn connect(config: &SshConfig) -> Result<Self, AppError> {
        if config.host.trim().is_empty() {
            return Err(AppError::Remote("SSH host is not configured".to_string()));
        }

        let addr = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| remote_err("Cannot resolve host", e))?
            .next()
            .ok_or_else(|| AppError::Remote(format!("No address for {}", config.host)))?;

        let tcp = TcpStream::connect_timeout(&addr, config.connect_timeout())
            .map_err(|e| remote_err("Connection failed", e))?;

        let mut session = Session::new().map_err(|e| remote_err("Session setup failed", e))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(millis(config.connect_timeout()));
        session
            .handshake()
            .map_err(|e| remote_err("SSH handshake failed", e))?;

        let user = config.user.as_str();
        let auth = match (config.resolved_key_path(), config.password.as_deref()) {
            (Some(key), _) if key.exists() => {
                tracing::debug!(key = %key.display(), "Authenticating with key file");
                session.userauth_pubkey_file(user, None, &key, None)
            }
            (_, Some(password)) => {
                tracing::debug!("Authenticating with password");
                session.userauth_password(user, password)
            }
            _ => {
                tracing::debug!("Authenticating with ssh-agent");
                session.userauth_agent(user)
            }
        };
        auth.map_err(|e| remote_err("Authentication failed", e))?;

        if !session.authenticated() {
            return Err(AppError::Remote(format!(
                "Authentication failed for {}@{}",
                user, config.host
            )));
        }

        tracing::info!(host = %config.host, port = config.port, user, "SSH session established");
        Ok(Self { session })
    }

    /// Runs `command` and collects its output and exit status.
    pub fn exec(&self, command: &str, timeout: Duration) -> Result<CommandOutput, AppError> {
        self.session.set_timeout(millis(timeout));

        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| remote_err("Cannot open channel", e))?;
        channel
            .exec(command)
            .map_err(|e| remote_err("Cannot start command", e))?;

        // Both streams are read together; a full stderr window would
        // otherwise stall the remote while stdout is still open.
        self.session.set_blocking(false);
        let drained = drain_streams(
            &mut channel.stream(0),
            &mut channel.stderr(),
            Instant::now() + timeout,
        );
        self.session.set_blocking(true);
        let (stdout, stderr) = drained.map_err(|e| remote_err("Reading output failed", e))?;

        channel
            .wait_close()
            .map_err(|e| remote_err("Closing channel failed", e))?;
        let exit_code = channel
            .exit_status()
            .map_err(|e| remote_err("No exit status", e))?;

        Ok(CommandOutput::from_exit(
            String::from_utf8_lossy(&stdout).into_owned(),
            String::from_utf8_lossy(&stderr).into_owned(),
            exit_code,
        ))
    }

    /// Writes `content` to `path` over SFTP, truncating an existing file.
    pub fn write_file(&self, path: &str, content: &str) -> Result<(), AppError> {
        let sftp = self
            .session
            .sftp()
            .map_err(|e| remote_err("Cannot start SFTP", e))?;
        let mut file = sftp
            .create(Path::new(path))
            .map_err(|e| remote_err(&format!("Cannot create {}", path), e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| remote_err(&format!("Cannot write {}", path), e))?;
        Ok(())
    }
}

/// Reads `stdout` and `stderr` in turn until both report end of stream.
///
/// The readers are expected to be non-blocking: `WouldBlock` means no data yet.
fn drain_streams(
    stdout: &mut impl Read,
    stderr: &mut impl Read,
    deadline: Instant,
) -> io::Result<(Vec<u8>, Vec<u8>)> {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let (mut out_done, mut err_done) = (false, false);
    let mut buf = [0u8; 8192];

    while !(out_done && err_done) {
        let mut progressed = false;
        for (reader, sink, done) in [
            (&mut *stdout as &mut dyn Read, &mut out, &mut out_done),
            (&mut *stderr as &mut dyn Read, &mut err, &mut err_done),
        ] {
            if *done {
                continue;
            }
            match reader.read(&mut buf) {
                Ok(0) => *done = true,
                Ok(n) => {
                    sink.extend_from_slice(&buf[..n]);
                    progressed = true;
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => progressed = true,
                Err(e) => return Err(e),
            }
        }

        if !progressed && !(out_done && err_done) {
            if Instant::now() >= deadline {
                return Err(io::Error::new(ErrorKind::TimedOut, "command timed out"));
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    Ok((out, err))
}

/// libssh2 takes milliseconds as u32; 0 would mean "no timeout".
fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX).max(1)
}
