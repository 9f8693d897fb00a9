//! Device tools - run commands and query state on the NAS over SSH.

use std::time::Duration;

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

use super::require;
use crate::error::AppError;
use crate::mcp::protocol::{self, Response};
use crate::mcp::server::McpServer;
use crate::services::DeviceService;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunCommandParams {
    /// Shell command to run on the device.
    pub command: String,
    /// Timeout in seconds (default from configuration).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RemotePathParams {
    /// Absolute path on the device.
    pub path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteRemoteFileParams {
    /// Absolute path on the device. An existing file is overwritten.
    pub path: String,
    /// Full file content.
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ServiceNameParams {
    /// systemd unit name, e.g. docker or wyoming-whisper.
    pub name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CheckPortParams {
    /// TCP port, e.g. 10300 for Whisper.
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct CheckPortResult {
    pub port: u16,
    pub listening: bool,
}

#[derive(Debug, Serialize)]
pub struct WriteRemoteFileResult {
    pub path: String,
    pub bytes: usize,
    pub written: bool,
}

#[tool_router(router = device_tools, vis = "pub(crate)")]
impl McpServer {
    /// Run a shell command on the device.
    ///
    /// Connection failures come back as exit code -1 with the reason in
    /// stderr, never as a tool error.
    #[tool(description = "Run a shell command on the CM3588 over SSH. Returns stdout, stderr, exit_code and success. Remember to log_change after modifying the device.")]
    pub async fn run_command(
        &self,
        Parameters(params): Parameters<RunCommandParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(command = %params.command, "Running run_command tool");

        require("command", &params.command)?;

        let output = self
            .resolve::<DeviceService>()
            .run(&params.command, params.timeout_secs.map(Duration::from_secs))
            .await;

        tracing::info!(exit_code = output.exit_code, "Command finished");
        Response::json(output).into()
    }

    #[tool(description = "Read a text file from the CM3588.")]
    pub async fn read_remote_file(
        &self,
        Parameters(params): Parameters<RemotePathParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(path = %params.path, "Running read_remote_file tool");

        let content = self
            .resolve::<DeviceService>()
            .read_file(&params.path)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        protocol::text(content)
    }

    /// Write a text file on the device over SFTP.
    #[tool(description = "Write a text file on the CM3588 over SFTP, replacing any existing file. Remember to log_change afterwards.")]
    pub async fn write_remote_file(
        &self,
        Parameters(params): Parameters<WriteRemoteFileParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(path = %params.path, bytes = params.content.len(), "Running write_remote_file tool");

        require("path", &params.path)?;

        self.resolve::<DeviceService>()
            .write_file(&params.path, &params.content)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response::json(WriteRemoteFileResult {
            bytes: params.content.len(),
            path: params.path,
            written: true,
        })
        .into()
    }

    #[tool(description = "Get CM3588 system info: CPU, memory, disk, NPU driver, CPU temperature, uptime.")]
    pub async fn get_system_info(&self) -> Result<CallToolResult, McpError> {
        tracing::info!("Running get_system_info tool");

        let info = self.resolve::<DeviceService>().system_info().await;
        Response::json(info).into()
    }

    #[tool(description = "Get the status of a systemd service on the CM3588.")]
    pub async fn get_service_status(
        &self,
        Parameters(params): Parameters<ServiceNameParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(name = %params.name, "Running get_service_status tool");

        require("name", &params.name)?;

        let status = self
            .resolve::<DeviceService>()
            .service_status(&params.name)
            .await;
        Response::json(status).into()
    }

    #[tool(description = "Check whether a TCP port is listening on the CM3588 (Wyoming: 10200 TTS, 10300 STT, 10400 wake word).")]
    pub async fn check_port(
        &self,
        Parameters(params): Parameters<CheckPortParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(port = params.port, "Running check_port tool");

        let listening = self.resolve::<DeviceService>().check_port(params.port).await;
        Response::json(CheckPortResult {
            port: params.port,
            listening,
        })
        .into()
    }
}
