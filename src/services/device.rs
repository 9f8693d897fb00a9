//! Device service: typed queries against the NAS over the remote executor.

use std::time::Duration;

use serde::Serialize;

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::remote::{shell_escape, AppRemote, CommandOutput};

/// Snapshot of basic system health. A field is absent when its command failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_percent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npu_driver: Option<String>,
    /// Degrees Celsius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
}

/// State of a systemd unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub name: String,
    pub active: bool,
    /// `systemctl status` output, or its error output.
    pub status: String,
}

#[derive(FromContext, Clone)]
pub struct DeviceService {
    remote: AppRemote,
}

impl DeviceService {
    /// Runs an arbitrary command.
    pub async fn run(&self, command: &str, timeout: Option<Duration>) -> CommandOutput {
        self.remote.execute(command, timeout).await
    }

    async fn stdout_of(&self, command: &str) -> Option<String> {
        let output = self.remote.execute(command, None).await;
        output.success.then_some(output.stdout)
    }

    pub async fn read_file(&self, path: &str) -> Result<String, AppError> {
        let output = self
            .remote
            .execute(&format!("cat {}", shell_escape(path)), None)
            .await;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(AppError::Remote(format!(
                "Cannot read {}: {}",
                path,
                output.stderr.trim()
            )))
        }
    }

    pub async fn file_exists(&self, path: &str) -> bool {
        let output = self
            .remote
            .execute(&format!("test -e {} && echo 'exists'", shell_escape(path)), None)
            .await;
        output.stdout.contains("exists")
    }

    pub async fn write_file(&self, path: &str, content: &str) -> Result<(), AppError> {
        self.remote.write_file(path, content).await?;
        tracing::info!(path, bytes = content.len(), "Wrote remote file");
        Ok(())
    }

    pub async fn system_info(&self) -> SystemInfo {
        let mut info = SystemInfo::default();

        if let Some(out) = self
            .stdout_of("cat /proc/cpuinfo | grep 'model name' | head -1")
            .await
        {
            info.cpu = Some(match out.rsplit_once(':') {
                Some((_, model)) => model.trim().to_string(),
                None => "RK3588".to_string(),
            });
        }

        if let Some(out) = self.stdout_of("free -h | grep Mem").await {
            let parts: Vec<&str> = out.split_whitespace().collect();
            info.memory_total = parts.get(1).map(|s| s.to_string());
            info.memory_used = parts.get(2).map(|s| s.to_string());
        }

        if let Some(out) = self.stdout_of("df -h / | tail -1").await {
            let parts: Vec<&str> = out.split_whitespace().collect();
            if parts.len() >= 5 {
                info.disk_total = Some(parts[1].to_string());
                info.disk_used = Some(parts[2].to_string());
                info.disk_percent = Some(parts[4].to_string());
            }
        }

        info.npu_driver = self
            .stdout_of("cat /sys/kernel/debug/rknpu/version 2>/dev/null || echo 'N/A'")
            .await
            .map(|s| s.trim().to_string());

        info.cpu_temp = self
            .stdout_of("cat /sys/class/thermal/thermal_zone0/temp 2>/dev/null")
            .await
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(|millis| millis as f64 / 1000.0);

        info.uptime = self
            .stdout_of("uptime -p")
            .await
            .map(|s| s.trim().to_string());

        info
    }

    pub async fn service_status(&self, name: &str) -> ServiceStatus {
        let unit = shell_escape(name);
        let active = self
            .remote
            .execute(&format!("systemctl is-active {}", unit), None)
            .await;
        let status = self
            .remote
            .execute(&format!("systemctl status {} --no-pager -l", unit), None)
            .await;

        ServiceStatus {
            name: name.to_string(),
            active: active.stdout.trim() == "active",
            status: if status.success {
                status.stdout
            } else {
                status.stderr
            },
        }
    }

    /// Whether anything listens on TCP `port`.
    pub async fn check_port(&self, port: u16) -> bool {
        let output = self
            .remote
            .execute(&format!("ss -tlnp | grep :{}", port), None)
            .await;
        !output.stdout.trim().is_empty()
    }

    /// Runs each `(label, command)` and renders the outputs as markdown sections.
    pub async fn snapshot(&self, commands: &[(&str, &str)]) -> String {
        let mut sections = Vec::with_capacity(commands.len());
        for (label, command) in commands {
            let output = self.remote.execute(command, None).await;
            sections.push(format!("## {}\n```\n{}\n```", label, output.stdout.trim()));
        }
        sections.join("\n\n")
    }
}
