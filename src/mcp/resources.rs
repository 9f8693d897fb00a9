//! MCP resources: static reference docs and live views of the device.
//!
//! | Scheme | Source |
//! |--------|--------|
//! | `docs://` | Markdown bundled into the binary |
//! | `live://` | Commands run on the device at read time |
//! | `config://` | Service configuration read from the device |
//! | `logs://` | Recent log lines from the device |

use crate::remote::shell_escape;
use crate::services::DeviceService;

/// A resource advertised by the server.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDef {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const RESOURCES: &[ResourceDef] = &[
    ResourceDef {
        uri: "docs://hardware",
        name: "CM3588 hardware",
        description: "CM3588 NAS Kit specifications",
    },
    ResourceDef {
        uri: "docs://npu",
        name: "NPU (RKNN)",
        description: "RK3588 NPU and RKNN toolkit notes",
    },
    ResourceDef {
        uri: "docs://wyoming",
        name: "Wyoming protocol",
        description: "Wyoming services and default ports",
    },
    ResourceDef {
        uri: "docs://llm",
        name: "LLM on RK3588",
        description: "Running LLMs on the RK3588 NPU",
    },
    ResourceDef {
        uri: "live://system",
        name: "System status",
        description: "Uptime, memory, disk, temperature and load",
    },
    ResourceDef {
        uri: "live://services",
        name: "Docker containers",
        description: "Running Docker containers",
    },
    ResourceDef {
        uri: "live://npu",
        name: "NPU status",
        description: "NPU driver, load and RKNN packages",
    },
    ResourceDef {
        uri: "live://network",
        name: "Network",
        description: "IP addresses and listening ports",
    },
    ResourceDef {
        uri: "live://voice-pipeline",
        name: "Voice pipeline status",
        description: "Whisper, Piper and wake word containers and ports",
    },
    ResourceDef {
        uri: "live://llm",
        name: "LLM status",
        description: "LLM processes, packages and models",
    },
    ResourceDef {
        uri: "config://whisper",
        name: "Whisper configuration",
        description: "docker inspect of the whisper container",
    },
    ResourceDef {
        uri: "config://piper",
        name: "Piper configuration",
        description: "docker inspect of the piper container",
    },
    ResourceDef {
        uri: "config://docker-compose",
        name: "Docker Compose files",
        description: "Compose files found under /root and /home",
    },
    ResourceDef {
        uri: "logs://whisper",
        name: "Whisper logs",
        description: "Last 50 lines of Whisper logs",
    },
    ResourceDef {
        uri: "logs://piper",
        name: "Piper logs",
        description: "Last 50 lines of Piper logs",
    },
    ResourceDef {
        uri: "logs://system",
        name: "System logs",
        description: "Last 50 lines of the system journal",
    },
];

const HARDWARE_DOC: &str = include_str!("../../assets/docs/hardware.md");
const NPU_DOC: &str = include_str!("../../assets/docs/npu.md");
const WYOMING_DOC: &str = include_str!("../../assets/docs/wyoming.md");
const LLM_DOC: &str = include_str!("../../assets/docs/llm.md");

fn fenced(title: &str, lang: &str, body: &str) -> String {
    format!("# {}\n\n```{}\n{}\n```", title, lang, body)
}

/// Renders the resource at `uri`; `None` for an unknown URI.
pub async fn read(device: &DeviceService, uri: &str) -> Option<String> {
    let text = match uri {
        "docs://hardware" => HARDWARE_DOC.to_string(),
        "docs://npu" => NPU_DOC.to_string(),
        "docs://wyoming" => WYOMING_DOC.to_string(),
        "docs://llm" => LLM_DOC.to_string(),

        "live://system" => {
            let body = device
                .snapshot(&[
                    ("uptime", "uptime"),
                    ("memory", "free -h"),
                    ("disk", "df -h /"),
                    (
                        "cpu_temp",
                        "cat /sys/class/thermal/thermal_zone0/temp 2>/dev/null || echo 'N/A'",
                    ),
                    ("load", "cat /proc/loadavg"),
                ])
                .await;
            format!("# System Status\n\n{}", body)
        }
        "live://services" => {
            let out = device
                .run(
                    "docker ps --format 'table {{.Names}}\\t{{.Status}}\\t{{.Ports}}'",
                    None,
                )
                .await;
            fenced("Docker Containers", "", &out.stdout)
        }
        "live://npu" => {
            let body = device
                .snapshot(&[
                    (
                        "driver",
                        "cat /sys/kernel/debug/rknpu/version 2>/dev/null || echo 'N/A'",
                    ),
                    (
                        "load",
                        "cat /sys/kernel/debug/rknpu/load 2>/dev/null || echo 'N/A'",
                    ),
                    (
                        "rknn_packages",
                        "pip3 list 2>/dev/null | grep -i rknn || echo 'Not installed'",
                    ),
                ])
                .await;
            format!("# NPU Status\n\n{}", body)
        }
        "live://network" => {
            let body = device
                .snapshot(&[
                    ("IP Addresses", "ip -4 addr show | grep -E 'inet|^[0-9]'"),
                    ("Listening Ports", "ss -tlnp | head -20"),
                ])
                .await;
            format!("# Network\n\n{}", body)
        }
        "live://voice-pipeline" => {
            let body = device
                .snapshot(&[
                    (
                        "Containers",
                        "docker ps --filter 'name=whisper' --filter 'name=piper' \
                         --filter 'name=wake' --format '{{.Names}}: {{.Status}}'",
                    ),
                    ("Ports", "ss -tlnp | grep -E '1020|1030|1040'"),
                ])
                .await;
            format!("# Voice Pipeline Status\n\n{}", body)
        }
        "live://llm" => {
            let processes = device
                .run("ps aux | grep -E 'llama|rkllm|mlc' | grep -v grep", None)
                .await;
            let processes = if processes.stdout.trim().is_empty() {
                "No LLM processes running".to_string()
            } else {
                processes.stdout.trim().to_string()
            };
            let rest = device
                .snapshot(&[
                    (
                        "LLM Packages",
                        "pip3 list 2>/dev/null | grep -iE 'llama|mlc|rkllm' || echo 'No LLM packages'",
                    ),
                    (
                        "Models",
                        "ls -la /opt/models 2>/dev/null || ls -la ~/models 2>/dev/null \
                         || echo 'No models directory'",
                    ),
                ])
                .await;
            format!(
                "# LLM Status\n\n## LLM Processes\n```\n{}\n```\n\n{}",
                processes, rest
            )
        }

        "config://whisper" => {
            let out = device
                .run(
                    "docker inspect whisper 2>/dev/null | head -100 || echo 'Container not found'",
                    None,
                )
                .await;
            fenced("Whisper Configuration", "json", &out.stdout)
        }
        "config://piper" => {
            let out = device
                .run(
                    "docker inspect piper 2>/dev/null | head -100 || echo 'Container not found'",
                    None,
                )
                .await;
            fenced("Piper Configuration", "json", &out.stdout)
        }
        "config://docker-compose" => docker_compose_files(device).await,

        "logs://whisper" => {
            let out = device
                .run(
                    "docker logs whisper --tail 50 2>&1 || journalctl -u wyoming-whisper -n 50 2>/dev/null",
                    None,
                )
                .await;
            fenced("Whisper Logs (last 50)", "", &out.stdout)
        }
        "logs://piper" => {
            let out = device
                .run(
                    "docker logs piper --tail 50 2>&1 || journalctl -u wyoming-piper -n 50 2>/dev/null",
                    None,
                )
                .await;
            fenced("Piper Logs (last 50)", "", &out.stdout)
        }
        "logs://system" => {
            let out = device
                .run(
                    "journalctl -n 50 --no-pager 2>/dev/null || dmesg | tail -50",
                    None,
                )
                .await;
            fenced("System Logs (last 50)", "", &out.stdout)
        }

        _ => return None,
    };
    Some(text)
}

async fn docker_compose_files(device: &DeviceService) -> String {
    let found = device
        .run(
            "find /root /home \\( -name 'docker-compose*.yml' -o -name 'compose*.yml' \\) 2>/dev/null | head -5",
            None,
        )
        .await;

    let mut content = String::from("# Docker Compose Files\n\n");
    for path in found.stdout.lines().map(str::trim).filter(|p| !p.is_empty()) {
        let file = device
            .run(&format!("cat {} 2>/dev/null", shell_escape(path)), None)
            .await;
        content.push_str(&format!("## {}\n```yaml\n{}\n```\n\n", path, file.stdout));
    }
    content
}
