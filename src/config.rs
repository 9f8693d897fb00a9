//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. Built-in defaults
//! 2. User config: `~/.config/cm3588-mcp/config.toml` (XDG) or platform config dir
//! 3. Project config: `.cm3588-mcp.toml`
//! 4. Legacy environment variables (`CM3588_HOST`, `CM3588_USER`, `CM3588_SSH_KEY`,
//!    `CM3588_PASSWORD`, `QDRANT_URL`, `EMBEDDING_MODEL`)
//! 5. Environment variables: `CM3588_*`, nested with `__` (`CM3588_SSH__HOST`)
//!
//! # Example
//!
//! ```toml
//! [ssh]
//! host = "192.168.1.50"
//! key_path = "~/.ssh/id_ed25519"
//!
//! [index]
//! backend = "qdrant"
//! url = "http://localhost:6333"
//!
//! [embedding]
//! provider = "fastembed"
//! model = "Xenova/paraphrase-multilingual-MiniLM-L12-v2"
//! ```

use std::ops::Deref;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = ".cm3588-mcp.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "CM3588_";

/// Variable names understood by earlier deployments, mapped to their key path.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("CM3588_HOST", "ssh.host"),
    ("CM3588_USER", "ssh.user"),
    ("CM3588_SSH_KEY", "ssh.key_path"),
    ("CM3588_PASSWORD", "ssh.password"),
    ("QDRANT_URL", "index.url"),
    ("EMBEDDING_MODEL", "embedding.model"),
];

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ssh: SshConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
}

/// SSH connection to the device.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Hostname or IP of the device. Device tools fail (as data) while empty.
    pub host: String,
    pub user: String,
    pub port: u16,
    /// Private key file; `~` is expanded. Takes precedence over `password`.
    pub key_path: Option<String>,
    pub password: Option<String>,
    pub connect_timeout_secs: u64,
    /// Default per-command timeout when a caller does not pass one.
    pub command_timeout_secs: u64,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            user: "root".to_string(),
            port: 22,
            key_path: None,
            password: None,
            connect_timeout_secs: 10,
            command_timeout_secs: 30,
        }
    }
}

impl SshConfig {
    /// Key path with a leading `~` replaced by the home directory.
    pub fn resolved_key_path(&self) -> Option<PathBuf> {
        let raw = self.key_path.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None if raw == "~" => dirs::home_dir(),
            None => Some(PathBuf::from(raw)),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Which vector index implementation backs the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Qdrant over its REST API.
    #[default]
    Qdrant,
    /// In-process index; contents are lost on exit.
    Memory,
}

/// Vector index configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    /// Base URL of the Qdrant REST API.
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub knowledge_collection: String,
    pub changelog_collection: String,
    /// Upper bound on records visited by full scans (categories, changelog).
    pub scan_limit: usize,
    /// Records fetched per scroll request during a scan.
    pub page_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Qdrant,
            url: "http://localhost:6333".to_string(),
            api_key: None,
            timeout_secs: 60,
            knowledge_collection: "cm3588_knowledge".to_string(),
            changelog_collection: "cm3588_changelog".to_string(),
            scan_limit: 10_000,
            page_size: 256,
        }
    }
}

impl IndexConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Embedding provider selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local ONNX model through fastembed.
    #[default]
    Fastembed,
    /// Deterministic feature hashing, no model download.
    Hash,
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    /// Model identifier (e.g., "Xenova/paraphrase-multilingual-MiniLM-L12-v2").
    pub model: String,
    /// Vector size for the hash provider. Fastembed models report their own.
    pub dimensions: usize,
    /// Model cache directory. Falls back to `FASTEMBED_CACHE_DIR`, then fastembed's default.
    pub cache_dir: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Fastembed,
            model: "Xenova/paraphrase-multilingual-MiniLM-L12-v2".to_string(),
            dimensions: 384,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// The layered figment without extracting it.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file(Self::user_config_path()))
            .merge(Toml::file(PROJECT_CONFIG_FILE))
            .merge(Self::legacy_env())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn legacy_env() -> Env {
        let names: Vec<&str> = LEGACY_ENV.iter().map(|(name, _)| *name).collect();
        Env::raw().only(&names).map(|key| {
            LEGACY_ENV
                .iter()
                .find(|(name, _)| key == *name)
                .map(|(_, path)| *path)
                .unwrap_or_default()
                .into()
        })
    }

    /// User config path: ~/.config/cm3588-mcp/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("cm3588-mcp").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("cm3588-mcp").join("config.toml"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_any_source() {
        Jail::expect_with(|jail| {
            let home = jail.directory().display().to_string();
            jail.set_env("HOME", home);
            let config: Config = Config::figment().extract()?;

            assert_eq!(config.ssh.user, "root");
            assert_eq!(config.ssh.port, 22);
            assert_eq!(config.index.backend, IndexBackend::Qdrant);
            assert_eq!(config.index.knowledge_collection, "cm3588_knowledge");
            assert_eq!(config.index.changelog_collection, "cm3588_changelog");
            assert_eq!(config.embedding.provider, EmbeddingProvider::Fastembed);
            Ok(())
        });
    }

    #[test]
    fn test_project_file_then_env_override() {
        Jail::expect_with(|jail| {
            let home = jail.directory().display().to_string();
            jail.set_env("HOME", home);
            jail.create_file(
                PROJECT_CONFIG_FILE,
                r#"
                [ssh]
                host = "nas.local"
                port = 2222

                [index]
                backend = "memory"
                scan_limit = 50
                "#,
            )?;
            jail.set_env("CM3588_SSH__HOST", "10.0.0.7");
            jail.set_env("CM3588_EMBEDDING__PROVIDER", "hash");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.ssh.host, "10.0.0.7");
            assert_eq!(config.ssh.port, 2222);
            assert_eq!(config.index.backend, IndexBackend::Memory);
            assert_eq!(config.index.scan_limit, 50);
            assert_eq!(config.embedding.provider, EmbeddingProvider::Hash);
            Ok(())
        });
    }

    #[test]
    fn test_legacy_env_names() {
        Jail::expect_with(|jail| {
            let home = jail.directory().display().to_string();
            jail.set_env("HOME", home);
            jail.set_env("CM3588_HOST", "192.168.1.50");
            jail.set_env("CM3588_SSH_KEY", "/keys/nas");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.ssh.host, "192.168.1.50");
            assert_eq!(config.ssh.key_path.as_deref(), Some("/keys/nas"));
            Ok(())
        });
    }

    #[test]
    fn test_key_path_tilde_expansion() {
        let ssh = SshConfig {
            key_path: Some("~/.ssh/id_ed25519".to_string()),
            ..SshConfig::default()
        };
        let resolved = ssh.resolved_key_path().unwrap();
        assert!(resolved.ends_with(".ssh/id_ed25519"));
        assert!(!resolved.to_string_lossy().starts_with('~'));

        let blank = SshConfig {
            key_path: Some("  ".to_string()),
            ..SshConfig::default()
        };
        assert!(blank.resolved_key_path().is_none());
    }
}
