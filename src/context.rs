//! Application context providing dependency injection root.

use std::sync::Arc;

use crate::config::Config;
use crate::di::Context as ContextDerive;
use crate::error::AppError;
use crate::remote::{AppRemote, LazySshClient};
use crate::store::{AppStore, Store};

/// Root application context for dependency injection.
///
/// The Context holds all shared dependencies and uses `#[derive(Context)]`
/// to generate `FromRef` implementations for each field, enabling
/// compile-time dependency resolution. Nothing in here talks to the network
/// at construction time; the index, the model and the SSH session are all
/// set up on first use.
#[derive(ContextDerive, Clone)]
pub struct Context {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Knowledge and changelog store.
    pub store: AppStore,
    /// Command execution on the device.
    pub remote: AppRemote,
}

impl Context {
    /// Creates a new context with the given dependencies.
    pub fn new(config: Config, store: Store, remote: AppRemote) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            remote,
        }
    }

    /// Wires the configured index backend, a lazy embedder and a lazy SSH client.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let store = Store::from_config(&config)?;
        let remote: AppRemote = Arc::new(LazySshClient::new(config.ssh.clone()));
        Ok(Self::new(config, store, remote))
    }
}

#[cfg(test)]
impl Context {
    /// Memory index, hash embedder and the given executor.
    pub(crate) fn for_tests(remote: AppRemote) -> Self {
        use crate::config::{EmbeddingProvider, IndexBackend};

        let mut config = Config::default();
        config.index.backend = IndexBackend::Memory;
        config.embedding.provider = EmbeddingProvider::Hash;
        config.embedding.dimensions = 512;
        let store = Store::from_config(&config).unwrap();
        Self::new(config, store, remote)
    }
}
