//! Lazily-initialized embedder for dependency injection.
//!
//! Loading a model takes seconds, so the process only pays for it on the
//! first embedding request. The handle is cheap to clone; all clones share
//! one cell, so concurrent first use still loads the model once.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::{create_embedder, Embedder};
use crate::config::EmbeddingConfig;
use crate::error::AppError;

type Factory = dyn Fn() -> Result<Arc<dyn Embedder>, AppError> + Send + Sync;

/// Lazily-initialized embedder.
///
/// # Example
///
/// ```ignore
/// let lazy = LazyEmbedder::from_config(config.embedding.clone());
///
/// // Model loads here
/// let vector = lazy.embed("whisper port")?;
/// ```
#[derive(Clone)]
pub struct LazyEmbedder {
    cell: Arc<OnceCell<Arc<dyn Embedder>>>,
    factory: Arc<Factory>,
}

impl LazyEmbedder {
    /// Build the configured provider on first use.
    pub fn from_config(config: EmbeddingConfig) -> Self {
        Self::with_factory(move || create_embedder(&config, false))
    }

    /// Use `factory` to build the embedder on first use.
    ///
    /// A factory error is returned to the caller and not cached; the next
    /// call runs the factory again.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Embedder>, AppError> + Send + Sync + 'static,
    {
        Self {
            cell: Arc::new(OnceCell::new()),
            factory: Arc::new(factory),
        }
    }

    /// Wrap an embedder that is already loaded.
    pub fn ready(embedder: Arc<dyn Embedder>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Arc::clone(&embedder));
        Self {
            cell: Arc::new(cell),
            factory: Arc::new(move || Ok(Arc::clone(&embedder))),
        }
    }

    /// The underlying embedder, loading it if needed.
    pub fn get(&self) -> Result<&Arc<dyn Embedder>, AppError> {
        self.cell.get_or_try_init(|| {
            tracing::info!("Initializing embedding gateway");
            (self.factory)()
        })
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        self.get()?.embed(text)
    }

    /// Output dimensionality. Forces initialization.
    pub fn dimensions(&self) -> Result<usize, AppError> {
        Ok(self.get()?.dimensions())
    }

    /// Whether the model has been loaded. Does not trigger loading.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
