//! Embedding gateway: text in, fixed-size vector out.
//!
//! - [`Embedder`] - the contract every provider implements
//! - [`FastEmbedder`] - local ONNX models through fastembed
//! - [`HashEmbedder`] - deterministic feature hashing, no model download
//! - [`LazyEmbedder`] - process-wide handle that builds the configured
//!   provider on first use, exactly once

mod hash;
mod lazy;
mod onnx;

pub use hash::HashEmbedder;
pub use lazy::LazyEmbedder;
pub use onnx::FastEmbedder;

use std::sync::Arc;

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::error::AppError;

/// Produces dense vectors for text.
///
/// Output length is fixed for the lifetime of an instance and equals
/// [`dimensions`](Embedder::dimensions). Identical input yields identical
/// output within one instance; vectors from different models or model
/// versions are not comparable.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, AppError>;

    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;
}

/// Builds the provider selected in configuration. May download a model.
pub fn create_embedder(
    config: &EmbeddingConfig,
    show_download_progress: bool,
) -> Result<Arc<dyn Embedder>, AppError> {
    match config.provider {
        EmbeddingProvider::Fastembed => Ok(Arc::new(FastEmbedder::new(
            config,
            show_download_progress,
        )?)),
        EmbeddingProvider::Hash => Ok(Arc::new(HashEmbedder::new(config.dimensions)?)),
    }
}
