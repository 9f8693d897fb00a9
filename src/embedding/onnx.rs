//! Local ONNX embeddings via fastembed.

use std::path::PathBuf;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::Embedder;
use crate::config::EmbeddingConfig;
use crate::error::AppError;

/// Sentence-transformer style model running in-process.
pub struct FastEmbedder {
    model: TextEmbedding,
    model_name: String,
    dimensions: usize,
}

impl FastEmbedder {
    /// Resolve the configured model and load it, downloading on first use.
    pub fn new(config: &EmbeddingConfig, show_download_progress: bool) -> Result<Self, AppError> {
        let (model, model_name, dimensions) = resolve_model(&config.model)?;

        let mut options =
            InitOptions::new(model).with_show_download_progress(show_download_progress);
        if let Some(dir) = cache_dir(config) {
            options = options.with_cache_dir(dir);
        }

        tracing::info!(model = %model_name, dimensions, "Loading embedding model");
        let model = TextEmbedding::try_new(options)
            .map_err(|e| AppError::Embedding(format!("failed to load {}: {}", model_name, e)))?;
        tracing::info!(model = %model_name, "Embedding model ready");

        Ok(Self {
            model,
            model_name,
            dimensions,
        })
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let mut vectors = self
            .model
            .embed(vec![text], None)
            .map_err(|e| AppError::Embedding(e.to_string()))?;

        vectors
            .pop()
            .ok_or_else(|| AppError::Embedding("model returned no vector".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn cache_dir(config: &EmbeddingConfig) -> Option<PathBuf> {
    config
        .cache_dir
        .clone()
        .or_else(|| std::env::var("FASTEMBED_CACHE_DIR").ok())
        .map(PathBuf::from)
}

/// Match a model name against fastembed's catalogue.
///
/// Accepts the exact model code in any case, or only the part after the last
/// `/`, so `sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2` finds
/// the `Xenova/...` export of the same model.
fn resolve_model(name: &str) -> Result<(EmbeddingModel, String, usize), AppError> {
    let wanted = name.trim();
    let wanted_short = short_name(wanted);
    let supported = TextEmbedding::list_supported_models();

    let found = supported
        .iter()
        .find(|info| info.model_code.eq_ignore_ascii_case(wanted))
        .or_else(|| {
            supported
                .iter()
                .find(|info| short_name(&info.model_code).eq_ignore_ascii_case(wanted_short))
        });

    match found {
        Some(info) => Ok((info.model.clone(), info.model_code.clone(), info.dim)),
        None => Err(AppError::Embedding(format!(
            "unsupported embedding model '{}'",
            name
        ))),
    }
}

fn short_name(code: &str) -> &str {
    code.rsplit('/').next().unwrap_or(code)
}
