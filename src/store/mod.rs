//! Shared handle over the vector index and the embedding gateway.
//!
//! The store owns two collections, knowledge and changelog. Both are created
//! lazily on first use with the embedder's dimensionality, which forces the
//! model to load before the first query is answered.

pub mod payload;

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::{Config, IndexConfig};
use crate::embedding::LazyEmbedder;
use crate::error::AppError;
use crate::index::{self, CollectionSpec, Filter, PayloadSelector, Record, ScrollRequest, VectorIndex};

/// Shared store handle, as resolved from the DI context.
pub type AppStore = Arc<Store>;

/// Payload field carrying the knowledge category.
pub const CATEGORY_FIELD: &str = "category";

pub struct Store {
    index: Arc<dyn VectorIndex>,
    embedder: LazyEmbedder,
    knowledge_collection: String,
    changelog_collection: String,
    scan_limit: usize,
    page_size: usize,
    ready: OnceCell<()>,
}

impl Store {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: LazyEmbedder, config: &IndexConfig) -> Self {
        Self {
            index,
            embedder,
            knowledge_collection: config.knowledge_collection.clone(),
            changelog_collection: config.changelog_collection.clone(),
            scan_limit: config.scan_limit,
            page_size: config.page_size.max(1),
            ready: OnceCell::new(),
        }
    }

    /// Builds the configured index backend and a lazy embedder.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let index = index::connect(&config.index)?;
        let embedder = LazyEmbedder::from_config(config.embedding.clone());
        Ok(Self::new(index, embedder, &config.index))
    }

    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    pub fn knowledge_collection(&self) -> &str {
        &self.knowledge_collection
    }

    pub fn changelog_collection(&self) -> &str {
        &self.changelog_collection
    }

    /// Makes sure both collections exist. Runs once per process; a failure
    /// is returned to the caller and retried on the next call.
    pub async fn ready(&self) -> Result<(), AppError> {
        self.ready
            .get_or_try_init(|| async {
                let dimensions = self.dimensions().await?;

                let knowledge = CollectionSpec::cosine(dimensions).with_keyword_field(CATEGORY_FIELD);
                if self
                    .index
                    .ensure_collection(&self.knowledge_collection, &knowledge)
                    .await?
                {
                    tracing::info!(collection = %self.knowledge_collection, dimensions, "Created collection");
                }

                let changelog = CollectionSpec::cosine(dimensions);
                if self
                    .index
                    .ensure_collection(&self.changelog_collection, &changelog)
                    .await?
                {
                    tracing::info!(collection = %self.changelog_collection, dimensions, "Created collection");
                }

                Ok::<(), AppError>(())
            })
            .await
            .map(|_| ())
    }

    /// Embeds `text` on the blocking pool; model inference is CPU bound.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let embedder = self.embedder.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || embedder.embed(&text))
            .await
            .map_err(|e| AppError::Embedding(format!("Embedding task failed: {}", e)))?
    }

    async fn dimensions(&self) -> Result<usize, AppError> {
        let embedder = self.embedder.clone();
        tokio::task::spawn_blocking(move || embedder.dimensions())
            .await
            .map_err(|e| AppError::Embedding(format!("Embedding task failed: {}", e)))?
    }

    /// Reads a whole collection page by page, up to the configured scan limit.
    pub async fn scan(
        &self,
        collection: &str,
        filter: Option<Filter>,
        payload: PayloadSelector,
    ) -> Result<Vec<Record>, AppError> {
        let mut records = Vec::new();
        let mut offset = None;

        loop {
            let remaining = self.scan_limit.saturating_sub(records.len());
            if remaining == 0 {
                tracing::warn!(
                    collection,
                    scan_limit = self.scan_limit,
                    "Scan limit reached, results may be incomplete"
                );
                break;
            }

            let mut request = ScrollRequest::new(remaining.min(self.page_size))
                .offset(offset)
                .payload(payload.clone());
            if let Some(filter) = &filter {
                request = request.filter(filter.clone());
            }

            let page = self.index.scroll(collection, request).await?;
            records.extend(page.records);

            match page.next_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        tracing::debug!(collection, count = records.len(), "Scanned collection");
        Ok(records)
    }
}
