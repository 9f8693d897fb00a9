//! Vector index abstraction.
//!
//! A collection is a set of `(id, vector, payload)` points sharing one vector
//! size and similarity metric. The store talks to collections only through
//! [`VectorIndex`], so the same code runs against Qdrant in production and
//! against the in-process memory backend in tests.
//!
//! # Usage
//!
//! ```ignore
//! let index = index::connect(&config.index)?;
//! index.ensure_collection("notes", &CollectionSpec::cosine(384)).await?;
//! index.upsert("notes", Point { id, vector, payload }).await?;
//! let hits = index.search("notes", &query_vector, 5, Some(&Filter::field_equals("category", "npu"))).await?;
//! ```

mod traits;
mod types;

pub mod backends;

pub use traits::VectorIndex;
pub use types::{
    CollectionSpec, Distance, FieldCondition, Filter, Payload, PayloadSelector, Point, Record,
    ScoredPoint, ScrollPage, ScrollRequest,
};

use std::sync::Arc;

use crate::config::{IndexBackend, IndexConfig};
use crate::error::AppError;

/// Builds the configured backend. No network traffic happens here.
pub fn connect(config: &IndexConfig) -> Result<Arc<dyn VectorIndex>, AppError> {
    match config.backend {
        IndexBackend::Qdrant => Ok(Arc::new(backends::qdrant::QdrantIndex::new(config)?)),
        IndexBackend::Memory => Ok(Arc::new(backends::memory::MemoryIndex::new())),
    }
}
