//! Core trait for vector index backends.

use async_trait::async_trait;

use super::types::{CollectionSpec, Filter, Point, Record, ScoredPoint, ScrollPage, ScrollRequest};
use crate::error::AppError;

/// Stores points in named collections and answers nearest-neighbor queries.
///
/// Implementations must report an unreachable service as
/// [`AppError::IndexUnavailable`] and any other service failure as
/// [`AppError::Index`]. A missing point id is never an error.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Creates the collection unless it exists. Returns `true` if created.
    ///
    /// Keyword indexes listed in `spec` are created together with a new
    /// collection; an existing collection is left untouched.
    async fn ensure_collection(&self, name: &str, spec: &CollectionSpec)
        -> Result<bool, AppError>;

    /// Inserts or fully replaces the point with the same id.
    ///
    /// Vector and payload land together or not at all.
    async fn upsert(&self, collection: &str, point: Point) -> Result<(), AppError>;

    /// Up to `limit` points by descending similarity to `vector`,
    /// restricted to payloads matching `filter`.
    ///
    /// Order among equal scores is backend-defined.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<ScoredPoint>, AppError>;

    /// Point lookup by id.
    async fn retrieve(&self, collection: &str, id: &str) -> Result<Option<Record>, AppError>;

    /// One page of points in the backend's native order.
    async fn scroll(&self, collection: &str, request: ScrollRequest)
        -> Result<ScrollPage, AppError>;

    /// Removes the point. Deleting a missing id succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError>;
}
