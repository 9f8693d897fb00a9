//! In-process index with brute-force cosine search.
//!
//! Points are kept in insertion order; an upsert of an existing id replaces
//! it in place. Scroll offsets are positions in that order.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::index::{
    CollectionSpec, Filter, Point, Record, ScoredPoint, ScrollPage, ScrollRequest, VectorIndex,
};

struct Collection {
    dimensions: usize,
    points: Vec<Point>,
}

/// Vector index held entirely in memory.
#[derive(Default)]
pub struct MemoryIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(collection: &str) -> AppError {
    AppError::index(format!("Collection `{}` doesn't exist", collection))
}

/// Cosine similarity; zero vectors score 0.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_collection(
        &self,
        name: &str,
        spec: &CollectionSpec,
    ) -> Result<bool, AppError> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Ok(false);
        }
        collections.insert(
            name.to_string(),
            Collection {
                dimensions: spec.dimensions,
                points: Vec::new(),
            },
        );
        Ok(true)
    }

    async fn upsert(&self, collection: &str, point: Point) -> Result<(), AppError> {
        let mut collections = self.collections.write().await;
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| missing(collection))?;

        if point.vector.len() != coll.dimensions {
            return Err(AppError::index(format!(
                "Wrong input: Vector dimension error: expected dim: {}, got {}",
                coll.dimensions,
                point.vector.len()
            )));
        }

        match coll.points.iter_mut().find(|p| p.id == point.id) {
            Some(existing) => *existing = point,
            None => coll.points.push(point),
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<ScoredPoint>, AppError> {
        let collections = self.collections.read().await;
        let coll = collections.get(collection).ok_or_else(|| missing(collection))?;

        let mut hits: Vec<ScoredPoint> = coll
            .points
            .iter()
            .filter(|p| filter.map_or(true, |f| f.matches(&p.payload)))
            .map(|p| ScoredPoint {
                id: p.id.clone(),
                score: cosine(vector, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();

        // Stable sort: ties keep insertion order.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn retrieve(&self, collection: &str, id: &str) -> Result<Option<Record>, AppError> {
        let collections = self.collections.read().await;
        let coll = collections.get(collection).ok_or_else(|| missing(collection))?;

        Ok(coll.points.iter().find(|p| p.id == id).map(|p| Record {
            id: p.id.clone(),
            payload: p.payload.clone(),
        }))
    }

    async fn scroll(
        &self,
        collection: &str,
        request: ScrollRequest,
    ) -> Result<ScrollPage, AppError> {
        let collections = self.collections.read().await;
        let coll = collections.get(collection).ok_or_else(|| missing(collection))?;

        let start = match &request.offset {
            None => 0,
            Some(value) => value
                .as_u64()
                .ok_or_else(|| AppError::index(format!("Invalid scroll offset: {}", value)))?
                as usize,
        };

        let mut records = Vec::new();
        let mut next_offset = None;
        for (position, point) in coll.points.iter().enumerate().skip(start) {
            if let Some(filter) = &request.filter {
                if !filter.matches(&point.payload) {
                    continue;
                }
            }
            if records.len() == request.limit {
                next_offset = Some(Value::from(position as u64));
                break;
            }
            records.push(Record {
                id: point.id.clone(),
                payload: request.payload.apply(&point.payload),
            });
        }

        Ok(ScrollPage {
            records,
            next_offset,
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        let mut collections = self.collections.write().await;
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| missing(collection))?;
        coll.points.retain(|p| p.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Payload, PayloadSelector};
    use serde_json::json;

    fn point(id: &str, vector: Vec<f32>, category: &str) -> Point {
        let mut payload = Payload::new();
        payload.insert("category".to_string(), json!(category));
        payload.insert("title".to_string(), json!(id));
        Point {
            id: id.to_string(),
            vector,
            payload,
        }
    }

    async fn seeded() -> MemoryIndex {
        let index = MemoryIndex::new();
        index
            .ensure_collection("c", &CollectionSpec::cosine(2))
            .await
            .unwrap();
        index.upsert("c", point("a", vec![1.0, 0.0], "npu")).await.unwrap();
        index.upsert("c", point("b", vec![0.0, 1.0], "docker")).await.unwrap();
        index.upsert("c", point("c", vec![0.7, 0.7], "npu")).await.unwrap();
        index
    }

    #[tokio::test]
    async fn test_ensure_collection_reports_creation() {
        let index = MemoryIndex::new();
        let spec = CollectionSpec::cosine(4);
        assert!(index.ensure_collection("x", &spec).await.unwrap());
        assert!(!index.ensure_collection("x", &spec).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let index = seeded().await;
        let hits = index.search("c", &[1.0, 0.1], 10, None).await.unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_search_filter_and_limit() {
        let index = seeded().await;
        let filter = Filter::field_equals("category", "npu");
        let hits = index.search("c", &[0.0, 1.0], 1, Some(&filter)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "c");
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let index = seeded().await;
        index.upsert("c", point("a", vec![0.0, 1.0], "docker")).await.unwrap();

        let record = index.retrieve("c", "a").await.unwrap().unwrap();
        assert_eq!(record.payload["category"], json!("docker"));

        let page = index.scroll("c", ScrollRequest::new(10)).await.unwrap();
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.records[0].id, "a");
    }

    #[tokio::test]
    async fn test_upsert_rejects_wrong_dimension() {
        let index = seeded().await;
        let err = index.upsert("c", point("z", vec![1.0], "npu")).await.unwrap_err();
        assert!(matches!(err, AppError::Index { .. }));
    }

    #[tokio::test]
    async fn test_scroll_pages_through_everything() {
        let index = seeded().await;
        let first = index.scroll("c", ScrollRequest::new(2)).await.unwrap();
        assert_eq!(first.records.len(), 2);
        assert!(first.next_offset.is_some());

        let second = index
            .scroll("c", ScrollRequest::new(2).offset(first.next_offset))
            .await
            .unwrap();
        assert_eq!(second.records.len(), 1);
        assert!(second.next_offset.is_none());
    }

    #[tokio::test]
    async fn test_scroll_with_filter_and_field_selection() {
        let index = seeded().await;
        let request = ScrollRequest::new(10)
            .filter(Filter::field_equals("category", "npu"))
            .payload(PayloadSelector::Fields(vec!["category".to_string()]));
        let page = index.scroll("c", request).await.unwrap();

        assert_eq!(page.records.len(), 2);
        assert!(page.records.iter().all(|r| r.payload.len() == 1));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let index = seeded().await;
        index.delete("c", "a").await.unwrap();
        index.delete("c", "a").await.unwrap();
        assert!(index.retrieve("c", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_collection_is_an_index_error() {
        let index = MemoryIndex::new();
        let err = index.retrieve("nope", "a").await.unwrap_err();
        assert!(matches!(err, AppError::Index { .. }));
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
