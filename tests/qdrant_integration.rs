//! Integration tests for the Qdrant backend.
//!
//! These tests require a running Qdrant instance.
//! Run with: `docker run -p 6333:6333 qdrant/qdrant && cargo test --features integration --test qdrant_integration`

#![cfg(feature = "integration")]

use std::sync::Arc;

use cm3588_mcp::config::{Config, EmbeddingProvider, IndexBackend, IndexConfig};
use cm3588_mcp::context::Context;
use cm3588_mcp::error::AppError;
use cm3588_mcp::index::backends::qdrant::QdrantIndex;
use cm3588_mcp::index::{CollectionSpec, Filter, Point, ScrollRequest, VectorIndex};
use cm3588_mcp::models::{ChangeLogEntry, KnowledgeEntry};
use cm3588_mcp::remote::{AppRemote, LazySshClient};
use cm3588_mcp::repositories::{ChangelogRepository, KnowledgeRepository};
use cm3588_mcp::store::Store;
use cm3588_mcp::FromRef;
use serde_json::json;
use serial_test::serial;

const TEST_URL: &str = "http://localhost:6333";

fn index_config(suffix: &str) -> IndexConfig {
    IndexConfig {
        backend: IndexBackend::Qdrant,
        url: TEST_URL.to_string(),
        knowledge_collection: format!("it_knowledge_{}", suffix),
        changelog_collection: format!("it_changelog_{}", suffix),
        page_size: 2,
        ..IndexConfig::default()
    }
}

fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn create_context(suffix: &str) -> Context {
    let mut config = Config::default();
    config.index = index_config(suffix);
    config.embedding.provider = EmbeddingProvider::Hash;
    config.embedding.dimensions = 256;

    let store = Store::from_config(&config).expect("Failed to build store");
    let remote: AppRemote = Arc::new(LazySshClient::new(config.ssh.clone()));
    Context::new(config, store, remote)
}

/// Drop test collections after a test
async fn cleanup(names: &[String]) {
    let client = reqwest::Client::new();
    for name in names {
        let _ = client
            .delete(format!("{}/collections/{}", TEST_URL, name))
            .send()
            .await;
    }
}

fn point(id: &str, vector: Vec<f32>, category: &str) -> Point {
    let payload = json!({ "id": id, "category": category });
    Point {
        id: id.to_string(),
        vector,
        payload: payload.as_object().cloned().unwrap(),
    }
}

// All tests run serially to keep load on the shared instance predictable
#[serial]
mod qdrant_tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_collection_is_idempotent() {
        let config = index_config(&unique_suffix());
        let index = QdrantIndex::new(&config).unwrap();
        let name = config.knowledge_collection.clone();
        let spec = CollectionSpec::cosine(4).with_keyword_field("category");

        assert!(index.ensure_collection(&name, &spec).await.unwrap());
        assert!(!index.ensure_collection(&name, &spec).await.unwrap());

        cleanup(&[name]).await;
    }

    #[tokio::test]
    async fn test_existing_collection_gets_missing_keyword_index() {
        let config = index_config(&unique_suffix());
        let index = QdrantIndex::new(&config).unwrap();
        let name = config.knowledge_collection.clone();

        assert!(index.ensure_collection(&name, &CollectionSpec::cosine(4)).await.unwrap());
        let spec = CollectionSpec::cosine(4).with_keyword_field("category");
        assert!(!index.ensure_collection(&name, &spec).await.unwrap());

        let info: serde_json::Value = reqwest::get(format!("{}/collections/{}", TEST_URL, name))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(info["result"]["payload_schema"]["category"].is_object());

        cleanup(&[name]).await;
    }

    #[tokio::test]
    async fn test_points_search_filter_and_delete() {
        let config = index_config(&unique_suffix());
        let index = QdrantIndex::new(&config).unwrap();
        let name = config.knowledge_collection.clone();
        index
            .ensure_collection(&name, &CollectionSpec::cosine(3).with_keyword_field("category"))
            .await
            .unwrap();

        let a = uuid::Uuid::new_v4().to_string();
        let b = uuid::Uuid::new_v4().to_string();
        index.upsert(&name, point(&a, vec![1.0, 0.0, 0.0], "npu")).await.unwrap();
        index.upsert(&name, point(&b, vec![0.9, 0.1, 0.0], "docker")).await.unwrap();

        let hits = index.search(&name, &[1.0, 0.0, 0.0], 5, None).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, a);
        assert!(hits[0].score >= hits[1].score);

        let filter = Filter::field_equals("category", "docker");
        let hits = index
            .search(&name, &[1.0, 0.0, 0.0], 5, Some(&filter))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, b);

        let page = index
            .scroll(&name, ScrollRequest::new(10).filter(filter))
            .await
            .unwrap();
        assert_eq!(page.records.len(), 1);

        index.delete(&name, &a).await.unwrap();
        index.delete(&name, &a).await.unwrap();
        assert!(index.retrieve(&name, &a).await.unwrap().is_none());

        cleanup(&[name]).await;
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_an_index_error() {
        let config = index_config(&unique_suffix());
        let index = QdrantIndex::new(&config).unwrap();
        let name = config.knowledge_collection.clone();
        index
            .ensure_collection(&name, &CollectionSpec::cosine(3))
            .await
            .unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let result = index.upsert(&name, point(&id, vec![1.0, 0.0], "npu")).await;
        assert!(matches!(result, Err(AppError::Index { .. })));

        cleanup(&[name]).await;
    }

    #[tokio::test]
    async fn test_repositories_against_qdrant() {
        let suffix = unique_suffix();
        let ctx = create_context(&suffix);
        let knowledge = KnowledgeRepository::from_ref(&ctx);
        let changelog = ChangelogRepository::from_ref(&ctx);

        let voice = KnowledgeEntry::new(
            "Voice Pipeline",
            "Whisper on port 10300",
            "voice-pipeline",
            vec![],
        );
        knowledge.save_knowledge(&voice).await.unwrap();
        for category in ["npu", "docker", "npu"] {
            let entry = KnowledgeEntry::new("x", "y", category, vec![]);
            knowledge.save_knowledge(&entry).await.unwrap();
        }

        let loaded = knowledge.get_knowledge_by_id(&voice.id).await.unwrap();
        assert_eq!(loaded, Some(voice.clone()));

        let hits = knowledge
            .search_knowledge("speech to text port", 5, Some("voice-pipeline"))
            .await
            .unwrap();
        assert_eq!(hits[0].record.id, voice.id);

        // Three pages at page_size = 2
        assert_eq!(
            knowledge.get_categories().await.unwrap(),
            vec!["docker", "npu", "voice-pipeline"]
        );

        for (what, ts) in [("old", "2026-01-01T00:00:00.000000Z"), ("new", "2026-02-01T00:00:00.000000Z")] {
            let mut change = ChangeLogEntry::new(what, "why", "details", vec![], vec![]);
            change.timestamp = ts.to_string();
            changelog.save_changelog(&change).await.unwrap();
        }
        let recent = changelog.get_changelog(1).await.unwrap();
        assert_eq!(recent[0].what, "new");

        cleanup(&[
            format!("it_knowledge_{}", suffix),
            format!("it_changelog_{}", suffix),
        ])
        .await;
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let config = IndexConfig {
            url: "http://127.0.0.1:1".to_string(),
            ..index_config(&unique_suffix())
        };
        let index = QdrantIndex::new(&config).unwrap();

        let result = index
            .ensure_collection("anything", &CollectionSpec::cosine(3))
            .await;
        assert!(matches!(result, Err(AppError::IndexUnavailable(_))));
    }
}
