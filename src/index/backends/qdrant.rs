//! Qdrant backend over the REST API.
//!
//! # Example
//!
//! ```ignore
//! use cm3588_mcp::index::backends::qdrant::QdrantIndex;
//!
//! let index = QdrantIndex::new(&config.index)?;
//! index.ensure_collection("cm3588_knowledge", &CollectionSpec::cosine(384)).await?;
//! ```
//!
//! Qdrant only accepts unsigned integers and UUIDs as point ids. Every id
//! this crate generates is a UUID; any other string can't name a stored
//! point, so lookups and deletes with such an id short-circuit.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::IndexConfig;
use crate::error::AppError;
use crate::index::{
    CollectionSpec, Distance, Filter, Payload, PayloadSelector, Point, Record, ScoredPoint,
    ScrollPage, ScrollRequest, VectorIndex,
};

/// Client for one Qdrant instance.
#[derive(Debug, Clone)]
pub struct QdrantIndex {
    client: Client,
    base_url: String,
}

impl QdrantIndex {
    /// Builds the HTTP client. Does not contact the server.
    pub fn new(config: &IndexConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = config.api_key.as_deref() {
            let value = HeaderValue::from_str(api_key)
                .map_err(|_| AppError::Validation("Qdrant API key is not a valid header".into()))?;
            headers.insert("api-key", value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::index(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request and returns the `result` member of the response.
    async fn call(&self, request: RequestBuilder) -> Result<Value, AppError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::index(format!(
                "HTTP {}: {}",
                status,
                error_message(&body)
            )));
        }

        let mut body: Value = response.json().await.map_err(|e| self.transport_error(e))?;
        Ok(body.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }

    fn transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_connect() || err.is_timeout() {
            AppError::IndexUnavailable(format!("{}: {}", self.base_url, err))
        } else {
            AppError::index(err.to_string())
        }
    }

    async fn collection_names(&self) -> Result<Vec<String>, AppError> {
        let result = self.call(self.client.get(self.url("/collections"))).await?;
        Ok(result["collections"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|c| c["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Creates a keyword payload index on `field`. Qdrant accepts repeats.
    async fn create_keyword_index(&self, collection: &str, field: &str) -> Result<(), AppError> {
        let body = json!({ "field_name": field, "field_schema": "keyword" });
        self.call(
            self.client
                .put(self.url(&format!("/collections/{}/index?wait=true", collection)))
                .json(&body),
        )
        .await?;
        Ok(())
    }
}

/// Warns when an existing collection's vector size differs from `expected`.
fn check_dimensions(name: &str, info: &Value, expected: usize) {
    if let Some(actual) = info
        .pointer("/config/params/vectors/size")
        .and_then(Value::as_u64)
    {
        if actual as usize != expected {
            tracing::warn!(
                collection = name,
                expected,
                actual,
                "Collection vector size differs from embedding dimensions"
            );
        }
    }
}

/// Wanted keyword fields absent from the collection's `payload_schema`.
fn missing_keyword_fields<'a>(info: &Value, wanted: &'a [String]) -> Vec<&'a str> {
    let indexed = info.get("payload_schema").and_then(Value::as_object);
    wanted
        .iter()
        .filter(|field| !indexed.is_some_and(|schema| schema.contains_key(field.as_str())))
        .map(String::as_str)
        .collect()
}

/// Extracts `status.error` from a Qdrant error body, or the body itself.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/status/error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn is_point_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

fn distance_name(distance: Distance) -> &'static str {
    match distance {
        Distance::Cosine => "Cosine",
    }
}

fn filter_json(filter: &Filter) -> Value {
    let must: Vec<Value> = filter
        .must
        .iter()
        .map(|cond| json!({ "key": cond.key, "match": { "value": cond.value } }))
        .collect();
    json!({ "must": must })
}

fn selector_json(selector: &PayloadSelector) -> Value {
    match selector {
        PayloadSelector::All => Value::Bool(true),
        PayloadSelector::Fields(fields) => json!(fields),
    }
}

/// Point ids come back as strings (UUID) or numbers.
fn id_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn payload_of(point: &Value) -> Payload {
    point["payload"].as_object().cloned().unwrap_or_default()
}

fn record_of(point: &Value) -> Record {
    Record {
        id: id_string(&point["id"]),
        payload: payload_of(point),
    }
}

fn scored_of(point: &Value) -> ScoredPoint {
    ScoredPoint {
        id: id_string(&point["id"]),
        score: point["score"].as_f64().unwrap_or_default() as f32,
        payload: payload_of(point),
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(
        &self,
        name: &str,
        spec: &CollectionSpec,
    ) -> Result<bool, AppError> {
        if self.collection_names().await?.iter().any(|c| c == name) {
            let info = self
                .call(self.client.get(self.url(&format!("/collections/{}", name))))
                .await?;
            check_dimensions(name, &info, spec.dimensions);
            // A keyword index may be missing if an earlier run failed after creating the collection
            for field in missing_keyword_fields(&info, &spec.keyword_fields) {
                tracing::info!(collection = name, field, "Creating missing keyword index");
                self.create_keyword_index(name, field).await?;
            }
            return Ok(false);
        }

        tracing::info!(collection = name, dimensions = spec.dimensions, "Creating collection");
        let body = json!({
            "vectors": {
                "size": spec.dimensions,
                "distance": distance_name(spec.distance),
            }
        });
        self.call(
            self.client
                .put(self.url(&format!("/collections/{}", name)))
                .json(&body),
        )
        .await?;

        for field in &spec.keyword_fields {
            self.create_keyword_index(name, field).await?;
        }

        Ok(true)
    }

    async fn upsert(&self, collection: &str, point: Point) -> Result<(), AppError> {
        if !is_point_id(&point.id) {
            return Err(AppError::Validation(format!(
                "Point id must be a UUID: {}",
                point.id
            )));
        }

        let body = json!({
            "points": [{
                "id": point.id,
                "vector": point.vector,
                "payload": point.payload,
            }]
        });
        self.call(
            self.client
                .put(self.url(&format!("/collections/{}/points?wait=true", collection)))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<ScoredPoint>, AppError> {
        let mut body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });
        if let Some(filter) = filter {
            body["filter"] = filter_json(filter);
        }

        let result = self
            .call(
                self.client
                    .post(self.url(&format!("/collections/{}/points/search", collection)))
                    .json(&body),
            )
            .await?;

        Ok(result
            .as_array()
            .map(|hits| hits.iter().map(scored_of).collect())
            .unwrap_or_default())
    }

    async fn retrieve(&self, collection: &str, id: &str) -> Result<Option<Record>, AppError> {
        if !is_point_id(id) {
            return Ok(None);
        }

        let body = json!({ "ids": [id], "with_payload": true, "with_vector": false });
        let result = self
            .call(
                self.client
                    .post(self.url(&format!("/collections/{}/points", collection)))
                    .json(&body),
            )
            .await?;

        Ok(result
            .as_array()
            .and_then(|points| points.first())
            .map(record_of))
    }

    async fn scroll(
        &self,
        collection: &str,
        request: ScrollRequest,
    ) -> Result<ScrollPage, AppError> {
        let mut body = json!({
            "limit": request.limit,
            "with_payload": selector_json(&request.payload),
            "with_vector": false,
        });
        if let Some(filter) = &request.filter {
            body["filter"] = filter_json(filter);
        }
        if let Some(offset) = request.offset {
            body["offset"] = offset;
        }

        let result = self
            .call(
                self.client
                    .post(self.url(&format!("/collections/{}/points/scroll", collection)))
                    .json(&body),
            )
            .await?;

        let records = result["points"]
            .as_array()
            .map(|points| points.iter().map(record_of).collect())
            .unwrap_or_default();
        let next_offset = match &result["next_page_offset"] {
            Value::Null => None,
            offset => Some(offset.clone()),
        };

        Ok(ScrollPage {
            records,
            next_offset,
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        if !is_point_id(id) {
            return Ok(());
        }

        let body = json!({ "points": [id] });
        self.call(
            self.client
                .post(self.url(&format!("/collections/{}/points/delete?wait=true", collection)))
                .json(&body),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_json_shape() {
        let value = filter_json(&Filter::field_equals("category", "npu"));
        assert_eq!(
            value,
            json!({ "must": [{ "key": "category", "match": { "value": "npu" } }] })
        );
    }

    #[test]
    fn test_selector_json() {
        assert_eq!(selector_json(&PayloadSelector::All), json!(true));
        assert_eq!(
            selector_json(&PayloadSelector::Fields(vec!["category".into()])),
            json!(["category"])
        );
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let record = record_of(&json!({ "id": 42, "payload": { "title": "x" } }));
        assert_eq!(record.id, "42");
        assert_eq!(record.payload["title"], json!("x"));
    }

    #[test]
    fn test_scored_point_parsing() {
        let hit = scored_of(&json!({
            "id": "0b7f1f5e-6a43-4c47-9f0e-6d9c1b6d0a11",
            "score": 0.5,
            "payload": null
        }));
        assert_eq!(hit.score, 0.5);
        assert!(hit.payload.is_empty());
    }

    #[test]
    fn test_error_message_prefers_status_error() {
        let body = r#"{"status":{"error":"Not found: Collection `x` doesn't exist!"},"time":0.0}"#;
        assert_eq!(error_message(body), "Not found: Collection `x` doesn't exist!");
        assert_eq!(error_message("bad gateway"), "bad gateway");
    }

    #[test]
    fn test_missing_keyword_fields() {
        let wanted = vec!["category".to_string()];

        let without = json!({ "config": {}, "payload_schema": {} });
        assert_eq!(missing_keyword_fields(&without, &wanted), vec!["category"]);

        let no_schema = json!({ "config": {} });
        assert_eq!(missing_keyword_fields(&no_schema, &wanted), vec!["category"]);

        let with = json!({
            "payload_schema": { "category": { "data_type": "keyword", "points": 3 } }
        });
        assert!(missing_keyword_fields(&with, &wanted).is_empty());
    }

    #[test]
    fn test_point_ids_must_be_uuids() {
        assert!(is_point_id("0b7f1f5e-6a43-4c47-9f0e-6d9c1b6d0a11"));
        assert!(!is_point_id("not-a-uuid"));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = IndexConfig {
            url: "http://nas:6333/".to_string(),
            ..IndexConfig::default()
        };
        let index = QdrantIndex::new(&config).unwrap();
        assert_eq!(index.url("/collections"), "http://nas:6333/collections");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let config = IndexConfig {
            url: "http://127.0.0.1:1".to_string(),
            ..IndexConfig::default()
        };
        let index = QdrantIndex::new(&config).unwrap();
        let err = index.collection_names().await.unwrap_err();
        assert!(matches!(err, AppError::IndexUnavailable(_)));
    }
}
