//! Value types shared by all index backends.

use serde_json::Value;

/// Point payload: a flat JSON object.
pub type Payload = serde_json::Map<String, Value>;

/// Similarity metric of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    Cosine,
}

/// Schema of a collection.
#[derive(Debug, Clone)]
pub struct CollectionSpec {
    pub dimensions: usize,
    pub distance: Distance,
    /// Payload fields that get an exact-match index.
    pub keyword_fields: Vec<String>,
}

impl CollectionSpec {
    pub fn cosine(dimensions: usize) -> Self {
        Self {
            dimensions,
            distance: Distance::Cosine,
            keyword_fields: Vec::new(),
        }
    }

    pub fn with_keyword_field(mut self, field: impl Into<String>) -> Self {
        self.keyword_fields.push(field.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Point {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

/// A stored point without its vector.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: String,
    pub payload: Payload,
}

#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: Payload,
}

/// Exact-match condition on one payload field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCondition {
    pub key: String,
    pub value: Value,
}

/// Conjunction of exact-match conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub must: Vec<FieldCondition>,
}

impl Filter {
    pub fn field_equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            must: vec![FieldCondition {
                key: key.into(),
                value: value.into(),
            }],
        }
    }

    /// Whether every condition holds for `payload`.
    pub fn matches(&self, payload: &Payload) -> bool {
        self.must
            .iter()
            .all(|cond| payload.get(&cond.key) == Some(&cond.value))
    }
}

/// Which payload fields a read returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PayloadSelector {
    #[default]
    All,
    Fields(Vec<String>),
}

impl PayloadSelector {
    /// Reduce `payload` to the selected fields.
    pub fn apply(&self, payload: &Payload) -> Payload {
        match self {
            PayloadSelector::All => payload.clone(),
            PayloadSelector::Fields(fields) => payload
                .iter()
                .filter(|(key, _)| fields.iter().any(|f| f == *key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

/// Parameters of one scroll request.
#[derive(Debug, Clone)]
pub struct ScrollRequest {
    pub filter: Option<Filter>,
    pub limit: usize,
    /// Opaque cursor from a previous [`ScrollPage::next_offset`].
    pub offset: Option<Value>,
    pub payload: PayloadSelector,
}

impl ScrollRequest {
    pub fn new(limit: usize) -> Self {
        Self {
            filter: None,
            limit,
            offset: None,
            payload: PayloadSelector::All,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn offset(mut self, offset: Option<Value>) -> Self {
        self.offset = offset;
        self
    }

    pub fn payload(mut self, payload: PayloadSelector) -> Self {
        self.payload = payload;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScrollPage {
    pub records: Vec<Record>,
    /// Cursor for the next page; `None` when the collection is exhausted.
    pub next_offset: Option<Value>,
}
