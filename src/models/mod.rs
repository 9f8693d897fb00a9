//! Domain models for the knowledge base and changelog.

mod changelog;
mod knowledge;
mod time;

pub use changelog::ChangeLogEntry;
pub use knowledge::{KnowledgeEntry, Metadata};
pub use time::{later_than, now_timestamp};

use serde::Serialize;
use uuid::Uuid;

/// Generates a new record identifier (UUID v4, the point id format Qdrant accepts).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// A record returned by similarity search together with its cosine score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<T> {
    pub score: f32,
    #[serde(flatten)]
    pub record: T,
}
