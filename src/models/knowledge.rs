//! Knowledge entry model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{generate_id, later_than, now_timestamp};

/// Free-form annotations attached to a knowledge entry.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A titled, categorized piece of durable knowledge about the device.
///
/// The full struct is the payload stored alongside the vector. Fields other
/// than `title`, `content` and `category` default when missing so payloads
/// written by older versions still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Unique identifier (UUID v4), assigned once.
    #[serde(default = "generate_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    /// Exact-match filter label, operator defined (e.g. "npu", "docker").
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl KnowledgeEntry {
    /// Creates a new entry with a fresh id and both timestamps set to now.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        let now = now_timestamp();
        Self {
            id: generate_id(),
            title: title.into(),
            content: content.into(),
            category: category.into(),
            tags,
            created_at: now.clone(),
            updated_at: now,
            metadata: Metadata::new(),
        }
    }

    /// Text that gets embedded for this entry.
    pub fn embedding_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.content)
    }

    /// Replaces the body and bumps `updated_at`.
    pub fn replace_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    /// Appends `addition` under a timestamped separator and bumps `updated_at`.
    pub fn append_content(&mut self, addition: &str) {
        let updated_at = later_than(&self.updated_at);
        self.content
            .push_str(&format!("\n\n---\nUpdated {}:\n{}", updated_at, addition));
        self.updated_at = updated_at;
    }

    /// First `max_chars` characters of the content, with "..." when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.content.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.content[..cut]),
            None => self.content.clone(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = later_than(&self.updated_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_entry_timestamps_match() {
        let entry = KnowledgeEntry::new("t", "c", "hardware", vec![]);
        assert_eq!(entry.created_at, entry.updated_at);
        assert!(uuid::Uuid::parse_str(&entry.id).is_ok());
    }

    #[test]
    fn test_embedding_text() {
        let entry = KnowledgeEntry::new("Voice Pipeline", "Whisper on port 10300", "x", vec![]);
        assert_eq!(entry.embedding_text(), "Voice Pipeline\n\nWhisper on port 10300");
    }

    #[test]
    fn test_append_keeps_prior_content() {
        let mut entry = KnowledgeEntry::new("t", "first", "x", vec![]);
        let before = entry.updated_at.clone();
        entry.append_content("second");

        assert!(entry.content.starts_with("first\n\n---\nUpdated "));
        assert!(entry.content.ends_with(":\nsecond"));
        assert!(entry.updated_at > before);
    }

    #[test]
    fn test_replace_bumps_updated_at() {
        let mut entry = KnowledgeEntry::new("t", "first", "x", vec![]);
        let created = entry.created_at.clone();
        entry.replace_content("new");
        assert_eq!(entry.content, "new");
        assert_eq!(entry.created_at, created);
        assert!(entry.updated_at > created);
    }

    #[test]
    fn test_preview_is_char_safe() {
        let entry = KnowledgeEntry::new("t", "привет мир", "x", vec![]);
        assert_eq!(entry.preview(6), "привет...");
        assert_eq!(entry.preview(100), "привет мир");
    }

    #[test]
    fn test_decode_payload_with_missing_optional_keys() {
        let payload = json!({
            "id": "7d1f3c2e-0000-4000-8000-000000000001",
            "title": "Old",
            "content": "written before tags existed",
            "category": "docker"
        });
        let entry: KnowledgeEntry = serde_json::from_value(payload).unwrap();
        assert!(entry.tags.is_empty());
        assert!(entry.metadata.is_empty());
        assert_eq!(entry.updated_at, "");
    }
}
