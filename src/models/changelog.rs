//! Changelog entry model.

use serde::{Deserialize, Serialize};

use super::{generate_id, now_timestamp};

/// One change made to the device. Append-only: there is no update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    #[serde(default = "generate_id")]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    /// What was changed (short).
    pub what: String,
    /// Why it was changed.
    pub why: String,
    pub details: String,
    #[serde(default)]
    pub files_changed: Vec<String>,
    #[serde(default)]
    pub commands_run: Vec<String>,
}

impl ChangeLogEntry {
    pub fn new(
        what: impl Into<String>,
        why: impl Into<String>,
        details: impl Into<String>,
        files_changed: Vec<String>,
        commands_run: Vec<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            timestamp: now_timestamp(),
            what: what.into(),
            why: why.into(),
            details: details.into(),
            files_changed,
            commands_run,
        }
    }

    /// Text that gets embedded for this entry.
    pub fn embedding_text(&self) -> String {
        format!("{}\n{}\n{}", self.what, self.why, self.details)
    }
}
