//! Changelog repository: append-only history of device changes.

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::index::{PayloadSelector, Point, Record};
use crate::models::{ChangeLogEntry, SearchHit};
use crate::store::payload::{decode, encode};
use crate::store::AppStore;

/// Repository for changelog operations.
#[derive(FromContext, Clone)]
pub struct ChangelogRepository {
    store: AppStore,
}

impl ChangelogRepository {
    fn collection(&self) -> &str {
        self.store.changelog_collection()
    }

    pub async fn save_changelog(&self, entry: &ChangeLogEntry) -> Result<String, AppError> {
        self.store.ready().await?;

        let vector = self.store.embed(&entry.embedding_text()).await?;
        let point = Point {
            id: entry.id.clone(),
            vector,
            payload: encode(entry)?,
        };
        self.store.index().upsert(self.collection(), point).await?;

        tracing::debug!(id = %entry.id, what = %entry.what, "Saved changelog entry");
        Ok(entry.id.clone())
    }

    /// The `limit` most recent entries, newest first.
    ///
    /// Sorting happens client-side over a bounded scan, so with more entries
    /// than `index.scan_limit` this is an approximation.
    pub async fn get_changelog(&self, limit: usize) -> Result<Vec<ChangeLogEntry>, AppError> {
        self.store.ready().await?;

        let records = self
            .store
            .scan(self.collection(), None, PayloadSelector::All)
            .await?;

        let mut entries = records
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<ChangeLogEntry>, _>>()?;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        Ok(entries)
    }

    pub async fn search_changelog(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit<ChangeLogEntry>>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.ready().await?;

        let vector = self.store.embed(query).await?;
        let hits = self
            .store
            .index()
            .search(self.collection(), &vector, limit, None)
            .await?;

        tracing::debug!(query, count = hits.len(), "Searched changelog");
        hits.into_iter()
            .map(|hit| {
                Ok(SearchHit {
                    score: hit.score,
                    record: decode(Record {
                        id: hit.id,
                        payload: hit.payload,
                    })?,
                })
            })
            .collect()
    }
}
