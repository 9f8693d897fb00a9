//! Knowledge repository: semantic storage of knowledge entries.

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::index::{Filter, PayloadSelector, Point, Record, ScrollRequest};
use crate::models::{KnowledgeEntry, SearchHit};
use crate::store::payload::{decode, encode};
use crate::store::{AppStore, CATEGORY_FIELD};

/// Repository for knowledge entry operations.
#[derive(FromContext, Clone)]
pub struct KnowledgeRepository {
    store: AppStore,
}

impl KnowledgeRepository {
    fn collection(&self) -> &str {
        self.store.knowledge_collection()
    }

    /// Embeds and upserts the entry. Saving an existing id overwrites it.
    pub async fn save_knowledge(&self, entry: &KnowledgeEntry) -> Result<String, AppError> {
        self.store.ready().await?;

        let vector = self.store.embed(&entry.embedding_text()).await?;
        let point = Point {
            id: entry.id.clone(),
            vector,
            payload: encode(entry)?,
        };
        self.store.index().upsert(self.collection(), point).await?;

        tracing::debug!(id = %entry.id, category = %entry.category, "Saved knowledge entry");
        Ok(entry.id.clone())
    }

    /// Nearest entries to `query`, optionally restricted to one category.
    pub async fn search_knowledge(
        &self,
        query: &str,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<SearchHit<KnowledgeEntry>>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.ready().await?;

        let vector = self.store.embed(query).await?;
        let filter = category.map(|c| Filter::field_equals(CATEGORY_FIELD, c));
        let hits = self
            .store
            .index()
            .search(self.collection(), &vector, limit, filter.as_ref())
            .await?;

        tracing::debug!(query, count = hits.len(), "Searched knowledge");
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

    /// Point lookup; `None` when no entry has this id.
    pub async fn get_knowledge_by_id(&self, id: &str) -> Result<Option<KnowledgeEntry>, AppError> {
        self.store.ready().await?;

        match self.store.index().retrieve(self.collection(), id).await? {
            Some(record) => Ok(Some(decode(record)?)),
            None => Ok(None),
        }
    }

    /// Up to `limit` entries of one category, in index order.
    pub async fn list_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeEntry>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.ready().await?;

        let request =
            ScrollRequest::new(limit).filter(Filter::field_equals(CATEGORY_FIELD, category));
        let page = self.store.index().scroll(self.collection(), request).await?;

        page.records.into_iter().map(decode).collect()
    }

    /// Distinct categories in use, sorted.
    pub async fn get_categories(&self) -> Result<Vec<String>, AppError> {
        self.store.ready().await?;

        let records = self
            .store
            .scan(
                self.collection(),
                None,
                PayloadSelector::Fields(vec![CATEGORY_FIELD.to_string()]),
            )
            .await?;

        let mut categories: Vec<String> = records
            .iter()
            .filter_map(|r| r.payload.get(CATEGORY_FIELD)?.as_str().map(str::to_string))
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    /// Removes the entry. Deleting a missing id succeeds.
    pub async fn delete_knowledge(&self, id: &str) -> Result<(), AppError> {
        self.store.ready().await?;
        self.store.index().delete(self.collection(), id).await?;
        tracing::debug!(id, "Deleted knowledge entry");
        Ok(())
    }
}
