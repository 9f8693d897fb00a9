//! Knowledge base tools - save, search, read, update and delete entries.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

use super::require;
use crate::error::AppError;
use crate::mcp::protocol::{OutputFormat, Response};
use crate::mcp::server::McpServer;
use crate::models::{KnowledgeEntry, Metadata};
use crate::repositories::KnowledgeRepository;
use crate::services::KnowledgeService;

/// Characters of content shown in search results.
const PREVIEW_CHARS: usize = 300;

fn default_search_limit() -> usize {
    5
}

fn default_list_limit() -> usize {
    20
}

// ============================================================================
// Parameter Types
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveKnowledgeParams {
    /// Short, descriptive title.
    pub title: String,
    /// Full content: commands, configs, steps.
    pub content: String,
    /// Category, e.g. hardware, voice-pipeline, npu, docker, troubleshooting.
    pub category: String,
    /// Optional tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional free-form annotations.
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchKnowledgeParams {
    /// Natural-language query.
    pub query: String,
    /// Restrict results to this category (exact match). Blank means all.
    #[serde(default)]
    pub category: Option<String>,
    /// Maximum number of results (default 5).
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    /// Output format: json (default) or toon.
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EntryIdParams {
    /// Entry ID (UUID).
    pub id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateKnowledgeParams {
    /// Entry ID (UUID).
    pub id: String,
    /// New content, or the text to append.
    pub content: String,
    /// Append under a timestamped separator instead of replacing.
    #[serde(default)]
    pub append: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListCategoriesParams {
    /// Output format: json (default) or toon.
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListKnowledgeParams {
    /// Category to list (exact match).
    pub category: String,
    /// Maximum number of entries (default 20).
    #[serde(default = "default_list_limit")]
    pub limit: usize,
    /// Output format: json (default) or toon.
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Identifies an entry that was just written.
#[derive(Debug, Serialize)]
pub struct SavedEntryResult {
    pub id: String,
    pub title: String,
    pub category: String,
}

impl From<&KnowledgeEntry> for SavedEntryResult {
    fn from(entry: &KnowledgeEntry) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.title.clone(),
            category: entry.category.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct KnowledgeHitResult {
    pub id: String,
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub score: f32,
    pub preview: String,
}

#[derive(Debug, Serialize)]
pub struct SearchKnowledgeResult {
    pub results: Vec<KnowledgeHitResult>,
    pub count: usize,
}

/// Returned by `get_knowledge` when no entry has the requested id.
#[derive(Debug, Serialize)]
pub struct MissingEntryResult {
    pub id: String,
    pub found: bool,
}

#[derive(Debug, Serialize)]
pub struct UpdateKnowledgeResult {
    pub id: String,
    pub title: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteKnowledgeResult {
    pub id: String,
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct ListCategoriesResult {
    pub categories: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct KnowledgeSummaryResult {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ListKnowledgeResult {
    pub category: String,
    pub entries: Vec<KnowledgeSummaryResult>,
    pub count: usize,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router(router = knowledge_tools, vis = "pub(crate)")]
impl McpServer {
    /// Save a piece of knowledge about the device.
    ///
    /// Use for hardware settings, service configs, NPU optimizations and
    /// anything worth finding again later.
    #[tool(description = "Save knowledge about the CM3588 (hardware setup, service configs, fixes, NPU tuning). Returns the new entry ID.")]
    pub async fn save_knowledge(
        &self,
        Parameters(params): Parameters<SaveKnowledgeParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(title = %params.title, category = %params.category, "Running save_knowledge tool");

        require("title", &params.title)?;
        require("content", &params.content)?;
        require("category", &params.category)?;

        let mut entry =
            KnowledgeEntry::new(params.title, params.content, params.category, params.tags);
        if let Some(metadata) = params.metadata {
            entry.metadata = metadata;
        }

        self.resolve::<KnowledgeRepository>()
            .save_knowledge(&entry)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        tracing::info!(id = %entry.id, "Saved knowledge");
        Response::json(SavedEntryResult::from(&entry)).into()
    }

    /// Semantic search over the knowledge base.
    #[tool(description = "Semantic search in the knowledge base. Optional exact category filter. Returns previews; use get_knowledge for full content.")]
    pub async fn search_knowledge(
        &self,
        Parameters(params): Parameters<SearchKnowledgeParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(query = %params.query, category = ?params.category, limit = params.limit, "Running search_knowledge tool");

        require("query", &params.query)?;

        // A blank category means no filter
        let category = params
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let hits = self
            .resolve::<KnowledgeRepository>()
            .search_knowledge(&params.query, params.limit, category)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        let results: Vec<KnowledgeHitResult> = hits
            .into_iter()
            .map(|hit| KnowledgeHitResult {
                preview: hit.record.preview(PREVIEW_CHARS),
                id: hit.record.id,
                title: hit.record.title,
                category: hit.record.category,
                tags: hit.record.tags,
                score: hit.score,
            })
            .collect();

        tracing::info!(count = results.len(), "Knowledge search complete");
        let count = results.len();
        Response(SearchKnowledgeResult { results, count }, params.format).into()
    }

    /// Fetch a complete entry.
    #[tool(description = "Get the full knowledge entry by ID. An unknown ID returns {id, found: false}.")]
    pub async fn get_knowledge(
        &self,
        Parameters(params): Parameters<EntryIdParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(id = %params.id, "Running get_knowledge tool");

        let entry = self
            .resolve::<KnowledgeRepository>()
            .get_knowledge_by_id(&params.id)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        match entry {
            Some(entry) => Response::json(entry).into(),
            None => {
                tracing::info!(id = %params.id, "Knowledge entry not found");
                Response::json(MissingEntryResult {
                    id: params.id,
                    found: false,
                })
                .into()
            }
        }
    }

    /// Replace or extend an entry's content.
    ///
    /// With `append`, the new text goes under a separator carrying the
    /// update time, so the history of the entry stays readable.
    #[tool(description = "Update a knowledge entry's content. append=true adds the text under a timestamped separator; otherwise the content is replaced.")]
    pub async fn update_knowledge(
        &self,
        Parameters(params): Parameters<UpdateKnowledgeParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(id = %params.id, append = params.append, "Running update_knowledge tool");

        let entry = self
            .resolve::<KnowledgeService>()
            .update_knowledge(&params.id, &params.content, params.append)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response::json(UpdateKnowledgeResult {
            id: entry.id,
            title: entry.title,
            updated_at: entry.updated_at,
        })
        .into()
    }

    #[tool(description = "Delete a knowledge entry. Deleting a missing ID succeeds.")]
    pub async fn delete_knowledge(
        &self,
        Parameters(params): Parameters<EntryIdParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(id = %params.id, "Running delete_knowledge tool");

        self.resolve::<KnowledgeRepository>()
            .delete_knowledge(&params.id)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response::json(DeleteKnowledgeResult {
            id: params.id,
            deleted: true,
        })
        .into()
    }

    #[tool(description = "List all categories used in the knowledge base, sorted.")]
    pub async fn list_categories(
        &self,
        Parameters(params): Parameters<ListCategoriesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Running list_categories tool");

        let categories = self
            .resolve::<KnowledgeRepository>()
            .get_categories()
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        let count = categories.len();
        Response(ListCategoriesResult { categories, count }, params.format).into()
    }

    #[tool(description = "List entries in one category (id, title, tags). Not ranked.")]
    pub async fn list_knowledge(
        &self,
        Parameters(params): Parameters<ListKnowledgeParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(category = %params.category, limit = params.limit, "Running list_knowledge tool");

        let entries = self
            .resolve::<KnowledgeRepository>()
            .list_by_category(&params.category, params.limit)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        let entries: Vec<KnowledgeSummaryResult> = entries
            .into_iter()
            .map(|e| KnowledgeSummaryResult {
                id: e.id,
                title: e.title,
                tags: e.tags,
            })
            .collect();
        let count = entries.len();

        Response(
            ListKnowledgeResult {
                category: params.category,
                entries,
                count,
            },
            params.format,
        )
        .into()
    }
}
