//! Changelog tools - record and query changes made to the device.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

use super::knowledge::SavedEntryResult;
use super::require;
use crate::error::AppError;
use crate::mcp::protocol::{OutputFormat, Response};
use crate::mcp::server::McpServer;
use crate::models::ChangeLogEntry;
use crate::repositories::ChangelogRepository;
use crate::services::KnowledgeService;

fn default_changelog_limit() -> usize {
    20
}

fn default_search_limit() -> usize {
    5
}

// ============================================================================
// Parameter Types
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogChangeParams {
    /// What changed (short).
    pub what: String,
    /// Why it was changed.
    pub why: String,
    /// What exactly was done.
    pub details: String,
    /// Files that were modified.
    #[serde(default)]
    pub files_changed: Vec<String>,
    /// Commands that were run.
    #[serde(default)]
    pub commands_run: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogSolutionParams {
    /// The problem that was solved.
    pub problem: String,
    /// How it was solved.
    pub solution: String,
    /// Steps taken, in order.
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetChangelogParams {
    /// Number of entries (default 20), newest first.
    #[serde(default = "default_changelog_limit")]
    pub limit: usize,
    /// Output format: json (default) or toon.
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchChangelogParams {
    /// Natural-language query.
    pub query: String,
    /// Maximum number of results (default 5).
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    /// Output format: json (default) or toon.
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LoggedChangeResult {
    pub id: String,
    pub timestamp: String,
    pub what: String,
}

/// Changelog line as shown in listings.
#[derive(Debug, Serialize)]
pub struct ChangeSummaryResult {
    pub id: String,
    pub timestamp: String,
    pub what: String,
    pub why: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl From<ChangeLogEntry> for ChangeSummaryResult {
    fn from(entry: ChangeLogEntry) -> Self {
        Self {
            id: entry.id,
            timestamp: entry.timestamp,
            what: entry.what,
            why: entry.why,
            score: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChangelogResult {
    pub entries: Vec<ChangeSummaryResult>,
    pub count: usize,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router(router = changelog_tools, vis = "pub(crate)")]
impl McpServer {
    /// Record a change to the device.
    ///
    /// Call after every modification so the history stays complete.
    #[tool(description = "Log a change made on the CM3588. Call this after ANY change on the device.")]
    pub async fn log_change(
        &self,
        Parameters(params): Parameters<LogChangeParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(what = %params.what, "Running log_change tool");

        require("what", &params.what)?;

        let entry = self
            .resolve::<KnowledgeService>()
            .log_change(
                &params.what,
                &params.why,
                &params.details,
                params.files_changed,
                params.commands_run,
            )
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response::json(LoggedChangeResult {
            id: entry.id,
            timestamp: entry.timestamp,
            what: entry.what,
        })
        .into()
    }

    #[tool(description = "Save a solved problem (problem, solution, steps) to the knowledge base under troubleshooting.")]
    pub async fn log_solution(
        &self,
        Parameters(params): Parameters<LogSolutionParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(steps = params.steps.len(), "Running log_solution tool");

        require("problem", &params.problem)?;

        let entry = self
            .resolve::<KnowledgeService>()
            .log_solution(&params.problem, &params.solution, &params.steps)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response::json(SavedEntryResult::from(&entry)).into()
    }

    #[tool(description = "Get the change history, newest first.")]
    pub async fn get_changelog(
        &self,
        Parameters(params): Parameters<GetChangelogParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(limit = params.limit, "Running get_changelog tool");

        let entries: Vec<ChangeSummaryResult> = self
            .resolve::<ChangelogRepository>()
            .get_changelog(params.limit)
            .await
            .map_err(|e: AppError| McpError::from(e))?
            .into_iter()
            .map(Into::into)
            .collect();

        let count = entries.len();
        Response(ChangelogResult { entries, count }, params.format).into()
    }

    #[tool(description = "Semantic search over the change history.")]
    pub async fn search_changelog(
        &self,
        Parameters(params): Parameters<SearchChangelogParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(query = %params.query, limit = params.limit, "Running search_changelog tool");

        require("query", &params.query)?;

        let entries: Vec<ChangeSummaryResult> = self
            .resolve::<ChangelogRepository>()
            .search_changelog(&params.query, params.limit)
            .await
            .map_err(|e: AppError| McpError::from(e))?
            .into_iter()
            .map(|hit| ChangeSummaryResult {
                score: Some(hit.score),
                ..hit.record.into()
            })
            .collect();

        let count = entries.len();
        Response(ChangelogResult { entries, count }, params.format).into()
    }
}
