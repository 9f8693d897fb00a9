//! Documentation tools - turn device state into knowledge entries.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::Deserialize;

use super::knowledge::SavedEntryResult;
use super::require;
use crate::error::AppError;
use crate::mcp::protocol::Response;
use crate::mcp::server::McpServer;
use crate::services::KnowledgeService;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DocumentConfigParams {
    /// Service name (whisper, piper, ...).
    pub service_name: String,
    /// Path of the config file on the device.
    pub config_path: String,
    /// What this config controls.
    pub description: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHowtoParams {
    /// Guide title.
    pub title: String,
    /// Steps, in order.
    pub steps: Vec<String>,
    /// Category for the guide.
    pub category: String,
    /// Extra tags; "howto" is always added.
    #[serde(default)]
    pub tags: Vec<String>,
}

#[tool_router(router = documentation_tools, vis = "pub(crate)")]
impl McpServer {
    /// Snapshot a config file from the device into the knowledge base.
    #[tool(description = "Read a service config file from the CM3588 and save it to the knowledge base.")]
    pub async fn document_config(
        &self,
        Parameters(params): Parameters<DocumentConfigParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(service = %params.service_name, path = %params.config_path, "Running document_config tool");

        require("service_name", &params.service_name)?;
        require("config_path", &params.config_path)?;

        let entry = self
            .resolve::<KnowledgeService>()
            .document_config(&params.service_name, &params.config_path, &params.description)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response::json(SavedEntryResult::from(&entry)).into()
    }

    #[tool(description = "Create a step-by-step how-to guide in the knowledge base.")]
    pub async fn create_howto(
        &self,
        Parameters(params): Parameters<CreateHowtoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(title = %params.title, steps = params.steps.len(), "Running create_howto tool");

        require("title", &params.title)?;
        require("category", &params.category)?;

        let entry = self
            .resolve::<KnowledgeService>()
            .create_howto(&params.title, &params.steps, &params.category, params.tags)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response::json(SavedEntryResult::from(&entry)).into()
    }
}
