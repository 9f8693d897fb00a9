//! MCP server command handler.

use color_eyre::Result;
use rmcp::ServiceExt;

use crate::config::Config;
use crate::context::Context;
use crate::mcp::McpServer;

use super::App;

impl App {
    /// Run the MCP server with stdio transport.
    ///
    /// Nothing connects at startup: the index, the embedding model and the
    /// SSH session are set up by the first tool call that needs them.
    pub async fn run_mcp(&self) -> Result<()> {
        tracing::info!("Starting CM3588 MCP server");

        let config = Config::load()?;
        tracing::info!(
            host = %config.ssh.host,
            index = %config.index.url,
            "Loaded configuration"
        );

        let ctx = Context::from_config(config)?;
        let server = McpServer::new(ctx);

        let service = server.serve(rmcp::transport::stdio()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to start MCP server");
            color_eyre::eyre::eyre!("Failed to start MCP server: {}", e)
        })?;

        tracing::info!("MCP server started, waiting for connections");

        service.waiting().await.map_err(|e| {
            tracing::error!(error = %e, "MCP server error");
            color_eyre::eyre::eyre!("MCP server error: {}", e)
        })?;

        tracing::info!("MCP server shutting down");
        Ok(())
    }
}
