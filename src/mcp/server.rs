//! MCP server implementation for the CM3588 assistant.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, ServerHandler},
    model::{
        AnnotateAble, GetPromptRequestParam, GetPromptResult, Implementation,
        ListPromptsResult, ListResourcesResult, PaginatedRequestParam, Prompt, PromptMessage,
        PromptMessageRole, ProtocolVersion, RawResource, ReadResourceRequestParam,
        ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool_handler, ErrorData as McpError, RoleServer,
};

use super::{prompts, resources};
use crate::context::Context;
use crate::di::FromRef;
use crate::services::DeviceService;

/// MCP server for operating a CM3588 NAS.
///
/// This server provides AI assistants with tools to:
/// - Save and semantically search knowledge about the device
/// - Keep a changelog of every change made to it
/// - Run commands and inspect the device over SSH
/// - Read live status, configs and logs as resources
#[derive(Clone)]
pub struct McpServer {
    pub(crate) ctx: Arc<Context>,
    tool_router: ToolRouter<McpServer>,
}

impl McpServer {
    pub fn new(ctx: Context) -> Self {
        tracing::info!("Initializing CM3588 MCP server");

        Self {
            ctx: Arc::new(ctx),
            tool_router: Self::tool_router(),
        }
    }

    /// Build the combined tool router from all tool modules.
    fn tool_router() -> ToolRouter<Self> {
        Self::knowledge_tools()
            + Self::changelog_tools()
            + Self::documentation_tools()
            + Self::device_tools()
    }

    /// Resolve a dependency from the context.
    pub fn resolve<T: FromRef<Context>>(&self) -> T {
        T::from_ref(&self.ctx)
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = resources::RESOURCES
            .iter()
            .map(|def| {
                let mut raw = RawResource::new(def.uri, def.name);
                raw.description = Some(def.description.to_string());
                raw.mime_type = Some("text/markdown".to_string());
                raw.no_annotation()
            })
            .collect();

        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        tracing::info!(uri = %uri, "Reading resource");

        let device = self.resolve::<DeviceService>();
        match resources::read(&device, &uri).await {
            Some(text) => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(text, uri)],
            }),
            None => Err(McpError::resource_not_found(
                format!("Unknown resource: {}", uri),
                None,
            )),
        }
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        let prompts = prompts::PROMPTS
            .iter()
            .map(|def| Prompt::new(def.name, Some(def.description), None))
            .collect();

        Ok(ListPromptsResult::with_all_items(prompts))
    }

    async fn get_prompt(
        &self,
        GetPromptRequestParam { name, .. }: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        tracing::info!(name = %name, "Getting prompt");

        let prompt = prompts::find(&name).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown prompt: {}", name), None)
        })?;

        Ok(GetPromptResult {
            description: Some(prompt.description.to_string()),
            messages: vec![PromptMessage::new_text(
                PromptMessageRole::User,
                prompt.text,
            )],
        })
    }
}

const INSTRUCTIONS: &str = r#"CM3588 NAS assistant

Knowledge base, changelog and remote control for a FriendlyElec CM3588 (RK3588).

## Rules

- After ANY change on the device, call **log_change**.
- After solving a problem, call **log_solution**.
- Search the knowledge base before re-discovering something.

## Knowledge Tools

- **save_knowledge** - Save an entry (title, content, category, tags)
- **search_knowledge** - Semantic search, optional category filter
- **get_knowledge** - Full entry by ID
- **update_knowledge** - Replace or append content
- **delete_knowledge** - Delete an entry
- **list_categories** - Categories in use
- **list_knowledge** - Entries in a category

## Changelog Tools

- **log_change** - Record a change (what, why, details, files, commands)
- **log_solution** - Record a solved problem
- **get_changelog** - Recent changes, newest first
- **search_changelog** - Semantic search over changes

## Documentation Tools

- **document_config** - Save a config file from the device
- **create_howto** - Save a step-by-step guide

## Device Tools

- **run_command** - Run a shell command over SSH
- **read_remote_file** - Read a file
- **write_remote_file** - Write a file (then log_change)
- **get_system_info** - CPU, memory, disk, NPU, temperature, uptime
- **get_service_status** - systemd unit status
- **check_port** - Is a TCP port listening

## Resources

docs://hardware, docs://npu, docs://wyoming, docs://llm,
live://system, live://services, live://npu, live://network,
live://voice-pipeline, live://llm, config://whisper, config://piper,
config://docker-compose, logs://whisper, logs://piper, logs://system

Categories in use: hardware, voice-pipeline, npu, docker, troubleshooting.
"#;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rmcp::handler::server::wrapper::Parameters;
    use rmcp::model::{CallToolResult, ErrorCode};
    use serde_json::Value;

    use super::*;
    use crate::mcp::tools::device::{RunCommandParams, WriteRemoteFileParams};
    use crate::mcp::tools::knowledge::{EntryIdParams, SaveKnowledgeParams, SearchKnowledgeParams};
    use crate::remote::ScriptedRemote;

    fn server() -> McpServer {
        McpServer::new(Context::for_tests(Arc::new(ScriptedRemote::new())))
    }

    fn json_of(result: CallToolResult) -> Value {
        let value = serde_json::to_value(result).unwrap();
        serde_json::from_str(value["content"][0]["text"].as_str().unwrap()).unwrap()
    }

    fn save_params(title: &str) -> SaveKnowledgeParams {
        SaveKnowledgeParams {
            title: title.to_string(),
            content: "Whisper on port 10300".to_string(),
            category: "voice-pipeline".to_string(),
            tags: vec![],
            metadata: None,
        }
    }

    #[test]
    fn test_all_tools_registered() {
        let mut names: Vec<String> = server()
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "check_port",
                "create_howto",
                "delete_knowledge",
                "document_config",
                "get_changelog",
                "get_knowledge",
                "get_service_status",
                "get_system_info",
                "list_categories",
                "list_knowledge",
                "log_change",
                "log_solution",
                "read_remote_file",
                "run_command",
                "save_knowledge",
                "search_changelog",
                "search_knowledge",
                "update_knowledge",
                "write_remote_file",
            ]
        );
    }

    #[test]
    fn test_capabilities() {
        let info = server().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.capabilities.prompts.is_some());
    }

    #[tokio::test]
    async fn test_save_then_search() {
        let server = server();
        let saved = json_of(
            server
                .save_knowledge(Parameters(save_params("Voice Pipeline")))
                .await
                .unwrap(),
        );
        let id = saved["id"].as_str().unwrap().to_string();

        let found = json_of(
            server
                .search_knowledge(Parameters(SearchKnowledgeParams {
                    query: "whisper port".to_string(),
                    category: Some("voice-pipeline".to_string()),
                    limit: 5,
                    format: None,
                }))
                .await
                .unwrap(),
        );
        assert_eq!(found["count"], 1);
        assert_eq!(found["results"][0]["id"], id.as_str());
        assert_eq!(found["results"][0]["preview"], "Whisper on port 10300");
    }

    #[tokio::test]
    async fn test_blank_title_is_invalid() {
        let err = server()
            .save_knowledge(Parameters(save_params(" ")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_get_missing_entry_is_not_an_error() {
        let missing = json_of(
            server()
                .get_knowledge(Parameters(EntryIdParams {
                    id: "00000000-0000-4000-8000-000000000000".to_string(),
                }))
                .await
                .unwrap(),
        );
        assert_eq!(missing["found"], false);
        assert_eq!(missing["id"], "00000000-0000-4000-8000-000000000000");
    }

    #[tokio::test]
    async fn test_blank_category_searches_everything() {
        let server = server();
        server
            .save_knowledge(Parameters(save_params("Voice Pipeline")))
            .await
            .unwrap();
        server
            .save_knowledge(Parameters(SaveKnowledgeParams {
                category: "docker".to_string(),
                ..save_params("Whisper container")
            }))
            .await
            .unwrap();

        for category in [None, Some(""), Some("  ")] {
            let found = json_of(
                server
                    .search_knowledge(Parameters(SearchKnowledgeParams {
                        query: "whisper port".to_string(),
                        category: category.map(str::to_string),
                        limit: 5,
                        format: None,
                    }))
                    .await
                    .unwrap(),
            );
            assert_eq!(found["count"], 2, "category {:?}", category);
        }
    }

    #[tokio::test]
    async fn test_write_remote_file_goes_through_executor() {
        let remote = Arc::new(ScriptedRemote::new());
        let server = McpServer::new(Context::for_tests(remote.clone()));

        let result = json_of(
            server
                .write_remote_file(Parameters(WriteRemoteFileParams {
                    path: "/etc/wyoming/piper.env".to_string(),
                    content: "VOICE=ru_RU-irina-medium\n".to_string(),
                }))
                .await
                .unwrap(),
        );
        assert_eq!(result["written"], true);
        assert_eq!(result["bytes"], 25);

        let writes = remote.writes.lock().unwrap().clone();
        assert_eq!(
            writes,
            vec![(
                "/etc/wyoming/piper.env".to_string(),
                "VOICE=ru_RU-irina-medium\n".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_write_remote_file_requires_path() {
        let err = server()
            .write_remote_file(Parameters(WriteRemoteFileParams {
                path: "".to_string(),
                content: "x".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_run_command_reports_unreachable_device() {
        let output = json_of(
            server()
                .run_command(Parameters(RunCommandParams {
                    command: "uptime".to_string(),
                    timeout_secs: None,
                }))
                .await
                .unwrap(),
        );
        assert_eq!(output["exit_code"], -1);
        assert_eq!(output["success"], false);
    }
}
