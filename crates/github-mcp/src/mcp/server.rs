use crate::catalog;
use crate::state::AppState;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, InitializeRequestParams,
    InitializeResult, ListResourcesResult, ListToolsResult, PaginatedRequestParams,
    ProtocolVersion, ReadResourceRequestParams, ReadResourceResult, ServerCapabilities,
    ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};

const INSTRUCTIONS: &str = "GitHub tools. Calls without owner/repo use the runtime default \
(set_default_repo) or the configured default repository.";

/// MCP handler over the tool catalog. One clone serves each session.
#[derive(Clone)]
pub struct GitHubMcp {
    state: AppState,
}

impl GitHubMcp {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl ServerHandler for GitHubMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: self.state.settings.server_name.clone(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    /// Answers with the protocol version the client asked for.
    async fn initialize(
        &self,
        request: InitializeRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        let protocol_version = request.protocol_version.clone();
        tracing::debug!(
            client = %request.client_info.name,
            protocol_version = %protocol_version,
            "mcp session initialized"
        );
        if context.peer.peer_info().is_none() {
            context.peer.set_peer_info(request);
        }
        Ok(InitializeResult {
            protocol_version,
            ..self.get_info()
        })
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(catalog::list_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request.arguments.unwrap_or_default();
        catalog::call_tool(&self.state, &request.name, &arguments)
            .await
            .map_err(|e| {
                tracing::debug!(tool = %request.name, error = %e, "tool call rejected");
                McpError::invalid_params(e.to_string(), None)
            })
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(
            catalog::list_resources(),
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match catalog::read_resource(&self.state, &request.uri).await {
            None => Err(McpError::resource_not_found(
                format!("Unknown resource: {}", request.uri),
                None,
            )),
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(McpError::internal_error(message, None)),
        }
    }
}
