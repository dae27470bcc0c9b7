//! MCP server implementation.
//!
//! A registry of tools behind a JSON-RPC 2.0 stdio loop. Tools are
//! registered once at startup with their dependencies injected; each
//! invocation runs as an independent task with no shared mutable state.

use crate::types::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// MCP protocol version implemented by this server.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server error types.
#[derive(Debug, Error)]
pub enum McpServerError {
    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution failed
    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    /// Transport I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for MCP server operations.
pub type McpServerResult<T> = Result<T, McpServerError>;

/// Trait for tool implementations.
///
/// A tool validates its arguments, performs exactly one remote operation,
/// and renders the outcome as a [`ToolResult`] envelope. Implementations
/// must not let failures escape `execute`; every outcome is an envelope.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with given arguments.
    async fn execute(&self, args: serde_json::Value) -> McpServerResult<ToolResult>;
}

/// MCP server holding the tool registry.
pub struct McpServer {
    /// Server info
    info: ServerInfo,

    /// Server capabilities
    capabilities: ServerCapabilities,

    /// Registered tools
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolCapabilities { list_changed: true }),
                experimental: HashMap::new(),
            },
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create with the default server identity.
    pub fn dooray() -> Self {
        Self::new("dooray-mcp-server", env!("CARGO_PKG_VERSION"))
    }

    /// Register a tool.
    pub async fn register_tool(&self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        let mut tools = self.tools.write().await;
        tools.insert(name, tool);
    }

    /// Register multiple tools.
    pub async fn register_tools(&self, tools: Vec<Arc<dyn Tool>>) {
        for tool in tools {
            self.register_tool(tool).await;
        }
    }

    /// Get all tool definitions.
    pub async fn list_tools(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        let mut definitions: Vec<_> = tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Execute a tool by name.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> McpServerResult<ToolResult> {
        let tool = {
            let tools = self.tools.read().await;
            tools
                .get(name)
                .cloned()
                .ok_or_else(|| McpServerError::ToolNotFound(name.to_string()))?
        };

        tool.execute(arguments).await
    }

    /// Handle an MCP request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        let Some(id) = request.id else {
            debug!("notification: {}", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => McpResponse::success(id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(id).await,
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => McpResponse::error(id, McpError::method_not_found(&request.method)),
        };

        Some(response)
    }

    fn handle_initialize(&self, id: RequestId) -> McpResponse {
        McpResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": self.capabilities,
                "serverInfo": self.info
            }),
        )
    }

    async fn handle_tools_list(&self, id: RequestId) -> McpResponse {
        let tools = self.list_tools().await;
        McpResponse::success(id, serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(
        &self,
        id: RequestId,
        params: Option<serde_json::Value>,
    ) -> McpResponse {
        let params = match params {
            Some(p) => p,
            None => return McpResponse::error(id, McpError::invalid_params("Missing params")),
        };

        let call: ToolCall = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return McpResponse::error(id, McpError::invalid_params(e.to_string())),
        };

        let arguments = if call.arguments.is_null() {
            serde_json::json!({})
        } else {
            call.arguments
        };

        match self.call_tool(&call.name, arguments).await {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(value) => McpResponse::success(id, value),
                Err(e) => McpResponse::error(id, McpError::internal_error(e.to_string())),
            },
            Err(e) => McpResponse::error(id, McpError::internal_error(e.to_string())),
        }
    }

    /// Serve MCP over stdio, one JSON-RPC message per line.
    ///
    /// Runs until EOF on stdin. stdout carries protocol messages only; all
    /// logging goes to stderr via tracing.
    pub async fn run_stdio(&self) -> McpServerResult<()> {
        info!("Starting MCP server on stdio");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);

        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                info!("EOF received, shutting down");
                break;
            }

            let message = line.trim();
            if message.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<McpRequest>(message) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    warn!("unparseable request: {e}");
                    Some(McpResponse::error(
                        RequestId::Null,
                        McpError::parse_error(e.to_string()),
                    ))
                }
            };

            if let Some(response) = response {
                let serialized = serde_json::to_string(&response)
                    .map_err(|e| McpServerError::ExecutionError(e.to_string()))?;
                stdout.write_all(serialized.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        Ok(())
    }

    /// Get server info.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Get server capabilities.
    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestTool;

    #[async_trait]
    impl Tool for TestTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("test_tool", "A test tool").with_category("test")
        }

        async fn execute(&self, _args: serde_json::Value) -> McpServerResult<ToolResult> {
            Ok(ToolResult::text("Test result"))
        }
    }

    #[tokio::test]
    async fn test_server_creation() {
        let server = McpServer::dooray();
        assert_eq!(server.info().name, "dooray-mcp-server");
    }

    #[tokio::test]
    async fn test_register_and_list() {
        let server = McpServer::dooray();
        server.register_tool(Arc::new(TestTool)).await;

        let tools = server.list_tools().await;
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "test_tool");
    }

    #[tokio::test]
    async fn test_call_tool() {
        let server = McpServer::dooray();
        server.register_tool(Arc::new(TestTool)).await;

        let result = server
            .call_tool("test_tool", serde_json::json!({}))
            .await
            .unwrap();
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let server = McpServer::dooray();
        let err = server
            .call_tool("nope", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, McpServerError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let server = McpServer::dooray();
        let req = McpRequest::new(1i64, "initialize");
        let resp = server.handle_request(req).await.unwrap();

        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "dooray-mcp-server");
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = McpServer::dooray();
        let req: McpRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(server.handle_request(req).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = McpServer::dooray();
        let req = McpRequest::new(1i64, "resources/list");
        let resp = server.handle_request(req).await.unwrap();
        assert_eq!(resp.error.unwrap().code, McpError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tools_call_without_params() {
        let server = McpServer::dooray();
        let req = McpRequest::new(1i64, "tools/call");
        let resp = server.handle_request(req).await.unwrap();
        assert_eq!(resp.error.unwrap().code, McpError::INVALID_PARAMS);
    }
}
