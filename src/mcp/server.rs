//! MCP Server implementation
//!
//! Serves the OTC ECS tools over stdio to a single connected client.

use super::types::*;
use crate::ecs::EcsClient;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// MCP server exposing the ECS operations as tools.
pub struct McpServer {
    ecs: Arc<EcsClient>,
    /// Whether the client completed the initialize handshake
    initialized: bool,
}

impl McpServer {
    pub fn new(ecs: Arc<EcsClient>) -> Self {
        Self {
            ecs,
            initialized: false,
        }
    }

    /// Run the MCP server over stdio until the input stream closes.
    pub async fn run_stdio(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        info!("MCP server starting on stdio");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                // EOF
                break;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!(request = %line, "Received MCP request");

            let response = self.handle_message(line).await;

            if let Some(response) = response {
                let response_str = serde_json::to_string(&response)?;
                debug!(response = %response_str, "Sending MCP response");
                stdout.write_all(response_str.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle a single JSON-RPC message
    async fn handle_message(&mut self, message: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                error!(error = %e, "Failed to parse JSON-RPC request");
                return Some(JsonRpcResponse::error(
                    JsonRpcId::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(&request),
            "initialized" => {
                // Notification, no response
                self.initialized = true;
                info!("MCP client initialized");
                return None;
            }
            "tools/list" => self.handle_tools_list(&request),
            "tools/call" => self.handle_tools_call(&request).await,
            "ping" => Ok(json!({})),
            method => {
                warn!(method = %method, "Unknown MCP method");
                Err((METHOD_NOT_FOUND, format!("Method not found: {}", method)))
            }
        };

        match result {
            Ok(value) => Some(JsonRpcResponse::success(request.id, value)),
            Err((code, message)) => Some(JsonRpcResponse::error(request.id, code, message)),
        }
    }

    /// Handle initialize request
    fn handle_initialize(
        &mut self,
        _request: &JsonRpcRequest,
    ) -> Result<serde_json::Value, (i32, String)> {
        let result = InitializeResult {
            protocol_version: "2024-11-05".to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: "otc-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Manage Elastic Cloud Servers in an Open Telekom Cloud project. \
                 Use the available tools to list servers and flavors, inspect a \
                 server, and start, stop or reboot it."
                    .to_string(),
            ),
        };

        serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, e.to_string()))
    }

    /// Handle tools/list request
    fn handle_tools_list(
        &self,
        _request: &JsonRpcRequest,
    ) -> Result<serde_json::Value, (i32, String)> {
        let tools = vec![
            Tool {
                name: "list_ecs_servers".to_string(),
                description: "List all Elastic Cloud Servers in your OTC project".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
            Tool {
                name: "get_ecs_details".to_string(),
                description: "Get details of a specific ECS server".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "server_id": {
                            "type": "string",
                            "description": "The ECS server ID"
                        }
                    },
                    "required": ["server_id"]
                }),
            },
            Tool {
                name: "start_ecs_server".to_string(),
                description: "Start a stopped ECS server".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "server_id": {
                            "type": "string",
                            "description": "The ECS server ID to start"
                        }
                    },
                    "required": ["server_id"]
                }),
            },
            Tool {
                name: "stop_ecs_server".to_string(),
                description: "Stop a running ECS server".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "server_id": {
                            "type": "string",
                            "description": "The ECS server ID to stop"
                        }
                    },
                    "required": ["server_id"]
                }),
            },
            Tool {
                name: "reboot_ecs_server".to_string(),
                description: "Reboot an ECS server".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "server_id": {
                            "type": "string",
                            "description": "The ECS server ID"
                        },
                        "type": {
                            "type": "string",
                            "description": "Reboot type",
                            "enum": ["SOFT", "HARD"],
                            "default": "SOFT"
                        }
                    },
                    "required": ["server_id"]
                }),
            },
            Tool {
                name: "list_flavors".to_string(),
                description: "List available ECS flavors (instance types)".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
        ];

        let result = ToolsListResult { tools };
        serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, e.to_string()))
    }

    /// Handle tools/call request
    async fn handle_tools_call(
        &self,
        request: &JsonRpcRequest,
    ) -> Result<serde_json::Value, (i32, String)> {
        let params: ToolCallParams = request
            .params
            .as_ref()
            .and_then(|p| serde_json::from_value(p.clone()).ok())
            .ok_or_else(|| (INVALID_PARAMS, "Missing or invalid params".to_string()))?;

        let result = match params.name.as_str() {
            "list_ecs_servers" => self.tool_list_servers().await,
            "get_ecs_details" => self.tool_get_details(params.arguments).await,
            "start_ecs_server" => self.tool_start_server(params.arguments).await,
            "stop_ecs_server" => self.tool_stop_server(params.arguments).await,
            "reboot_ecs_server" => self.tool_reboot_server(params.arguments).await,
            "list_flavors" => self.tool_list_flavors().await,
            tool => {
                return Err((INVALID_PARAMS, format!("Unknown tool: {}", tool)));
            }
        };

        let result = match result {
            Ok(text) => ToolCallResult {
                content: vec![ToolContent::Text { text }],
                is_error: None,
            },
            Err(e) => ToolCallResult {
                content: vec![ToolContent::Text { text: e }],
                is_error: Some(true),
            },
        };

        serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, e.to_string()))
    }

    /// Tool: list_ecs_servers
    async fn tool_list_servers(&self) -> Result<String, String> {
        self.ecs.list_servers().await.map_err(|e| e.to_string())
    }

    /// Tool: get_ecs_details
    async fn tool_get_details(&self, args: serde_json::Value) -> Result<String, String> {
        let args: ServerIdArgs = serde_json::from_value(args)
            .map_err(|e| format!("Invalid arguments: {}. server_id is required.", e))?;

        self.ecs
            .get_server(&args.server_id)
            .await
            .map_err(|e| e.to_string())
    }

    /// Tool: start_ecs_server
    async fn tool_start_server(&self, args: serde_json::Value) -> Result<String, String> {
        let args: ServerIdArgs = serde_json::from_value(args)
            .map_err(|e| format!("Invalid arguments: {}. server_id is required.", e))?;

        self.ecs
            .start_server(&args.server_id)
            .await
            .map_err(|e| e.to_string())
    }

    /// Tool: stop_ecs_server
    async fn tool_stop_server(&self, args: serde_json::Value) -> Result<String, String> {
        let args: ServerIdArgs = serde_json::from_value(args)
            .map_err(|e| format!("Invalid arguments: {}. server_id is required.", e))?;

        self.ecs
            .stop_server(&args.server_id)
            .await
            .map_err(|e| e.to_string())
    }

    /// Tool: reboot_ecs_server
    async fn tool_reboot_server(&self, args: serde_json::Value) -> Result<String, String> {
        let args: RebootArgs = serde_json::from_value(args).map_err(|e| {
            format!(
                "Invalid arguments: {}. server_id is required and type must be SOFT or HARD.",
                e
            )
        })?;

        self.ecs
            .reboot_server(&args.server_id, args.reboot_type)
            .await
            .map_err(|e| e.to_string())
    }

    /// Tool: list_flavors
    async fn tool_list_flavors(&self) -> Result<String, String> {
        self.ecs.list_flavors().await.map_err(|e| e.to_string())
    }
}
