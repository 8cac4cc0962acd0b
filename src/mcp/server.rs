//! stdio MCP server exposing the baseball tools.

use super::protocol::*;
use crate::tools::{tool_definitions, ToolDispatcher};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "bullpen";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP server over newline-delimited JSON-RPC.
pub struct McpServer {
    dispatcher: Arc<ToolDispatcher>,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(dispatcher: Arc<ToolDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Serve stdin/stdout until stdin closes.
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("MCP server starting on stdio");
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve any line-oriented reader/writer pair.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let Some(response) = self.handle_line(&line).await else {
                continue;
            };

            let mut out = serde_json::to_string(&response)?;
            out.push('\n');
            writer.write_all(out.as_bytes()).await?;
            writer.flush().await?;
        }

        info!("MCP client closed stdin");
        Ok(())
    }

    /// Handle one line; notifications produce no response.
    async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"));
            }
        };

        if request.is_notification() {
            debug!("notification {}", request.method);
            return None;
        }

        Some(self.handle_request(request).await)
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                request.id,
                &InitializeResult {
                    protocol_version: PROTOCOL_VERSION,
                    capabilities: json!({ "tools": { "listChanged": false } }),
                    server_info: ServerInfo {
                        name: SERVER_NAME,
                        version: SERVER_VERSION,
                    },
                },
            ),
            "ping" => JsonRpcResponse::success(request.id, &json!({})),
            "tools/list" => JsonRpcResponse::success(
                request.id,
                &ToolsListResult {
                    tools: tool_definitions().iter().map(Tool::from).collect(),
                },
            ),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, &format!("Invalid params: {}", e))
            }
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let result = match self.dispatcher.dispatch(&params.name, params.arguments).await {
            Ok(value) => ToolCallResult::json(&value),
            Err(e) => ToolCallResult::error(format!("{} failed: {}", params.name, e)),
        };

        JsonRpcResponse::success(id, &result)
    }
}
