//! Control channel: direct tool invocation over a duplex text connection.
//!
//! Messages are JSON objects tagged by `type`. The server sends `tools` on
//! connect and answers every inbound message with exactly one reply, in
//! receipt order. Errors are reported as messages and never end the session.

use crate::tools::{tool_definitions, ToolDispatcher};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Server-to-client message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Registered tool descriptors.
    Tools { tools: Vec<Value> },
    /// Result of a `call_tool` request.
    ToolResult { name: String, result: Value },
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl ServerMessage {
    /// The full registry, in stable order.
    pub fn tools() -> Self {
        ServerMessage::Tools {
            tools: tool_definitions().iter().map(|t| t.descriptor()).collect(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        ServerMessage::Error {
            error: error.into(),
            name: None,
        }
    }

    /// Serialize for the wire.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","error":"serialization failed: {}"}}"#, e)
        })
    }
}

/// One connected control client.
///
/// Holds no state between messages beyond the dispatcher handle.
pub struct ControlSession {
    dispatcher: Arc<ToolDispatcher>,
}

impl ControlSession {
    pub fn new(dispatcher: Arc<ToolDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Message sent as soon as the connection opens.
    pub fn greeting(&self) -> ServerMessage {
        ServerMessage::tools()
    }

    /// Handle one inbound text frame and produce its reply.
    pub async fn handle_text(&self, raw: &str) -> ServerMessage {
        let message = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                debug!("rejecting malformed control message");
                return ServerMessage::error("invalid_json");
            }
        };

        match message.get("type").and_then(Value::as_str) {
            Some("list_tools") => ServerMessage::tools(),
            Some("call_tool") => {
                let Some(name) = message.get("name").and_then(Value::as_str) else {
                    return ServerMessage::error("missing_tool_name");
                };
                let arguments = message.get("arguments").cloned().unwrap_or(Value::Null);
                self.call_tool(name, arguments).await
            }
            other => {
                let kind = match other {
                    Some(kind) => kind.to_string(),
                    None => message
                        .get("type")
                        .map(Value::to_string)
                        .unwrap_or_else(|| "null".to_string()),
                };
                ServerMessage::error(format!("unknown_type:{}", kind))
            }
        }
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ServerMessage {
        match self.dispatcher.dispatch(name, arguments).await {
            Ok(result) => ServerMessage::ToolResult {
                name: name.to_string(),
                result,
            },
            Err(e) => {
                warn!("tool {} failed: {}", name, e);
                ServerMessage::Error {
                    error: e.to_string(),
                    name: Some(name.to_string()),
                }
            }
        }
    }
}
