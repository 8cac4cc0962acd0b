//! Chat-completion backends.

use super::exchange::{Exchange, ModelReply, ToolCallRequest, Turn};
use crate::config::ModelSettings;
use crate::error::{BullpenError, Result};
use crate::openai::create_client;
use crate::tools::ToolDefinition;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionResponseMessage, ChatCompletionTool, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// A model that answers an exchange with text or tool calls.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the whole exchange plus the invocable tools and return the reply.
    async fn complete(&self, exchange: &Exchange, tools: &[ToolDefinition]) -> Result<ModelReply>;
}

/// Model reached over an OpenAI-compatible chat-completion API.
pub struct OpenAIChatModel {
    client: async_openai::Client<OpenAIConfig>,
    model: String,
}

impl OpenAIChatModel {
    /// Create a model client from settings.
    pub fn new(settings: &ModelSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
        })
    }

    /// Use a different model identifier on the same endpoint.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, exchange, tools), fields(model = %self.model, turns = exchange.len()))]
    async fn complete(&self, exchange: &Exchange, tools: &[ToolDefinition]) -> Result<ModelReply> {
        let messages = exchange
            .turns()
            .iter()
            .map(to_request_message)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(model_error)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .tools(tool_schemas(tools))
            .build()
            .map_err(model_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| BullpenError::Model(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BullpenError::Model("No response from model".to_string()))?;

        debug!("model finished with {:?}", choice.finish_reason);
        Ok(parse_reply(choice.message))
    }
}

/// Function schemas for every tool, in registry order.
pub fn tool_schemas(tools: &[ToolDefinition]) -> Vec<ChatCompletionTool> {
    tools
        .iter()
        .map(|tool| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: tool.name.to_string(),
                description: Some(tool.description.to_string()),
                parameters: Some(tool.input_schema()),
                strict: None,
            },
        })
        .collect()
}

fn to_request_message(turn: &Turn) -> std::result::Result<ChatCompletionRequestMessage, OpenAIError> {
    let message = match turn {
        Turn::System { content } => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()?
            .into(),
        Turn::User { content } => ChatCompletionRequestUserMessageArgs::default()
            .content(content.clone())
            .build()?
            .into(),
        Turn::Assistant {
            content,
            tool_calls,
        } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(content) = content {
                args.content(content.clone());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(tool_calls.iter().map(to_message_tool_call).collect::<Vec<_>>());
            }
            args.build()?.into()
        }
        Turn::ToolResult {
            call_id, content, ..
        } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id.clone())
            .content(content.clone())
            .build()?
            .into(),
    };
    Ok(message)
}

fn to_message_tool_call(call: &ToolCallRequest) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: call.id.clone(),
        r#type: ChatCompletionToolType::Function,
        function: FunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        },
    }
}

/// Interpret a response message: any tool calls win over text.
fn parse_reply(message: ChatCompletionResponseMessage) -> ModelReply {
    match message.tool_calls {
        Some(calls) if !calls.is_empty() => ModelReply::ToolCalls(
            calls
                .into_iter()
                .map(|call| ToolCallRequest {
                    id: call.id,
                    name: call.function.name,
                    arguments: call.function.arguments,
                })
                .collect(),
        ),
        _ => ModelReply::Text(message.content.unwrap_or_default()),
    }
}

fn model_error(e: OpenAIError) -> BullpenError {
    BullpenError::Model(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tool_definitions;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Chat-completion endpoint that always answers 429, counting requests.
    async fn spawn_rate_limited_endpoint() -> (String, Arc<AtomicU32>) {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (
                        StatusCode::TOO_MANY_REQUESTS,
                        Json(json!({"error": {
                            "message": "Rate limit reached",
                            "type": "requests",
                            "param": null,
                            "code": "rate_limit_exceeded"
                        }})),
                    )
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v1", addr), hits)
    }

    fn response_message(value: serde_json::Value) -> ChatCompletionResponseMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_tool_schemas_follow_registry() {
        let schemas = tool_schemas(tool_definitions());
        assert_eq!(schemas.len(), 5);
        assert_eq!(schemas[0].function.name, "today_games");
        assert_eq!(
            schemas[4].function.parameters,
            Some(json!({
                "type": "object",
                "properties": {"gamePk": {"type": "integer"}},
                "required": ["gamePk"]
            }))
        );
    }

    #[test]
    fn test_parse_text_reply() {
        let message = response_message(json!({
            "role": "assistant",
            "content": "The Yankees won 5-3."
        }));
        assert_eq!(
            parse_reply(message),
            ModelReply::Text("The Yankees won 5-3.".to_string())
        );
    }

    #[test]
    fn test_parse_tool_call_reply() {
        let message = response_message(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_0",
                "type": "function",
                "function": {"name": "today_games", "arguments": "{\"date\":\"2024-05-01\"}"}
            }]
        }));
        assert_eq!(
            parse_reply(message),
            ModelReply::ToolCalls(vec![ToolCallRequest {
                id: "call_0".to_string(),
                name: "today_games".to_string(),
                arguments: r#"{"date":"2024-05-01"}"#.to_string(),
            }])
        );
    }

    #[test]
    fn test_empty_tool_calls_are_text() {
        let message = response_message(json!({
            "role": "assistant",
            "content": "done",
            "tool_calls": []
        }));
        assert_eq!(parse_reply(message), ModelReply::Text("done".to_string()));
    }

    #[test]
    fn test_exchange_converts_to_request_messages() {
        let mut exchange = Exchange::new("sys", "What games are on 2024-05-01?");
        exchange.push_tool_exchange(
            ToolCallRequest {
                id: "call_0".to_string(),
                name: "today_games".to_string(),
                arguments: r#"{"date":"2024-05-01"}"#.to_string(),
            },
            "[]".to_string(),
        );

        let messages: Vec<ChatCompletionRequestMessage> = exchange
            .turns()
            .iter()
            .map(|t| to_request_message(t).unwrap())
            .collect();

        let roles: Vec<String> = messages
            .iter()
            .map(|m| serde_json::to_value(m).unwrap()["role"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(roles, ["system", "user", "assistant", "tool"]);

        let tool = serde_json::to_value(&messages[3]).unwrap();
        assert_eq!(tool["tool_call_id"], "call_0");
    }

    #[tokio::test]
    async fn test_rate_limited_call_fails_without_retry() {
        let (base_url, hits) = spawn_rate_limited_endpoint().await;
        let model = OpenAIChatModel::new(&ModelSettings {
            base_url,
            model: "llama3".to_string(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
        })
        .unwrap();

        let exchange = Exchange::new("sys", "Who won last night?");
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            model.complete(&exchange, tool_definitions()),
        )
        .await
        .expect("model call should fail fast");

        assert!(matches!(result, Err(BullpenError::Model(_))));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
