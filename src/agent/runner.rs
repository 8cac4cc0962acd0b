//! Bounded model/tool resolution loop.

use super::exchange::{Exchange, ModelReply, ToolCallRequest};
use super::model::ChatModel;
use crate::error::{BullpenError, Result};
use crate::tools::{tool_definitions, ToolDispatcher};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Default system prompt for the resolver.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a baseball assistant. Prefer calling tools to fetch live data from MLB StatsAPI. \
Be concise; cite teams/players/games you used.";

/// Returned when the model keeps asking for tools until the step budget runs out.
pub const EXHAUSTED_MESSAGE: &str = "Could not resolve with tools after several attempts.";

/// Default number of model calls per request.
pub const DEFAULT_MAX_STEPS: usize = 4;

/// Drives one prompt to a final answer, interleaving model calls with tool
/// execution.
pub struct Resolver {
    model: Arc<dyn ChatModel>,
    dispatcher: Arc<ToolDispatcher>,
    max_steps: usize,
    system_prompt: String,
}

impl Resolver {
    /// Create a resolver with the default prompt and step budget.
    pub fn new(model: Arc<dyn ChatModel>, dispatcher: Arc<ToolDispatcher>) -> Self {
        Self {
            model,
            dispatcher,
            max_steps: DEFAULT_MAX_STEPS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set the maximum number of model calls.
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    /// Resolve `prompt`.
    ///
    /// Model failures abort the run. Tool failures do not: their error is
    /// handed back to the model as the tool result. Running out of steps is
    /// a normal outcome carrying [`EXHAUSTED_MESSAGE`].
    pub async fn resolve(&self, prompt: &str) -> Result<Resolution> {
        let mut exchange = Exchange::new(&self.system_prompt, prompt);
        let mut tool_calls = Vec::new();

        for step in 1..=self.max_steps {
            info!("LLM call step {}", step);

            match self.model.complete(&exchange, tool_definitions()).await? {
                ModelReply::Text(message) => {
                    info!("LLM returned final response");
                    return Ok(Resolution {
                        message,
                        outcome: Outcome::Answered,
                        steps: step,
                        tool_calls,
                    });
                }
                ModelReply::ToolCalls(calls) => {
                    for call in calls {
                        let record = self.execute_tool_call(&call).await;
                        exchange.push_tool_exchange(call, record.result.clone());
                        tool_calls.push(record);
                    }
                }
            }
        }

        warn!("Reached max tool resolution steps ({})", self.max_steps);
        Ok(Resolution {
            message: EXHAUSTED_MESSAGE.to_string(),
            outcome: Outcome::Exhausted,
            steps: self.max_steps,
            tool_calls,
        })
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, call: &ToolCallRequest) -> ToolCallRecord {
        info!("executing tool {} with args {}", call.name, call.arguments);

        let outcome = match parse_arguments(&call.name, &call.arguments) {
            Ok(arguments) => self.dispatcher.dispatch(&call.name, arguments).await,
            Err(e) => Err(e),
        };

        let result = match outcome {
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!("tool {} failed: {}", call.name, e);
                json!({ "error": e.to_string() }).to_string()
            }
        };

        ToolCallRecord {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
        }
    }
}

/// Blank arguments mean an empty object.
fn parse_arguments(tool: &str, raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(raw).map_err(|e| BullpenError::InvalidArguments {
        tool: tool.to_string(),
        reason: format!("arguments are not valid JSON: {}", e),
    })
}

/// How a resolution run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The model produced a final answer.
    Answered,
    /// The step budget ran out while the model still wanted tools.
    Exhausted,
}

/// Result of a resolution run.
#[derive(Debug)]
pub struct Resolution {
    /// Text for the caller.
    pub message: String,
    pub outcome: Outcome,
    /// Number of model calls made.
    pub steps: usize,
    /// Every tool call executed, in order.
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Record of a tool call made during resolution.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Serialized result (or error) fed back to the model.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
