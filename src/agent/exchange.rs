//! Turn history of one resolution run.

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRequest {
    /// Backend-assigned call id, echoed on the matching tool result.
    pub id: String,
    pub name: String,
    /// Raw JSON arguments exactly as the model produced them.
    pub arguments: String,
}

/// One entry in an [`Exchange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCallRequest>,
    },
    ToolResult {
        call_id: String,
        name: String,
        content: String,
    },
}

/// What the model answered on one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// Final text for the caller.
    Text(String),
    /// Tools to run before asking again, in the order given.
    ToolCalls(Vec<ToolCallRequest>),
}

/// Append-only turn sequence owned by a single resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exchange {
    turns: Vec<Turn>,
}

impl Exchange {
    /// Seed a run with its system instruction and the user's prompt.
    pub fn new(system_prompt: &str, prompt: &str) -> Self {
        Self {
            turns: vec![
                Turn::System {
                    content: system_prompt.to_string(),
                },
                Turn::User {
                    content: prompt.to_string(),
                },
            ],
        }
    }

    /// Record one tool call and its result.
    ///
    /// The assistant turn carrying the call is always immediately followed by
    /// its result; chat backends reject results that are not paired this way.
    pub fn push_tool_exchange(&mut self, call: ToolCallRequest, result: String) {
        let call_id = call.id.clone();
        let name = call.name.clone();
        self.turns.push(Turn::Assistant {
            content: None,
            tool_calls: vec![call],
        });
        self.turns.push(Turn::ToolResult {
            call_id,
            name,
            content: result,
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
