//! Tool resolution for natural-language baseball questions.
//!
//! A [`Resolver`] sends the prompt and the tool schemas to a [`ChatModel`],
//! runs any tools it asks for, feeds the results back and stops at the first
//! plain-text answer or when its step budget is spent.

mod exchange;
mod model;
mod runner;

pub use exchange::{Exchange, ModelReply, ToolCallRequest, Turn};
pub use model::{tool_schemas, ChatModel, OpenAIChatModel};
pub use runner::{
    Outcome, Resolution, Resolver, ToolCallRecord, DEFAULT_MAX_STEPS, DEFAULT_SYSTEM_PROMPT,
    EXHAUSTED_MESSAGE,
};
