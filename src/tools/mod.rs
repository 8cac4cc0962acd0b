//! Baseball data tools.
//!
//! The registry describes each tool for the model and the control channel;
//! the dispatcher runs a named call against the StatsAPI client. Adding a
//! tool means one registry entry plus one [`ToolCall`] variant.

mod call;
mod dispatch;
mod registry;

pub use call::{ToolCall, UpstreamRequest};
pub use dispatch::{unknown_tool, ToolDispatcher};
pub use registry::{find_tool, tool_definitions, ParamSpec, ParamType, ToolDefinition};
