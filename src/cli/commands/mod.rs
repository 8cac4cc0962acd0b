//! CLI command implementations.

mod ask;
mod config;
mod mcp;
mod serve;
mod tools;

pub use ask::run_ask;
pub use config::run_config;
pub use mcp::run_mcp;
pub use serve::{router, run_serve, AppState};
pub use tools::{run_call, run_tools};
