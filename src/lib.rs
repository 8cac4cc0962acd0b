//! Bullpen - a baseball assistant backend
//!
//! Lets a chat model answer baseball questions by calling a fixed set of
//! read-only MLB StatsAPI lookups, and exposes the same lookups directly to
//! other clients.
//!
//! # Architecture
//!
//! - `tools` - Tool registry, typed tool calls and the dispatcher
//! - `statsapi` - Cached, retried StatsAPI client
//! - `agent` - Bounded model/tool resolution loop
//! - `channel` - WebSocket control-channel protocol
//! - `mcp` - stdio MCP server
//! - `orchestrator` - Process-wide wiring of the above
//!
//! # Example
//!
//! ```rust,no_run
//! use bullpen::config::Settings;
//! use bullpen::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = Orchestrator::new(Settings::load()?)?;
//!
//!     let resolution = orchestrator
//!         .resolver()
//!         .resolve("What games are on 2024-05-01?")
//!         .await?;
//!     println!("{}", resolution.message);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod channel;
pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod openai;
pub mod orchestrator;
pub mod statsapi;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use error::{BullpenError, Result};
