//! MCP (Model Context Protocol) server for Bullpen.
//!
//! Lets desktop assistants call the baseball tools directly.
//! Implements JSON-RPC 2.0 over stdio.

mod protocol;
mod server;

pub use server::McpServer;
