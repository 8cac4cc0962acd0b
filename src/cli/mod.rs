//! CLI module for Bullpen.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Bullpen - a baseball assistant backed by MLB StatsAPI tools
///
/// Answers questions by letting a chat model call live StatsAPI lookups,
/// and exposes the same lookups directly over a WebSocket and MCP.
#[derive(Parser, Debug)]
#[command(name = "bullpen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level for the `bullpen` target: the configured level unless `-v` raises it.
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self.verbose {
            0 => configured,
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (POST /chat, WebSocket /mcp)
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start MCP server on stdio for AI assistant integration
    Mcp,

    /// Ask a baseball question from the terminal
    Ask {
        /// The question to ask
        prompt: String,

        /// Model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the available tools
    Tools,

    /// Call a tool directly, bypassing the model
    Call {
        /// Tool name (see `bullpen tools`)
        name: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}
