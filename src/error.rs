//! Error types for Bullpen.

use thiserror::Error;

/// Library-level error type for Bullpen operations.
#[derive(Error, Debug)]
pub enum BullpenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

/// Result type alias for Bullpen operations.
pub type Result<T> = std::result::Result<T, BullpenError>;
