//! Chat-completion client configuration.

use crate::config::ModelSettings;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;

/// Create a client for the OpenAI-compatible endpoint in `settings`.
///
/// Without a configured key the `OPENAI_API_KEY` environment variable is used;
/// local backends such as Ollama ignore the key entirely.
pub fn create_client(settings: &ModelSettings) -> Result<Client<OpenAIConfig>> {
    let mut config = OpenAIConfig::new().with_api_base(settings.base_url.trim_end_matches('/'));
    if let Some(key) = settings.api_key.as_deref().filter(|k| !k.is_empty()) {
        config = config.with_api_key(key);
    }

    create_client_with_timeout(config, settings.timeout())
}

/// Create a client with a custom timeout.
///
/// Each request is sent exactly once: a rate-limited or failing model call
/// surfaces as an error instead of being retried.
pub fn create_client_with_timeout(
    config: OpenAIConfig,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;
    let single_attempt = ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build();

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(single_attempt))
}
