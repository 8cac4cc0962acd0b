//! Cached, retried reads against the MLB StatsAPI.

use super::cache::ResponseCache;
use crate::config::StatsApiSettings;
use crate::error::{BullpenError, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Bounded retry with linearly increasing backoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_step: Duration,
}

impl RetryPolicy {
    /// Create a policy allowing `max_attempts` total attempts (at least one).
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Client for the statistics API.
///
/// Cheap to share behind an `Arc`; the cache handle is shared with every
/// other client built from the same [`ResponseCache`].
pub struct StatsClient {
    http: reqwest::Client,
    base_url: String,
    cache: Arc<ResponseCache>,
    retry: RetryPolicy,
}

impl StatsClient {
    /// Build a client from settings, sharing `cache`.
    pub fn new(settings: &StatsApiSettings, cache: Arc<ResponseCache>) -> Result<Self> {
        let retry = RetryPolicy::new(settings.max_attempts, settings.backoff_step());
        Self::with_policy(&settings.base_url, settings.timeout(), retry, cache)
    }

    /// Build a client with an explicit per-attempt timeout and retry policy.
    pub fn with_policy(
        base_url: &str,
        timeout: Duration,
        retry: RetryPolicy,
        cache: Arc<ResponseCache>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            retry,
        })
    }

    /// The cache this client reads through.
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Fetch `path` (relative to the base URL), optionally returning just one
    /// top-level field of the payload.
    ///
    /// The cache key is the path alone, so every extraction of the same path
    /// shares one cached payload. A requested field that is absent yields an
    /// empty object rather than an error. Failures are never cached.
    #[instrument(skip(self))]
    pub async fn fetch(&self, path: &str, extract: Option<&str>) -> Result<Value> {
        if let Some(cached) = self.cache.get(path) {
            debug!("cache hit for {}", path);
            return Ok(extract_field(&cached, extract));
        }

        let url = format!("{}{}", self.base_url, path);
        let payload = self.get_with_retry(&url).await?;
        let result = extract_field(&payload, extract);
        self.cache.insert(path, payload);

        Ok(result)
    }

    async fn get_with_retry(&self, url: &str) -> Result<Value> {
        let mut attempt = 1;
        loop {
            match self.get_once(url).await {
                Ok(payload) => return Ok(payload),
                Err(e) if attempt < self.retry.max_attempts() => {
                    warn!("request failed (attempt {}) for {}: {}", attempt, url, e);
                    tokio::time::sleep(self.retry.delay_after(attempt)).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("all {} attempts failed for {}: {}", attempt, url, e);
                    return Err(e);
                }
            }
        }
    }

    async fn get_once(&self, url: &str) -> Result<Value> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BullpenError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Pick `field` out of `payload`, or return the whole payload when no field
/// is requested.
pub fn extract_field(payload: &Value, field: Option<&str>) -> Value {
    match field {
        None => payload.clone(),
        Some(name) => payload.get(name).cloned().unwrap_or_else(|| json!({})),
    }
}
