//! Configuration settings for Bullpen.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub statsapi: StatsApiSettings,
    pub agent: AgentSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Chat-completion model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Base URL of an OpenAI-compatible chat-completion API.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// API key. Falls back to OPENAI_API_KEY when unset.
    pub api_key: Option<String>,
    /// Request timeout for a single model call.
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434/v1".to_string(),
            model: "llama3".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl ModelSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// MLB StatsAPI client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsApiSettings {
    /// Base URL every tool path is appended to.
    pub base_url: String,
    /// Timeout for a single upstream attempt.
    pub timeout_secs: u64,
    /// How long a successful response stays cached.
    pub cache_ttl_secs: u64,
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Backoff step; the delay after attempt `n` is `n * step`.
    pub backoff_step_ms: u64,
}

impl Default for StatsApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://statsapi.mlb.com/api/v1".to_string(),
            timeout_secs: 15,
            cache_ttl_secs: 60,
            max_attempts: 3,
            backoff_step_ms: 500,
        }
    }
}

impl StatsApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }
}

/// Resolution loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum model calls before giving up.
    pub max_steps: usize,
    /// Replaces the built-in system prompt when set.
    pub system_prompt: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: 4,
            system_prompt: None,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied on top of whatever the file provides.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply `BULLPEN_*` overrides from the given lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BULLPEN_MODEL_URL").filter(|v| !v.is_empty()) {
            self.model.base_url = url;
        }
        if let Some(model) = lookup("BULLPEN_MODEL").filter(|v| !v.is_empty()) {
            self.model.model = model;
        }
        if let Some(url) = lookup("BULLPEN_STATSAPI_URL").filter(|v| !v.is_empty()) {
            self.statsapi.base_url = url;
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::BullpenError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bullpen")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_service_contract() {
        let settings = Settings::default();
        assert_eq!(settings.statsapi.cache_ttl(), Duration::from_secs(60));
        assert_eq!(settings.statsapi.timeout(), Duration::from_secs(15));
        assert_eq!(settings.statsapi.max_attempts, 3);
        assert_eq!(settings.statsapi.backoff_step(), Duration::from_millis(500));
        assert_eq!(settings.agent.max_steps, 4);
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[model]\nmodel = \"qwen2.5\"\n")?;

        let settings = Settings::load_from(Some(&path))?;
        assert_eq!(settings.model.model, "qwen2.5");
        assert_eq!(settings.model.timeout_secs, 60);
        assert_eq!(settings.statsapi.base_url, "https://statsapi.mlb.com/api/v1");
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 9090;
        settings.agent.system_prompt = Some("Answer in one line.".to_string());
        settings.save_to(&path)?;

        let loaded = Settings::load_from(Some(&path))?;
        assert_eq!(loaded.server.port, 9090);
        assert_eq!(loaded.agent.system_prompt.as_deref(), Some("Answer in one line."));
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BULLPEN_MODEL", "mistral"),
            ("BULLPEN_STATSAPI_URL", "http://localhost:9000"),
            ("BULLPEN_MODEL_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.model.model, "mistral");
        assert_eq!(settings.statsapi.base_url, "http://localhost:9000");
        // Empty values are ignored
        assert_eq!(settings.model.base_url, "http://127.0.0.1:11434/v1");
    }
}
