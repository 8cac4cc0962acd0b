//! Process-wide wiring for Bullpen.
//!
//! Builds the shared response cache, the StatsAPI client, the tool dispatcher
//! and the chat model once, and hands out handles to request handlers.

use crate::agent::{ChatModel, OpenAIChatModel, Resolver};
use crate::config::Settings;
use crate::error::Result;
use crate::statsapi::{ResponseCache, StatsClient};
use crate::tools::ToolDispatcher;
use std::sync::Arc;
use tracing::info;

/// Shared services for every request.
pub struct Orchestrator {
    settings: Settings,
    cache: Arc<ResponseCache>,
    dispatcher: Arc<ToolDispatcher>,
    model: Arc<dyn ChatModel>,
}

impl Orchestrator {
    /// Create the orchestrator from settings, talking to the configured model.
    pub fn new(settings: Settings) -> Result<Self> {
        let model = Arc::new(OpenAIChatModel::new(&settings.model)?);
        Self::with_model(settings, model)
    }

    /// Create the orchestrator with an explicit chat model.
    pub fn with_model(settings: Settings, model: Arc<dyn ChatModel>) -> Result<Self> {
        let cache = Arc::new(ResponseCache::new(settings.statsapi.cache_ttl()));
        let client = Arc::new(StatsClient::new(&settings.statsapi, cache.clone())?);
        let dispatcher = Arc::new(ToolDispatcher::new(client));

        info!(
            "StatsAPI at {} (cache TTL {}s), model {} at {}",
            settings.statsapi.base_url,
            settings.statsapi.cache_ttl_secs,
            settings.model.model,
            settings.model.base_url
        );

        Ok(Self {
            settings,
            cache,
            dispatcher,
            model,
        })
    }

    /// A resolver over the shared model and dispatcher.
    pub fn resolver(&self) -> Resolver {
        self.resolver_with(self.model.clone())
    }

    /// A resolver using a different model but the same tools and cache.
    pub fn resolver_with(&self, model: Arc<dyn ChatModel>) -> Resolver {
        let resolver = Resolver::new(model, self.dispatcher.clone())
            .with_max_steps(self.settings.agent.max_steps);

        match &self.settings.agent.system_prompt {
            Some(prompt) => resolver.with_system_prompt(prompt),
            None => resolver,
        }
    }

    pub fn dispatcher(&self) -> Arc<ToolDispatcher> {
        self.dispatcher.clone()
    }

    pub fn cache(&self) -> Arc<ResponseCache> {
        self.cache.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
