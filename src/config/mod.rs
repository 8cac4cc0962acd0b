//! Configuration module for Bullpen.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    AgentSettings, GeneralSettings, ModelSettings, ServerSettings, Settings, StatsApiSettings,
};
