//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Init => {
            let config_path = Settings::default_config_path();
            if write_default_config(&config_path)? {
                Output::success(&format!("Created default config at {:?}", config_path));
            } else {
                Output::warning(&format!("Config already exists at {:?}", config_path));
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Write the built-in defaults to `path` unless a file is already there.
///
/// Environment overrides are not baked in. Returns whether a file was written.
fn write_default_config(path: &PathBuf) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    Settings::default().save_to(path)?;
    Ok(true)
}
