use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use flappy_core::SimConfig;

/// Load a simulation config from a JSON file, or the defaults when no path is given.
///
/// Missing fields fall back to their defaults. The result is validated before
/// it is returned so a bad file fails here rather than at world construction.
pub fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: SimConfig = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            log::info!("Loaded config from {}", path.display());
            config
        }
        None => SimConfig::default(),
    };

    config.validate().context("Invalid simulation config")?;
    Ok(config)
}
