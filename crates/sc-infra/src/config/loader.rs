//! TOML configuration loader.
//!
//! Reads the file and hands the parsed value to [`AppConfig::from_toml`],
//! which owns all default handling.

use std::path::Path;

use anyhow::Context;
use sc_core::config::AppConfig;
use tracing::debug;

/// Load configuration from a TOML file on top of `base`.
///
/// A missing file is not an error: `base` is returned unchanged.
///
/// # Errors
///
/// Returns error if the file cannot be read, is not valid TOML, or holds a
/// value `AppConfig::from_toml` rejects.
pub fn load_app_config(config_path: &Path, base: AppConfig) -> anyhow::Result<AppConfig> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(base);
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read config file: {}", config_path.display()))
        }
    };
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value, base)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))
}
