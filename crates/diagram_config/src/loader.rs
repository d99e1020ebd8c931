//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::DiagramsConfig;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "diagrams.toml";

/// Loads `<project_dir>/diagrams.toml`, or the defaults if the file does not exist.
pub fn load_config(project_dir: &Path) -> Result<DiagramsConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Ok(DiagramsConfig::default());
    }
    load_config_file(&config_path)
}

/// Loads and validates a configuration from an explicit file path.
///
/// Unlike [`load_config`], a missing file is an error.
pub fn load_config_file(path: &Path) -> Result<DiagramsConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<DiagramsConfig, ConfigError> {
    let config: DiagramsConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are usable.
fn validate_config(config: &DiagramsConfig) -> Result<(), ConfigError> {
    if config.render.server_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "render.server_url must not be empty".to_string(),
        ));
    }
    if config.render.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "render.timeout_secs must be positive".to_string(),
        ));
    }
    if let Some(dir) = &config.store.dir {
        if dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.dir must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}
