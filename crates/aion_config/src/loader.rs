//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ElabConfig;
use std::path::Path;

/// Loads and validates an `aion.toml` configuration from a project directory.
///
/// Reads `<project_dir>/aion.toml`, parses it, and validates its values.
pub fn load_config(project_dir: &Path) -> Result<ElabConfig, ConfigError> {
    let config_path = project_dir.join("aion.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates an `aion.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ElabConfig, ConfigError> {
    let config: ElabConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks value ranges that serde cannot express.
fn validate_config(config: &ElabConfig) -> Result<(), ConfigError> {
    if config.elaborate.max_generate_iterations == 0 {
        return Err(ConfigError::ValidationError(
            "elaborate.max_generate_iterations must be greater than zero".to_string(),
        ));
    }
    if config.design.top.iter().any(|name| name.is_empty()) {
        return Err(ConfigError::ValidationError(
            "design.top contains an empty module name".to_string(),
        ));
    }
    if config.flags.keys().any(|key| key.is_empty()) {
        return Err(ConfigError::ValidationError(
            "flags contains an empty key".to_string(),
        ));
    }
    Ok(())
}
