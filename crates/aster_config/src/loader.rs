//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "aster.toml";

/// Loads and validates an `aster.toml` configuration from a project directory.
///
/// Reads `<project_dir>/aster.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates an `aster.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.trim().is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.version.trim().is_empty() {
        return Err(ConfigError::MissingField("project.version".to_string()));
    }
    if config.source_count() == 0 {
        return Err(ConfigError::ValidationError(
            "no sources declared; add a [[scripts]], [[stylesheets]] or [[templates]] table"
                .to_string(),
        ));
    }
    for (table, source) in config.sources() {
        if source.pattern.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{table} source '{}' has an empty pattern",
                source.base
            )));
        }
        if Path::new(&source.base).is_absolute() {
            return Err(ConfigError::ValidationError(format!(
                "{table} source base '{}' must be relative to the project root",
                source.base
            )));
        }
    }
    Ok(())
}
