//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Anything that prevents a usable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read, parse and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    parse_config(&fs::read_to_string(path)?)
}

/// Parse and validate TOML config text.
pub fn parse_config(text: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(text)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
