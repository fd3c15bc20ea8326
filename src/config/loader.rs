//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::BinderConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment override {key}={value:?}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, apply environment overrides and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<BinderConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: BinderConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Defaults plus environment overrides, validated.
pub fn load_from_env() -> Result<BinderConfig, ConfigError> {
    let mut config = BinderConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `SERVER_HOST`, `SERVER_PORT`, `SERVER_MODE` and `SERVER_ROOT_PATH`.
/// Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut BinderConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(host) = get("SERVER_HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("SERVER_PORT") {
        config.server.port = port.parse().map_err(|_| ConfigError::Env {
            key: "SERVER_PORT",
            value: port.clone(),
        })?;
    }
    if let Some(mode) = get("SERVER_MODE") {
        config.server.mode = mode;
    }
    if let Some(root_path) = get("SERVER_ROOT_PATH") {
        config.server.root_path = root_path;
    }
    Ok(())
}
