//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check the marker tag and root path are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BinderConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::BinderConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.port must not be 0")]
    ZeroPort,

    #[error("server.mode must be one of debug, release, test (got {0:?})")]
    UnknownMode(String),

    #[error("server.root_path must start with '/' (got {0:?})")]
    RelativeRootPath(String),

    #[error("{0} must be greater than 0")]
    ZeroValue(&'static str),

    #[error("scanner.tag must be a single non-empty token (got {0:?})")]
    InvalidTag(String),

    #[error("scanner.extension must not be empty")]
    EmptyExtension,

    #[error("scanner.directories lists {0:?} more than once")]
    DuplicateDirectory(String),

    #[error("observability.log_level {0:?} is not a valid level")]
    UnknownLogLevel(String),
}

const MODES: [&str; 3] = ["debug", "release", "test"];
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &BinderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let server = &config.server;
    if server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if !MODES.contains(&server.mode.as_str()) {
        errors.push(ValidationError::UnknownMode(server.mode.clone()));
    }
    if !server.root_path.is_empty() && !server.root_path.starts_with('/') {
        errors.push(ValidationError::RelativeRootPath(server.root_path.clone()));
    }
    if server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("server.request_timeout_secs"));
    }
    if server.body_limit_bytes == 0 {
        errors.push(ValidationError::ZeroValue("server.body_limit_bytes"));
    }

    let scanner = &config.scanner;
    if scanner.tag.is_empty() || scanner.tag.split_whitespace().count() != 1 || scanner.tag.trim() != scanner.tag {
        errors.push(ValidationError::InvalidTag(scanner.tag.clone()));
    }
    if scanner.extension.is_empty() {
        errors.push(ValidationError::EmptyExtension);
    }
    if scanner.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("scanner.timeout_secs"));
    }
    for (i, dir) in scanner.directories.iter().enumerate() {
        if scanner.directories[..i].contains(dir) {
            errors.push(ValidationError::DuplicateDirectory(dir.clone()));
        }
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
