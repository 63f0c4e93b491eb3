//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Environment;

    #[test]
    fn test_minimal_toml() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:5000");
        assert_eq!(config.rate_limit.max_requests, 1000);
        assert_eq!(config.rate_limit.window_secs, 900);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_partial_override() {
        let config: ServerConfig = toml::from_str(
            r#"
            environment = "production"

            [cors]
            allowed_origins = ["https://app.example.com"]

            [rate_limit]
            max_requests = 50
            message = "Too many requests"
            "#,
        )
        .unwrap();

        assert!(config.environment.is_production());
        assert_eq!(config.rate_limit.max_requests, 50);
        assert_eq!(config.rate_limit.message, "Too many requests");
        assert_eq!(config.rate_limit.window_secs, 900);
    }
}
