//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (window > 0, addresses parseable)
//! - Catch production configs with an empty CORS allow-list
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic validation failure.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("rate_limit.window_secs must be greater than zero")]
    ZeroRateLimitWindow,

    #[error("rate_limit.max_requests must be greater than zero")]
    ZeroRateLimitMax,

    #[error("production mode requires at least one cors.allowed_origins entry")]
    EmptyProductionAllowList,

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroRateLimitWindow);
    }

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroRateLimitMax);
    }

    if config.environment.is_production() && config.cors.allowed_origins.is_empty() {
        errors.push(ValidationError::EmptyProductionAllowList);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
