//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Validate CORS origins and methods before the router is built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderValue, Method};
use thiserror::Error;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not an IP address")]
    BindAddress(String),

    #[error("listener.port must be non-zero")]
    Port,

    #[error("limits.request_timeout_secs must be non-zero")]
    RequestTimeout,

    #[error("limits.max_body_size must be non-zero")]
    MaxBodySize,

    #[error("cors.origins entry {0:?} must be \"*\" or an http(s):// origin")]
    CorsOrigin(String),

    #[error("cors.methods entry {0:?} is not a valid HTTP method")]
    CorsMethod(String),

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Check `config` and report every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.socket_addr().is_none() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::Port);
    }
    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::MaxBodySize);
    }

    for origin in &config.cors.origins {
        if !is_valid_origin(origin) {
            errors.push(ValidationError::CorsOrigin(origin.clone()));
        }
    }
    for method in &config.cors.methods {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::CorsMethod(method.clone()));
        }
    }

    let level = &config.observability.log_level;
    if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(level.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_origin(origin: &str) -> bool {
    if origin == "*" {
        return true;
    }
    let host = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"));
    match host {
        Some(host) => !host.is_empty() && !host.contains('/') && HeaderValue::from_str(origin).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "localhost".to_string();
        config.listener.port = 0;
        config.limits.request_timeout_secs = 0;
        config.cors.origins = vec!["*".to_string(), "a.test".to_string()];
        config.cors.methods = vec!["GET".to_string(), "BAD METHOD".to_string()];
        config.observability.log_level = "verbose".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("localhost".to_string()),
                ValidationError::Port,
                ValidationError::RequestTimeout,
                ValidationError::CorsOrigin("a.test".to_string()),
                ValidationError::CorsMethod("BAD METHOD".to_string()),
                ValidationError::LogLevel("verbose".to_string()),
            ]
        );
    }

    #[test]
    fn test_origin_format() {
        assert!(is_valid_origin("*"));
        assert!(is_valid_origin("https://a.test"));
        assert!(is_valid_origin("http://localhost:3000"));
        assert!(!is_valid_origin("https://"));
        assert!(!is_valid_origin("https://a.test/path"));
        assert!(!is_valid_origin("ftp://a.test"));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MetricsAddress("nowhere".to_string())]
        );
    }
}
