//! Cross-origin resource sharing policy.
//!
//! # Responsibilities
//! - Decide the `Access-Control-Allow-Origin` value for a request Origin
//! - Render the configured methods as `Access-Control-Allow-Methods`
//! - Stamp the three CORS headers onto responses
//!
//! # Design Decisions
//! - A `*` anywhere in the origin list allows every origin
//! - Exact, case-sensitive origin comparison otherwise
//! - A denied origin gets no `Access-Control-Allow-Origin` header at all
//! - Headers already set by a handler are left alone

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed `Access-Control-Allow-Headers` value.
pub const ALLOWED_HEADERS: &str = "Accept, Content-Type, Content-Length, Accept-Encoding, Authorization";

const WILDCARD: &str = "*";

/// CORS rule set.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins, or `*`.
    pub origins: Vec<String>,

    /// Allowed methods, in header order.
    pub methods: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: vec![WILDCARD.to_string()],
            methods: ["GET", "POST", "PUT", "PATCH", "DELETE"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

/// CORS configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorsConfigError {
    /// Origin cannot be sent as a header value.
    #[error("invalid CORS origin {origin:?}")]
    InvalidOrigin { origin: String },

    /// Method is not a valid HTTP method token.
    #[error("invalid CORS method {method:?}")]
    InvalidMethod { method: String },
}

/// Validated, immutable CORS policy.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origins: Vec<(String, HeaderValue)>,
    wildcard: bool,
    allow_methods: String,
    allow_methods_value: HeaderValue,
}

impl CorsPolicy {
    /// Validate `config` and precompute header values.
    pub fn new(config: CorsConfig) -> Result<Self, CorsConfigError> {
        let origins = config
            .origins
            .into_iter()
            .map(|origin| match HeaderValue::from_str(&origin) {
                Ok(value) => Ok((origin, value)),
                Err(_) => Err(CorsConfigError::InvalidOrigin { origin }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        for method in &config.methods {
            if Method::from_bytes(method.as_bytes()).is_err() {
                return Err(CorsConfigError::InvalidMethod {
                    method: method.clone(),
                });
            }
        }

        let allow_methods = config.methods.join(",");
        let allow_methods_value = HeaderValue::from_str(&allow_methods).map_err(|_| {
            CorsConfigError::InvalidMethod {
                method: allow_methods.clone(),
            }
        })?;

        Ok(Self {
            wildcard: origins.iter().any(|(origin, _)| origin == WILDCARD),
            origins,
            allow_methods,
            allow_methods_value,
        })
    }

    /// Allowed origin value for `request_origin`: `*`, the matching
    /// configured origin, or the empty string when denied.
    pub fn validate_origin(&self, request_origin: &str) -> &str {
        self.origin_entry(request_origin)
            .map(|(origin, _)| origin.as_str())
            .unwrap_or("")
    }

    /// Configured methods joined by `,`.
    pub fn allowed_methods(&self) -> &str {
        &self.allow_methods
    }

    /// Set the CORS headers on `headers` unless already present.
    pub fn apply(&self, headers: &mut HeaderMap, request_origin: &str) {
        if let Some((_, value)) = self.origin_entry(request_origin) {
            headers
                .entry(ACCESS_CONTROL_ALLOW_ORIGIN)
                .or_insert_with(|| value.clone());
        }
        headers
            .entry(ACCESS_CONTROL_ALLOW_METHODS)
            .or_insert_with(|| self.allow_methods_value.clone());
        headers
            .entry(ACCESS_CONTROL_ALLOW_HEADERS)
            .or_insert_with(|| HeaderValue::from_static(ALLOWED_HEADERS));
    }

    fn origin_entry(&self, request_origin: &str) -> Option<&(String, HeaderValue)> {
        if self.wildcard {
            return self.origins.iter().find(|(origin, _)| origin == WILDCARD);
        }
        self.origins.iter().find(|(origin, _)| origin == request_origin)
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            origins: vec![(WILDCARD.to_string(), HeaderValue::from_static(WILDCARD))],
            wildcard: true,
            allow_methods: "GET,POST,PUT,PATCH,DELETE".to_string(),
            allow_methods_value: HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE"),
        }
    }
}
