//! Per-request context handed to handlers.
//!
//! # Responsibilities
//! - Carry request parts, body and extracted path parameters
//! - Track the status the handler intends to send (200 unless set)
//! - Build plain-text and JSON responses
//!
//! # Design Decisions
//! - Owned by exactly one request; moved into the handler, never shared
//! - Body read lazily with a size cap inherited from the router
//! - JSON serialisation failure becomes a 500, never a panic

use std::fmt;

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderValue, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::Response;
use serde::Serialize;
use thiserror::Error;

use crate::routing::PathParams;

/// Default request body limit (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Errors surfaced while reading the request.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Body could not be read, or exceeded the configured limit.
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),
}

/// The request context: request data in, response out.
pub struct Context {
    parts: Parts,
    body: Body,
    params: PathParams,
    status: Option<StatusCode>,
    body_limit: usize,
}

impl Context {
    pub(crate) fn new(request: Request<Body>, params: PathParams, body_limit: usize) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            parts,
            body,
            params,
            status: None,
            body_limit,
        }
    }

    /// Build a context outside a router, e.g. to drive a handler in tests.
    pub fn from_request(request: Request<Body>) -> Self {
        Self::new(request, PathParams::new(), DEFAULT_BODY_LIMIT)
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Request extensions, for middleware to pass typed data downstream.
    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    /// Value bound to the `{name}` path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Buffer the request body, up to the router's body limit.
    ///
    /// The body can only be taken once; later calls return empty bytes.
    pub async fn body(&mut self) -> Result<Bytes, ContextError> {
        let body = std::mem::take(&mut self.body);
        Ok(axum::body::to_bytes(body, self.body_limit).await?)
    }

    /// Set the status the response will carry.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// The status that [`send`](Self::send) or [`json`](Self::json) will write.
    pub fn resolved_status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn ok(self) -> Self {
        self.status(StatusCode::OK)
    }

    pub fn created(self) -> Self {
        self.status(StatusCode::CREATED)
    }

    pub fn bad_request(self) -> Self {
        self.status(StatusCode::BAD_REQUEST)
    }

    pub fn unauthorized(self) -> Self {
        self.status(StatusCode::UNAUTHORIZED)
    }

    pub fn forbidden(self) -> Self {
        self.status(StatusCode::FORBIDDEN)
    }

    pub fn not_found(self) -> Self {
        self.status(StatusCode::NOT_FOUND)
    }

    pub fn method_not_allowed(self) -> Self {
        self.status(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn internal_server_error(self) -> Self {
        self.status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn not_implemented(self) -> Self {
        self.status(StatusCode::NOT_IMPLEMENTED)
    }

    /// Write the resolved status and `body`.
    pub fn send(self, body: impl Into<Body>) -> Response {
        let mut response = Response::new(body.into());
        *response.status_mut() = self.resolved_status();
        response
    }

    /// Serialise `data` as JSON with the resolved status.
    pub fn json<T: Serialize + ?Sized>(self, data: &T) -> Response {
        match serde_json::to_vec(data) {
            Ok(payload) => {
                let mut response = self.send(payload);
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                response
            }
            Err(e) => {
                tracing::error!(path = %self.path(), error = %e, "Failed to serialise JSON response");
                self.internal_server_error().send(Body::empty())
            }
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("params", &self.params)
            .field("status", &self.resolved_status())
            .finish_non_exhaustive()
    }
}
