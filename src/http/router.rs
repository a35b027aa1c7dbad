//! Request router: registration and dispatch.
//!
//! # Responsibilities
//! - Collect routes, CORS rules and global middleware at startup
//! - Freeze them into an immutable `Router`
//! - Per request: CORS headers, OPTIONS short-circuit, resolve, 404/405,
//!   global middleware, handler invocation, access log
//!
//! # Design Decisions
//! - Configure-then-freeze: the builder owns all mutable state and is
//!   consumed by `build()`, so nothing changes once serving starts
//! - Registration errors are collected and reported together
//! - 404 and 405 are responses, not errors

use std::future::Future;
use std::time::Instant;

use axum::body::Body;
use axum::http::header::{ALLOW, HOST, ORIGIN};
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::context::{Context, DEFAULT_BODY_LIMIT};
use crate::http::handler::Handler;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::observability::metrics;
use crate::routing::{PathTree, Resolution, RouteError};
use crate::security::cors::{CorsConfig, CorsConfigError, CorsPolicy};

/// Errors reported by [`RouterBuilder::build`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{} invalid route(s): {}", .0.len(), join_errors(.0))]
    Routes(Vec<RouteError>),

    #[error(transparent)]
    Cors(#[from] CorsConfigError),
}

fn join_errors(errors: &[RouteError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects configuration before the router is frozen.
#[derive(Debug, Default)]
pub struct RouterBuilder {
    tree: PathTree<Handler>,
    errors: Vec<RouteError>,
    cors: CorsConfig,
    middleware: MiddlewareChain,
    body_limit: Option<usize>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an arbitrary method token.
    pub fn route<F, Fut, R>(self, method: &str, path: &str, handler: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.route_with(method, path, handler, &[])
    }

    /// Register a handler wrapped in route-specific middleware.
    ///
    /// `middleware` composes like the global chain: the last entry is the
    /// outermost wrapper. The global chain still wraps the result.
    pub fn route_with<F, Fut, R>(
        mut self,
        method: &str,
        path: &str,
        handler: F,
        middleware: &[Middleware],
    ) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        let method = match Method::from_bytes(method.as_bytes()) {
            Ok(method) => method,
            Err(_) => {
                self.errors.push(RouteError::InvalidMethod {
                    method: method.to_string(),
                    path: path.to_string(),
                });
                return self;
            }
        };

        let chain: MiddlewareChain = middleware.iter().cloned().collect();
        let handler = chain.wrap(Handler::new(handler));

        match self.tree.insert(method.clone(), path, handler) {
            Ok(Some(_)) => {
                tracing::debug!(method = %method, path = %path, "Route handler replaced");
            }
            Ok(None) => {
                tracing::debug!(method = %method, path = %path, "Route registered");
            }
            Err(e) => self.errors.push(e),
        }
        self
    }

    pub fn get<F, Fut, R>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.route("GET", path, handler)
    }

    pub fn post<F, Fut, R>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.route("POST", path, handler)
    }

    pub fn put<F, Fut, R>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.route("PUT", path, handler)
    }

    pub fn patch<F, Fut, R>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.route("PATCH", path, handler)
    }

    pub fn delete<F, Fut, R>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.route("DELETE", path, handler)
    }

    /// Replace the CORS rules (defaults: any origin, GET/POST/PUT/PATCH/DELETE).
    pub fn cors(mut self, config: CorsConfig) -> Self {
        self.cors = config;
        self
    }

    /// Append a global middleware.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Cap on request bodies read through [`Context::body`].
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = Some(limit);
        self
    }

    /// Validate and freeze.
    pub fn build(self) -> Result<Router, BuildError> {
        if !self.errors.is_empty() {
            return Err(BuildError::Routes(self.errors));
        }
        let cors = CorsPolicy::new(self.cors)?;

        tracing::info!(
            routes = self.tree.routes().len(),
            middleware = self.middleware.len(),
            cors_methods = %cors.allowed_methods(),
            "Router built"
        );

        Ok(Router {
            tree: self.tree,
            cors,
            middleware: self.middleware,
            body_limit: self.body_limit.unwrap_or(DEFAULT_BODY_LIMIT),
        })
    }
}

/// Immutable router, shared read-only across requests.
#[derive(Debug)]
pub struct Router {
    tree: PathTree<Handler>,
    cors: CorsPolicy,
    middleware: MiddlewareChain,
    body_limit: usize,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    /// Registered (method, path) pairs.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.tree.routes()
    }

    /// Handle one request end to end.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let origin = header_str(&request, ORIGIN).unwrap_or("").to_string();

        if request.method() == Method::OPTIONS {
            let mut response = Response::new(Body::empty());
            self.cors.apply(response.headers_mut(), &origin);
            return response;
        }

        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let source = if origin.is_empty() {
            header_str(&request, HOST).unwrap_or("")
        } else {
            origin.as_str()
        };
        tracing::info!(method = %method, path = %path, origin = %source, "Request");

        let mut response = self.route_request(request).await;
        self.cors.apply(response.headers_mut(), &origin);

        let status = response.status();
        tracing::debug!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Response"
        );
        metrics::record_request(method.as_str(), status.as_u16(), start);

        response
    }

    async fn route_request(&self, request: Request<Body>) -> Response {
        let path = request.uri().path().to_string();
        match self.tree.resolve(&path, request.method()) {
            Resolution::NotFound => StatusCode::NOT_FOUND.into_response(),
            Resolution::MethodNotAllowed { allowed } => {
                let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
                // An intermediate node has no methods; send no Allow at all.
                if !allow.is_empty() {
                    if let Ok(value) = HeaderValue::from_str(&allow) {
                        response.headers_mut().insert(ALLOW, value);
                    }
                }
                response
            }
            Resolution::Matched { handler, params } => {
                let composed = self.middleware.wrap(handler.clone());
                let ctx = Context::new(request, params, self.body_limit);
                composed.call(ctx).await
            }
        }
    }
}

fn header_str<B>(request: &Request<B>, name: axum::http::HeaderName) -> Option<&str> {
    request.headers().get(name).and_then(|v| v.to_str().ok())
}
