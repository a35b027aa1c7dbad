//! Embeddable HTTP request router.
//!
//! Routes are registered on a [`RouterBuilder`], frozen into an immutable
//! [`Router`], and served through [`HttpServer`] or driven directly with
//! [`Router::dispatch`].

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::ServerConfig;
pub use http::{Context, Handler, HttpServer, Router, RouterBuilder};
pub use lifecycle::Shutdown;
pub use middleware::{Middleware, MiddlewareChain};
pub use security::{CorsConfig, CorsPolicy};
