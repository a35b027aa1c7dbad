//! Handler decoration.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     route handler ─▶ per-route chain (wrapped once)
//!
//! Dispatch (after path and method resolved):
//!     resolved handler ─▶ global chain ─▶ composed handler ─▶ invoked once
//! ```
//!
//! # Design Decisions
//! - A middleware is a plain `Handler -> Handler` function
//! - Chains are applied in declaration order, so the LAST declared
//!   middleware is the outermost wrapper and runs first
//! - Wrapping has no side effects; work only happens when a request runs

pub mod chain;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::http::{Context, Handler};

pub use chain::MiddlewareChain;

/// A decorator mapping a handler to a wrapped handler.
#[derive(Clone)]
pub struct Middleware {
    inner: Arc<dyn Fn(Handler) -> Handler + Send + Sync>,
}

impl Middleware {
    /// Build a middleware from a raw decorator function.
    pub fn new<F>(decorate: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(decorate),
        }
    }

    /// Build a middleware from an async function receiving the request
    /// context and the next handler in the chain.
    ///
    /// ```rust,ignore
    /// let auth = Middleware::from_fn(|ctx: Context, next: Handler| async move {
    ///     if ctx.header("authorization").is_none() {
    ///         return ctx.unauthorized().send("");
    ///     }
    ///     next.call(ctx).await
    /// });
    /// ```
    pub fn from_fn<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Context, Handler) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self::new(move |next: Handler| {
            let f = f.clone();
            Handler::new(move |ctx| f(ctx, next.clone()))
        })
    }

    /// Apply the decorator.
    pub fn wrap(&self, handler: Handler) -> Handler {
        (self.inner)(handler)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware").finish_non_exhaustive()
    }
}

/// Middleware that stamps a fixed header onto every response that lacks it.
pub fn default_header(name: HeaderName, value: HeaderValue) -> Middleware {
    Middleware::from_fn(move |ctx: Context, next: Handler| {
        let name = name.clone();
        let value = value.clone();
        async move {
            let mut response: Response = next.call(ctx).await;
            response.headers_mut().entry(name).or_insert(value);
            response
        }
    })
}
