//! Type-erased request handlers.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::http::context::Context;

/// Future returned by a [`Handler`].
pub type HandlerFuture = BoxFuture<'static, Response>;

/// A resolved route's request handler.
///
/// Cloning is cheap: every clone shares the same function.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<dyn Fn(Context) -> HandlerFuture + Send + Sync>,
}

impl Handler {
    /// Wrap an async function taking the request context.
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self {
            inner: Arc::new(move |ctx: Context| -> HandlerFuture {
                let fut = f(ctx);
                Box::pin(async move { fut.await.into_response() })
            }),
        }
    }

    /// Invoke the handler.
    pub fn call(&self, ctx: Context) -> HandlerFuture {
        (self.inner)(ctx)
    }

    /// True when both handles point at the same function.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}
