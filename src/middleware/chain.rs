//! Ordered middleware composition.

use crate::http::Handler;
use crate::middleware::Middleware;

/// An ordered list of middleware, applied around a terminal handler.
#[derive(Debug, Clone, Default)]
pub struct MiddlewareChain {
    layers: Vec<Middleware>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware. It will wrap everything declared before it.
    pub fn push(&mut self, middleware: Middleware) {
        self.layers.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Compose the chain around `handler`.
    ///
    /// `h0 = handler`, `hi = layers[i-1](hi-1)`: the last layer ends up
    /// outermost and sees the request first. An empty chain returns
    /// `handler` unchanged.
    pub fn wrap(&self, handler: Handler) -> Handler {
        self.layers
            .iter()
            .fold(handler, |inner, middleware| middleware.wrap(inner))
    }
}

impl FromIterator<Middleware> for MiddlewareChain {
    fn from_iter<I: IntoIterator<Item = Middleware>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}
