//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Mount the frozen `Router` behind an Axum fallback (every method, every path)
//! - Wire up transport middleware (timeout, request ID, tracing, panic catching)
//! - Bind server to listener
//! - Shut down when the caller-supplied future completes
//!
//! # Design Decisions
//! - Axum does no routing of its own; our tree decides 404/405
//! - A panicking handler is turned into a 500 here, not in the router

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    response::Response,
    Router as AxumRouter,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::router::Router;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// HTTP server for a frozen router.
pub struct HttpServer {
    app: AxumRouter,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given router and configuration.
    pub fn new(router: Router, config: ServerConfig) -> Self {
        let app = Self::build_app(Arc::new(router), &config);
        Self { app, config }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    pub fn build_app(router: Arc<Router>, config: &ServerConfig) -> AxumRouter {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        AxumRouter::new()
            .fallback(dispatch)
            .with_state(router)
            .layer(CatchPanicLayer::new())
            .layer(TimeoutLayer::new(Duration::from_secs(config.limits.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The Axum app, for driving requests in-process.
    pub fn app(&self) -> AxumRouter {
        self.app.clone()
    }

    /// Run the server until `shutdown` completes, e.g. [`Shutdown::signalled`].
    ///
    /// [`Shutdown::signalled`]: crate::lifecycle::Shutdown::signalled
    pub async fn run<S>(self, listener: TcpListener, shutdown: S) -> Result<(), std::io::Error>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.limits.request_timeout_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

async fn dispatch(State(router): State<Arc<Router>>, request: Request<Body>) -> Response {
    router.dispatch(request).await
}
