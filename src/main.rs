//! Demo server for the rootrouter crate.
//!
//! ```text
//! rootrouter [--config server.toml] [--port 8080] [--bind 127.0.0.1]
//! ```
//!
//! Port resolution: `--port`, then `PORT`, then the config file, then 3000.

use std::path::PathBuf;

use axum::http::{HeaderName, HeaderValue};
use clap::Parser;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use rootrouter::config::{load_config, ServerConfig};
use rootrouter::lifecycle::{signals, Shutdown};
use rootrouter::middleware::default_header;
use rootrouter::observability::{logging, metrics};
use rootrouter::{Context, HttpServer, Router};

#[derive(Parser)]
#[command(name = "rootrouter")]
#[command(about = "Demo HTTP server built on the rootrouter segment tree", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port (overrides the config file).
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Bind IP (overrides the config file).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        port = config.listener.port,
        request_timeout_secs = config.limits.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let router = demo_router(&config)?;
    for (method, path) in router.routes() {
        tracing::debug!(method = %method, path = %path, "Route");
    }

    let addr = config
        .listener
        .socket_addr()
        .ok_or_else(|| format!("invalid bind address {:?}", config.listener.bind_address))?;
    let listener = TcpListener::bind(addr).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(router, config);
    let server_task = tokio::spawn(server.run(listener, shutdown.signalled()));

    signals::wait_for_signal().await?;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn demo_router(config: &ServerConfig) -> Result<Router, rootrouter::http::BuildError> {
    Router::builder()
        .cors(config.cors.clone())
        .body_limit(config.limits.max_body_size)
        .middleware(default_header(
            HeaderName::from_static("server"),
            HeaderValue::from_static("rootrouter"),
        ))
        .get("/", |ctx: Context| async move { ctx.send("rootrouter") })
        .get("/health", |ctx: Context| async move { ctx.json(&json!({ "status": "ok" })) })
        .get("/users/me", |ctx: Context| async move {
            ctx.json(&json!({ "id": "me", "name": "Current user" }))
        })
        .get("/users/{userId}", |ctx: Context| async move {
            let id = ctx.param("userId").unwrap_or_default().to_string();
            ctx.json(&json!({ "id": id }))
        })
        .get("/users/{userId}/posts/{postId}", |ctx: Context| async move {
            let user = ctx.param("userId").unwrap_or_default().to_string();
            let post = ctx.param("postId").unwrap_or_default().to_string();
            ctx.json(&json!({ "user": user, "post": post }))
        })
        .post("/users", create_user)
        .build()
}

async fn create_user(mut ctx: Context) -> axum::response::Response {
    let body = match ctx.body().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected request body");
            return ctx.status(axum::http::StatusCode::PAYLOAD_TOO_LARGE).send("");
        }
    };

    match serde_json::from_slice::<Value>(&body) {
        Ok(user) => ctx.created().json(&user),
        Err(_) => ctx.bad_request().json(&json!({ "error": "invalid JSON body" })),
    }
}
