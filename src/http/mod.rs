//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout, request ID, panic boundary)
//!     → router.rs (CORS, OPTIONS short-circuit, resolve, 404/405)
//!     → [global middleware chain]
//!     → handler.rs (route handler)
//!     → context.rs (params in, status + body out)
//!     → Send to client
//! ```

pub mod context;
pub mod handler;
pub mod router;
pub mod server;

pub use context::{Context, ContextError};
pub use handler::Handler;
pub use router::{BuildError, Router, RouterBuilder};
pub use server::{HttpServer, X_REQUEST_ID};
