//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router dispatch produces:
//!     → logging.rs (access log and lifecycle events)
//!     → metrics.rs (request counter, latency histogram)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing fields, never formatted strings
//! - Request ID flows in from the transport layer
//! - Metrics are cheap no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
