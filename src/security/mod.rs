//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → OPTIONS: CORS headers on an empty response, nothing else runs
//!     → otherwise: resolve and run the handler first
//!     → cors.rs (match Origin against allow-list)
//!     → CORS headers added to the response, keeping any the handler set
//! ```
//!
//! # Design Decisions
//! - Policy validated once at startup, shared read-only afterwards
//! - Header values precomputed, nothing parsed per request

pub mod cors;

pub use cors::{CorsConfig, CorsConfigError, CorsPolicy, ALLOWED_HEADERS};
