//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build router → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Latch + broadcast → Stop accepting → Drain in-flight requests
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then router, then listener
//! - Traffic only accepted once the router is frozen

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
