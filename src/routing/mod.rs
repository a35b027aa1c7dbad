//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     (method, path, handler)
//!     → segment.rs (split path, classify literal / {param} labels)
//!     → tree.rs (walk or grow nodes, store handler per method)
//!     → Freeze as immutable PathTree
//!
//! Incoming request (method, path):
//!     → segment.rs (split path)
//!     → tree.rs (literal child, else parameter child, else NotFound)
//!     → params.rs (bind parameter names to segment values)
//!     → Return: Matched | MethodNotAllowed | NotFound
//! ```
//!
//! # Design Decisions
//! - Tree built once, read-only while serving (no locks)
//! - Literal beats parameter at the same level
//! - At most one parameter child per node, enforced at registration
//! - Last registration for a (method, path) wins

pub mod params;
pub mod segment;
pub mod tree;

use thiserror::Error;

pub use params::PathParams;
pub use segment::{split_path, Segment};
pub use tree::{PathTree, Resolution};

/// Errors raised while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The method token is not a valid HTTP method.
    #[error("invalid HTTP method {method:?} for route {path}")]
    InvalidMethod { method: String, path: String },

    /// Two differently named parameters at the same tree level.
    #[error("route {path} declares parameter {attempted} where {existing} is already registered")]
    ConflictingParameter {
        path: String,
        existing: String,
        attempted: String,
    },
}
