//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response (any route, any status):
//!     → isolation.rs (COEP + COOP stamped on the response)
//!     → Send to client
//!
//! Against a running host:
//!     → check.rs (GET each path, report violations)
//! ```
//!
//! # Design Decisions
//! - One policy module shared by the production and development hosts
//! - Header policy is not configurable

pub mod check;
pub mod isolation;

pub use check::{all_isolated, check_paths, PathReport};
pub use isolation::{apply_isolation_headers, HeaderPolicy, IsolationLayer, IsolationService};
