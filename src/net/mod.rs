//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (HTTP/1 + HTTP/2, title-case headers, graceful drain)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Each connection tracked for graceful shutdown
//! - Plain TCP only; TLS is terminated in front of the host

pub mod connection;
pub mod listener;

pub use connection::{http_builder, spawn_connection, ConnectionId};
pub use listener::{ConnectionPermit, Listener, ListenerError};
