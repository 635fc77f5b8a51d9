//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (middleware stack, isolation layer outermost)
//!     → request.rs (request ID added/propagated)
//!     → bundle.rs or dev router (application handler)
//!     → Send to client
//! ```

pub mod bundle;
pub mod request;
pub mod server;

pub use request::{RequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
