//! Cross-origin isolated host for the image-conversion web app.
//!
//! The production bundle and the development server share one header policy,
//! [`security::isolation`], installed as the outermost layer of both.

pub mod config;
pub mod dev;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::schema::HostConfig;
pub use error::HostError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::{apply_isolation_headers, HeaderPolicy, IsolationLayer};
