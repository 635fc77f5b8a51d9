//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap an application handler with the host's middleware stack
//! - Install the cross-origin isolation layer outermost, ahead of everything
//! - Accept connections and hand them to the connection layer
//! - Drain in-flight connections on shutdown
//!
//! # Layer Order (outermost first)
//! ```text
//! IsolationLayer → TraceLayer → request ID (set, propagate)
//!     → metrics → TimeoutLayer → CatchPanicLayer → handler
//! ```

use std::any::Any;
use std::time::Duration;

use axum::{
    http::{Response, StatusCode},
    middleware, Router,
};
use hyper_util::server::graceful::GracefulShutdown;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{HostConfig, LimitsConfig};
use crate::error::HostError;
use crate::http::bundle;
use crate::http::request::{RequestUuid, X_REQUEST_ID};
use crate::net::{connection, Listener};
use crate::observability::metrics;
use crate::security::IsolationLayer;

/// HTTP server hosting one application handler.
pub struct HttpServer {
    router: Router,
    config: HostConfig,
}

impl HttpServer {
    /// Create a server that wraps `handler` with the host middleware stack.
    pub fn new(config: HostConfig, handler: Router) -> Self {
        let router = Self::build_router(&config.limits, handler);
        Self { router, config }
    }

    /// Create a server for the pre-built bundle in `config.bundle`.
    pub fn production(config: HostConfig) -> Self {
        let handler = bundle::router(&config.bundle);
        Self::new(config, handler)
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(limits: &LimitsConfig, handler: Router) -> Router {
        handler
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TimeoutLayer::new(Duration::from_secs(limits.request_timeout_secs)))
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(IsolationLayer)
    }

    /// The fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), HostError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let builder = connection::http_builder();
        let graceful = GracefulShutdown::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => connection::spawn_connection(
                        &builder,
                        &graceful,
                        stream,
                        peer,
                        permit,
                        self.router.clone(),
                    ),
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        drop(listener);
        let grace = Duration::from_secs(self.config.limits.shutdown_grace_secs);
        tokio::select! {
            _ = graceful.shutdown() => tracing::debug!("All connections drained"),
            _ = tokio::time::sleep(grace) => tracing::warn!(
                grace_secs = grace.as_secs(),
                "Grace period elapsed, dropping remaining connections"
            ),
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response<String> {
    let detail = if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");

    let mut response = Response::new("Internal Server Error".to_string());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
