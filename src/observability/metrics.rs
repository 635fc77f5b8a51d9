//! Metrics collection and exposition.
//!
//! # Metrics
//! - `host_requests_total` (counter): requests by method, status
//! - `host_request_duration_seconds` (histogram): latency by method

use std::net::SocketAddr;
use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::HostError;
use crate::http::request::request_id;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), HostError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| HostError::Metrics(e.to_string()))?;

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "host_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("host_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Middleware recording every request passing through.
///
/// Runs inside the request-ID layer, so the log line carries `x-request-id`.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let id = request_id(&request).to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    record_request(&method, status, start);

    if response.status().is_server_error() {
        tracing::warn!(request_id = %id, method = %method, path = %path, status, "Request failed");
    } else {
        tracing::debug!(request_id = %id, method = %method, path = %path, status, "Request completed");
    }
    response
}
