//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method and status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `rate_limited_total` (counter): requests rejected by the rate limiter
//! - `ws_active_connections` (gauge): registered WebSocket connections

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!("http_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a request rejected by the rate limiter.
pub fn record_rate_limited() {
    counter!("rate_limited_total").increment(1);
}

/// Update the WebSocket connection gauge.
pub fn set_ws_connections(count: usize) {
    gauge!("ws_active_connections").set(count as f64);
}
