//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edgebin_requests_total` (counter): requests by route, status
//! - `edgebin_request_duration_seconds` (histogram): latency by route
//! - `edgebin_websocket_sessions_total` (counter): accepted upgrades
//!
//! # Design Decisions
//! - Route labels come from the route table, never the raw path
//! - Exporter is optional; without it every call is a no-op

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "edgebin_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("edgebin_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_websocket_session() {
    metrics::counter!("edgebin_websocket_sessions_total").increment(1);
}
