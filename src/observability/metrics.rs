//! Metrics collection and exposition.
//!
//! # Metrics
//! - `route_binder_routes_bound_total` (counter): routes bound at startup
//! - `route_binder_diagnostics_total` (counter): diagnostics by kind
//! - `route_binder_requests_total` (counter): dispatched requests by method, status
//! - `route_binder_request_duration_seconds` (histogram): handler chain latency
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is optional (`observability.metrics_enabled`)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::table::RouteTable;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of a binding pass.
pub fn record_binding(table: &RouteTable) {
    metrics::counter!("route_binder_routes_bound_total").increment(table.len() as u64);
    for diagnostic in table.diagnostics() {
        metrics::counter!("route_binder_diagnostics_total", "kind" => diagnostic.kind.as_str())
            .increment(1);
    }
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        "route_binder_requests_total",
        "method" => method.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "route_binder_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}
