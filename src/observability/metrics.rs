//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by method, status
//! - `dispatch_not_found_total` (counter): route table misses
//! - `dispatch_routes` (gauge): routes in the active table
//! - `ws_connections_registered_total` (counter)
//! - `ws_connections_swept_total` (counter): closed connections removed lazily
//! - `ws_connections_destroyed_total` (counter): destroyed at teardown

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a served request by method and status.
pub fn record_request(method: &str, status: u16) {
    ::metrics::counter!(
        "dispatch_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Count a request no route matched.
pub fn record_not_found() {
    ::metrics::counter!("dispatch_not_found_total").increment(1);
}

/// Set the size of the active route table.
pub fn record_route_count(routes: usize) {
    ::metrics::gauge!("dispatch_routes").set(routes as f64);
}

/// Count a registered connection.
pub fn record_connection_registered() {
    ::metrics::counter!("ws_connections_registered_total").increment(1);
}

/// Count closed connections removed by a sweep.
pub fn record_connections_swept(count: usize) {
    ::metrics::counter!("ws_connections_swept_total").increment(count as u64);
}

/// Count connections destroyed at teardown.
pub fn record_connections_destroyed(count: usize) {
    ::metrics::counter!("ws_connections_destroyed_total").increment(count as u64);
}
