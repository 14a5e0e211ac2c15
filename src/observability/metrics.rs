//! Metrics collection and exposition.
//!
//! # Metrics
//! - `slog_requests_total` (counter): requests by route, status
//! - `slog_access_decisions_total` (counter): gate outcomes
//! - `slog_access_entries_dropped_total` (counter): unusable config entries
//! - `slog_file_operations_total` (counter): store operations by op, result
//!
//! Without an installed recorder every call is a no-op.

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &str, status: u16) {
    counter!(
        "slog_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_access_decision(outcome: &'static str) {
    counter!("slog_access_decisions_total", "outcome" => outcome).increment(1);
}

pub fn record_entry_dropped(list: &str) {
    counter!("slog_access_entries_dropped_total", "list" => list.to_string()).increment(1);
}

pub fn record_file_operation(op: &'static str, result: &'static str) {
    counter!("slog_file_operations_total", "op" => op, "result" => result).increment(1);
}
