//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pennedpost_facade_calls_total` (counter): by backend, operation, outcome
//! - `pennedpost_backend_downgrades_total` (counter): automatic failovers
//! - `pennedpost_primary_reachable` (gauge): 1=reachable, 0=unreachable

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::backend::BackendKind;

/// Install the Prometheus recorder and its HTTP listener. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_facade_call(backend: BackendKind, operation: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "pennedpost_facade_calls_total",
        "backend" => backend.as_str(),
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_downgrade(from: BackendKind, to: BackendKind) {
    ::metrics::counter!(
        "pennedpost_backend_downgrades_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
}

pub fn record_primary_reachable(reachable: bool) {
    ::metrics::gauge!("pennedpost_primary_reachable").set(if reachable { 1.0 } else { 0.0 });
}
