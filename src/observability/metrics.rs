//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_rewrites_total` (counter): rewrite outcomes (`routed` or the error kind)
//! - `edge_origin_requests_total` (counter): origin responses by method, status
//! - `edge_request_duration_seconds` (histogram): end-to-end latency by method
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_rewrite(outcome: &'static str) {
    counter!("edge_rewrites_total", "outcome" => outcome).increment(1);
}

pub fn record_origin_response(method: &str, status: u16, start: Instant) {
    counter!(
        "edge_origin_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("edge_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}
