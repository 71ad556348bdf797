//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lookup_requests_total` (counter): searches by outcome
//! - `lookup_upstream_duration_seconds` (histogram): upstream latency by kind
//! - `lookup_upstream_failures_total` (counter): upstream failures by reason
//! - `lookup_redacted_keys_total` (counter): keys stripped by the redactor
//! - `lookup_active_sessions` (gauge): live sessions

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape listener. Must be called inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str) {
    counter!("lookup_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_upstream(kind: &'static str, start: Instant) {
    histogram!("lookup_upstream_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_failure(reason: &'static str) {
    counter!("lookup_upstream_failures_total", "reason" => reason).increment(1);
}

pub fn record_redacted(count: usize) {
    if count > 0 {
        counter!("lookup_redacted_keys_total").increment(count as u64);
    }
}

pub fn record_active_sessions(count: usize) {
    gauge!("lookup_active_sessions").set(count as f64);
}
