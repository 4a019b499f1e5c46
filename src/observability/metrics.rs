//! Metrics collection and exposition.
//!
//! # Metrics
//! - `upsetter_ticks_total` (counter): ticks by outcome (`ok`, `fetch_error`)
//! - `upsetter_tracked_groups` (gauge): detectors held after the last tick
//! - `upsetter_transitions_total` (counter): verdict flips by `verdict`
//! - `upsetter_group_events_total` (counter): `added`, `expired`, `removed`, `skipped`
//! - `upsetter_sink_errors_total` (counter): failed sink calls by `action`
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with an HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_tick(outcome: &'static str) {
    counter!("upsetter_ticks_total", "outcome" => outcome).increment(1);
}

pub fn record_tracked_groups(count: usize) {
    gauge!("upsetter_tracked_groups").set(count as f64);
}

pub fn record_transition(up: bool) {
    let verdict = if up { "up" } else { "down" };
    counter!("upsetter_transitions_total", "verdict" => verdict).increment(1);
}

pub fn record_group_events(event: &'static str, count: usize) {
    if count > 0 {
        counter!("upsetter_group_events_total", "event" => event).increment(count as u64);
    }
}

pub fn record_sink_error(action: &'static str) {
    counter!("upsetter_sink_errors_total", "action" => action).increment(1);
}
