//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_function_invocation_total` (counter): invocations by function, status code
//! - `gateway_functions_seconds` (histogram): invocation latency by function, status code
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder
//!   every call is a no-op (unit tests)
//! - Prometheus exporter runs its own listener

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

pub const INVOCATION_TOTAL: &str = "gateway_function_invocation_total";
pub const INVOCATION_SECONDS: &str = "gateway_functions_seconds";

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished invocation.
pub fn record_invocation(function: &str, code: u16, elapsed: Duration) {
    let labels = [
        ("function_name", function.to_string()),
        ("code", code.to_string()),
    ];
    metrics::counter!(INVOCATION_TOTAL, &labels[..]).increment(1);
    metrics::histogram!(INVOCATION_SECONDS, &labels[..]).record(elapsed.as_secs_f64());
}
