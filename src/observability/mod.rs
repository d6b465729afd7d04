//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy and server produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (invocation counters and latency histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
