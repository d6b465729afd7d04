//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Root configuration for the function gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Server-side read/write timeouts.
    pub timeouts: TimeoutConfig,

    /// Upstream (function watchdog) transport settings.
    pub upstream: UpstreamConfig,

    /// How function names are turned into backend hosts.
    pub resolver: ResolverConfig,

    /// Basic auth settings.
    pub auth: AuthConfig,

    /// Health endpoint settings.
    pub health: HealthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Server timeouts, applied to every inbound request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Read timeout in milliseconds.
    pub read_ms: u64,

    /// Write timeout in milliseconds.
    pub write_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_ms: 10_000,
            write_ms: 10_000,
        }
    }
}

impl TimeoutConfig {
    /// Upper bound for a whole request/response exchange.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.read_ms.max(self.write_ms))
    }
}

/// Transport settings for calls to function watchdogs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Port of the watchdog HTTP listener inside every function.
    pub watchdog_port: u16,

    /// TCP connect timeout in milliseconds. Unset means the read timeout.
    pub dial_timeout_ms: Option<u64>,

    /// TCP keep-alive interval in milliseconds. Unset means the read timeout.
    pub keep_alive_ms: Option<u64>,

    /// How long an idle pooled connection is kept, in milliseconds.
    pub idle_connection_timeout_ms: u64,

    /// Expect-continue wait in milliseconds.
    pub expect_continue_timeout_ms: u64,

    /// Maximum idle pooled connections per backend host.
    pub max_idle_per_host: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            watchdog_port: 8080,
            dial_timeout_ms: None,
            keep_alive_ms: None,
            idle_connection_timeout_ms: 120,
            expect_continue_timeout_ms: 1500,
            max_idle_per_host: 1024,
        }
    }
}

impl UpstreamConfig {
    pub fn dial_timeout(&self, timeouts: &TimeoutConfig) -> Duration {
        Duration::from_millis(self.dial_timeout_ms.unwrap_or(timeouts.read_ms))
    }

    pub fn keep_alive(&self, timeouts: &TimeoutConfig) -> Duration {
        Duration::from_millis(self.keep_alive_ms.unwrap_or(timeouts.read_ms))
    }
}

/// Which discovery mechanism backs the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// Fixed name → host table from this file.
    #[default]
    Static,
    /// `{name}{dns_suffix}` looked up through the system resolver.
    Dns,
}

/// Resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResolverConfig {
    pub kind: ResolverKind,

    /// Static table: function name → backend host.
    pub functions: HashMap<String, String>,

    /// Suffix appended to the function name for DNS lookups
    /// (e.g. ".openfaas-fn.svc.cluster.local").
    pub dns_suffix: Option<String>,
}

/// Basic auth configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Require basic auth on function routes.
    pub enabled: bool,

    /// Directory holding `basic-auth-user` and `basic-auth-password`.
    pub secret_mount_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret_mount_path: "/var/openfaas/secrets".to_string(),
        }
    }
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Expose `GET /healthz`.
    pub enabled: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
