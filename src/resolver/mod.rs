//! Function name resolution.
//!
//! # Data Flow
//! ```text
//! function name (from the route)
//!     → BaseUrlResolver::resolve
//!         static_table.rs (fixed table from config)
//!         dns.rs          (`{name}{suffix}` via the system resolver)
//!     → ResolvedAddress (host only; the watchdog port is added by the proxy)
//! ```
//!
//! # Design Decisions
//! - Resolution is a trait object so the platform picks the mechanism
//! - "Not found" and "fault" are distinct variants, never an empty string
//! - No caching: every request resolves afresh
//! - Cancellation is by drop: the proxy drops the future when the client goes away

pub mod dns;
pub mod static_table;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ResolverConfig, ResolverKind};

pub use dns::DnsResolver;
pub use static_table::StaticResolver;

/// A non-empty backend host for a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress(String);

impl ResolvedAddress {
    /// Returns `None` for an empty or whitespace-only host.
    pub fn new(host: impl Into<String>) -> Option<Self> {
        let host = host.into();
        let trimmed = host.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn host(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a function name could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The platform has no such function.
    #[error("function `{name}` not found")]
    NotFound { name: String },

    /// Discovery itself failed (transient infrastructure error).
    #[error("resolving `{name}` failed: {source}")]
    Fault {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type ResolveFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ResolvedAddress, ResolveError>> + Send + 'a>>;

/// Maps a function name to the host serving it.
pub trait BaseUrlResolver: Send + Sync + fmt::Debug {
    fn resolve<'a>(&'a self, name: &'a str) -> ResolveFuture<'a>;
}

/// Build the resolver selected in config.
pub fn from_config(config: &ResolverConfig) -> Arc<dyn BaseUrlResolver> {
    match config.kind {
        ResolverKind::Static => Arc::new(StaticResolver::new(config.functions.clone())),
        ResolverKind::Dns => Arc::new(DnsResolver::new(
            config.dns_suffix.clone().unwrap_or_default(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_address_rejects_empty() {
        assert!(ResolvedAddress::new("").is_none());
        assert!(ResolvedAddress::new("   ").is_none());
        assert_eq!(ResolvedAddress::new(" 10.0.0.1 ").unwrap().host(), "10.0.0.1");
    }

    #[tokio::test]
    async fn test_from_config_static() {
        let config = ResolverConfig {
            kind: ResolverKind::Static,
            functions: [("figlet".to_string(), "10.0.0.12".to_string())].into(),
            dns_suffix: None,
        };
        let resolver = from_config(&config);
        let addr = resolver.resolve("figlet").await.unwrap();
        assert_eq!(addr.host(), "10.0.0.12");
    }
}
