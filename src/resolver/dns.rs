//! DNS-backed resolution.
//!
//! Functions are reachable as `{name}{suffix}`, e.g. a Kubernetes service
//! `figlet.openfaas-fn.svc.cluster.local`. The first address returned by the
//! system resolver becomes the backend host.
//!
//! The system resolver reports a name with no records as an I/O error; those
//! are recognised by their `getaddrinfo` message and reported as
//! [`ResolveError::NotFound`]. Any other lookup error is a fault.

use std::io;
use tokio::net::lookup_host;

use super::{BaseUrlResolver, ResolveError, ResolveFuture, ResolvedAddress};

#[derive(Debug, Clone)]
pub struct DnsResolver {
    suffix: String,
}

impl DnsResolver {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Fully qualified name looked up for `function`.
    pub fn fqdn(&self, function: &str) -> String {
        format!("{}{}", function, self.suffix)
    }
}

impl BaseUrlResolver for DnsResolver {
    fn resolve<'a>(&'a self, name: &'a str) -> ResolveFuture<'a> {
        Box::pin(async move {
            let fqdn = self.fqdn(name);

            // lookup_host needs a port; it is discarded.
            let mut addrs = lookup_host((fqdn.as_str(), 0))
                .await
                .map_err(|e| classify_lookup_error(name, e))?;

            let ip = addrs.next().map(|addr| addr.ip()).ok_or_else(|| {
                ResolveError::NotFound {
                    name: name.to_string(),
                }
            })?;

            tracing::debug!(function = %name, %fqdn, %ip, "Resolved function");

            ResolvedAddress::new(ip.to_string()).ok_or_else(|| ResolveError::NotFound {
                name: name.to_string(),
            })
        })
    }
}

/// `getaddrinfo` messages for a name that has no address.
const NO_SUCH_NAME: [&str; 3] = [
    "Name or service not known",
    "No address associated with hostname",
    "nodename nor servname provided, or not known",
];

fn classify_lookup_error(name: &str, err: io::Error) -> ResolveError {
    let message = err.to_string();
    if NO_SUCH_NAME.iter().any(|m| message.contains(m)) {
        tracing::debug!(function = %name, error = %message, "No DNS record for function");
        ResolveError::NotFound {
            name: name.to_string(),
        }
    } else {
        ResolveError::Fault {
            name: name.to_string(),
            source: Box::new(err),
        }
    }
}
