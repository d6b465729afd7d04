//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check the selected resolver has what it needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, ResolverKind};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("resolver.functions entry `{0}` has an empty host")]
    EmptyHost(String),

    #[error("resolver.kind = \"dns\" requires resolver.dns_suffix")]
    MissingDnsSuffix,

    #[error("auth.enabled requires auth.secret_mount_path")]
    MissingSecretMountPath,
}

/// Check the whole config, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let positive = [
        ("listener.max_connections", config.listener.max_connections as u64),
        ("timeouts.read_ms", config.timeouts.read_ms),
        ("timeouts.write_ms", config.timeouts.write_ms),
        ("upstream.watchdog_port", config.upstream.watchdog_port as u64),
        (
            "upstream.idle_connection_timeout_ms",
            config.upstream.idle_connection_timeout_ms,
        ),
        (
            "upstream.expect_continue_timeout_ms",
            config.upstream.expect_continue_timeout_ms,
        ),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    // Unset falls back to the read timeout, checked above.
    let overrides = [
        ("upstream.dial_timeout_ms", config.upstream.dial_timeout_ms),
        ("upstream.keep_alive_ms", config.upstream.keep_alive_ms),
    ];
    for (field, value) in overrides {
        if value == Some(0) {
            errors.push(ValidationError::Zero(field));
        }
    }

    match config.resolver.kind {
        ResolverKind::Static => {
            let mut empty: Vec<_> = config
                .resolver
                .functions
                .iter()
                .filter(|(_, host)| host.trim().is_empty())
                .map(|(name, _)| name.clone())
                .collect();
            empty.sort();
            errors.extend(empty.into_iter().map(ValidationError::EmptyHost));
        }
        ResolverKind::Dns => {
            let has_suffix = config
                .resolver
                .dns_suffix
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty());
            if !has_suffix {
                errors.push(ValidationError::MissingDnsSuffix);
            }
        }
    }

    if config.auth.enabled && config.auth.secret_mount_path.trim().is_empty() {
        errors.push(ValidationError::MissingSecretMountPath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
