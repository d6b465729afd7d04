//! Startup orchestration.
//!
//! # Responsibilities
//! - Load credentials when basic auth is enabled
//! - Build the configured resolver
//! - Assemble the server, with the provider's `/system` handlers if any
//!
//! # Design Decisions
//! - Fail fast: unreadable credentials abort startup
//! - Listeners are bound by the caller, after this succeeds

use std::sync::Arc;

use crate::auth::{CredentialsError, ReadBasicAuth, ReadBasicAuthFromDisk};
use crate::config::GatewayConfig;
use crate::http::{GatewayServer, SystemHandlers};
use crate::resolver::{self, BaseUrlResolver};

/// Build the server described by `config` with the resolver it selects.
pub fn build_server(config: GatewayConfig) -> Result<GatewayServer, CredentialsError> {
    let resolver = resolver::from_config(&config.resolver);
    build_server_with_resolver(config, resolver)
}

/// Build the server with a platform-supplied resolver.
pub fn build_server_with_resolver(
    config: GatewayConfig,
    resolver: Arc<dyn BaseUrlResolver>,
) -> Result<GatewayServer, CredentialsError> {
    build_provider_server(config, resolver, SystemHandlers::default())
}

/// Build the server with a platform-supplied resolver and `/system`
/// handlers.
pub fn build_provider_server(
    config: GatewayConfig,
    resolver: Arc<dyn BaseUrlResolver>,
    system: SystemHandlers,
) -> Result<GatewayServer, CredentialsError> {
    let credentials = if config.auth.enabled {
        let reader = ReadBasicAuthFromDisk::new(&config.auth.secret_mount_path);
        let credentials = reader.read()?;
        tracing::info!(
            secret_mount_path = %config.auth.secret_mount_path,
            user = %credentials.user,
            "Loaded basic auth credentials"
        );
        Some(vec![credentials])
    } else {
        None
    };

    tracing::info!(
        resolver = ?resolver,
        system_handlers = !system.is_empty(),
        "Resolver ready"
    );
    Ok(GatewayServer::with_system_handlers(
        config,
        resolver,
        credentials,
        system,
    ))
}
