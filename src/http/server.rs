//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the function routes and any provider `/system`
//!   handlers
//! - Wire up middleware (basic auth, concurrency limit, timeout, tracing)
//! - Bind server to listener
//! - Graceful shutdown on signal or broadcast

use axum::{http::StatusCode, middleware, routing::any, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::{basic_auth, BasicAuthCredentials};
use crate::config::GatewayConfig;
use crate::http::proxy::{function_proxy, FunctionProxy};
use crate::http::system::SystemHandlers;
use crate::lifecycle::signals::shutdown_signal;
use crate::resolver::BaseUrlResolver;

/// How far the server-wide timeout trails the proxy's upstream deadline.
const TIMEOUT_GRACE: Duration = Duration::from_secs(1);

/// Routes served by the function proxy.
pub fn function_router(proxy: Arc<FunctionProxy>) -> Router {
    Router::new()
        .route("/function/{name}", any(function_proxy))
        .route("/function/{name}/", any(function_proxy))
        .route("/function/{name}/{*params}", any(function_proxy))
        .with_state(proxy)
}

/// HTTP server for the function gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server. With `credentials`, function routes require
    /// basic auth against any of the given pairs.
    pub fn new(
        config: GatewayConfig,
        resolver: Arc<dyn BaseUrlResolver>,
        credentials: Option<Vec<BasicAuthCredentials>>,
    ) -> Self {
        Self::with_system_handlers(config, resolver, credentials, SystemHandlers::default())
    }

    /// Like [`GatewayServer::new`], also mounting the provider's `/system`
    /// handlers behind the same basic auth.
    pub fn with_system_handlers(
        config: GatewayConfig,
        resolver: Arc<dyn BaseUrlResolver>,
        credentials: Option<Vec<BasicAuthCredentials>>,
        system: SystemHandlers,
    ) -> Self {
        let proxy = Arc::new(FunctionProxy::from_config(resolver, &config));
        let router = Self::build_router(&config, proxy, credentials, system);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &GatewayConfig,
        proxy: Arc<FunctionProxy>,
        credentials: Option<Vec<BasicAuthCredentials>>,
        system: SystemHandlers,
    ) -> Router {
        let mut protected = function_router(proxy).merge(system.into_router());
        if let Some(credentials) = credentials {
            tracing::info!(users = credentials.len(), "Basic auth enabled on function and system routes");
            protected = protected.layer(middleware::from_fn_with_state(
                Arc::new(credentials),
                basic_auth,
            ));
        }

        let mut router = Router::new().merge(protected);
        if config.health.enabled {
            router = router.route("/healthz", get(healthz));
        }

        let backstop = config.timeouts.request_timeout().saturating_add(TIMEOUT_GRACE);
        router
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, backstop))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal or broadcast arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout = ?self.config.timeouts.request_timeout(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown requested");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
