//! Function invocation proxy.
//!
//! # Request Lifecycle
//! ```text
//! Received → MethodChecked → NameExtracted → Resolved → Dispatched → Relayed | Errored
//! ```
//!
//! # Responsibilities
//! - Reject methods outside the allowed set (405)
//! - Reject requests without a function name (400)
//! - Resolve the function to a host (503 + internal marker on failure)
//! - Forward method, extra path, query, headers and body to the watchdog
//! - Relay status, headers and a streamed body back (500 + internal marker
//!   when the function cannot be reached or does not answer in time)
//!
//! # Design Decisions
//! - No retries, no buffering of request or response bodies
//! - One pooled client per proxy; safe to share across all requests
//! - Cancellation is by drop: when the client disconnects or the server
//!   timeout fires, the resolver and upstream futures are dropped with it

use axum::body::Body;
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{ConnectInfo, RawPathParams, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode, Uri};
use axum::response::Response;
use futures_util::StreamExt;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

use crate::config::{GatewayConfig, TimeoutConfig, UpstreamConfig};
use crate::http::headers::{resolve_content_type, upstream_headers};
use crate::http::response;
use crate::observability::metrics;
use crate::resolver::{BaseUrlResolver, ResolveError, ResolvedAddress};

/// Methods forwarded to functions.
pub const ALLOWED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

pub fn is_allowed_method(method: &Method) -> bool {
    ALLOWED_METHODS.contains(method)
}

/// Transport settings for the pooled upstream client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyClientConfig {
    pub dial_timeout: Duration,
    pub keep_alive: Duration,
    pub idle_connection_timeout: Duration,
    /// hyper's client writes the body without waiting for `100 Continue`,
    /// so this bound is never reached; it is reported at startup.
    pub expect_continue_timeout: Duration,
    pub max_idle_per_host: usize,
    /// Deadline for the response head, counted from when the request
    /// reaches the proxy.
    pub response_timeout: Duration,
}

impl ProxyClientConfig {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            dial_timeout: upstream.dial_timeout(timeouts),
            keep_alive: upstream.keep_alive(timeouts),
            idle_connection_timeout: Duration::from_millis(upstream.idle_connection_timeout_ms),
            expect_continue_timeout: Duration::from_millis(upstream.expect_continue_timeout_ms),
            max_idle_per_host: upstream.max_idle_per_host,
            response_timeout: timeouts.request_timeout(),
        }
    }

    /// Build the pooled client used for every upstream call.
    pub fn build_client(&self) -> Client<HttpConnector, Body> {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(self.dial_timeout));
        connector.set_keepalive(Some(self.keep_alive));
        connector.set_nodelay(true);

        Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(self.idle_connection_timeout)
            .pool_max_idle_per_host(self.max_idle_per_host)
            .build(connector)
    }
}

/// Route variables captured by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionRoute {
    /// `{name}`; `None` when the route did not capture one.
    pub name: Option<String>,
    /// `{params}`: the path forwarded to the function, without leading `/`,
    /// still percent-encoded.
    pub params: String,
}

impl FunctionRoute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            params: String::new(),
        }
    }

    pub fn with_params(mut self, params: impl Into<String>) -> Self {
        self.params = params.into();
        self
    }

    /// Route variables for a request to `path`.
    ///
    /// `params` is `None` when the router's captures did not decode (for
    /// example `%FF`); the name is then taken from the raw path. The extra
    /// path always comes from the raw path so its encoding reaches the
    /// function unchanged.
    fn from_request(params: Option<&RawPathParams>, path: &str) -> Self {
        let mut route = Self::default();
        if let Some(params) = params {
            for (key, value) in params.iter() {
                match key {
                    "name" => route.name = Some(value.to_string()),
                    "params" => route.params = value.to_string(),
                    _ => {}
                }
            }
        }

        if let Some((name, extra)) = split_function_path(path) {
            if route.name.is_none() && !name.is_empty() {
                route.name = Some(name.to_string());
            }
            route.params = extra.to_string();
        }
        route
    }
}

/// `/function/{name}/{extra}` → `(name, extra)`, both as sent.
fn split_function_path(path: &str) -> Option<(&str, &str)> {
    let rest = path.strip_prefix("/function/")?;
    Some(rest.split_once('/').unwrap_or((rest, "")))
}

#[derive(Debug, Error)]
pub enum UpstreamUrlError {
    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid upstream uri: {0}")]
    Uri(#[from] axum::http::uri::InvalidUri),
}

/// `http://{host}:{port}/{extra_path}?{query}`
///
/// Existing percent-escapes in `extra_path` are kept as they are.
pub fn upstream_uri(
    address: &ResolvedAddress,
    port: u16,
    extra_path: &str,
    query: Option<&str>,
) -> Result<Uri, UpstreamUrlError> {
    let host = match address.host().parse::<IpAddr>() {
        Ok(IpAddr::V6(ip)) => format!("[{}]", ip),
        _ => address.host().to_string(),
    };

    let mut url = Url::parse(&format!("http://{}:{}/", host, port))?;
    url.set_path(extra_path);
    url.set_query(query);

    Ok(url.as_str().parse::<Uri>()?)
}

/// Forwards requests for `/function/{name}` to the function's watchdog.
#[derive(Debug)]
pub struct FunctionProxy {
    resolver: Arc<dyn BaseUrlResolver>,
    client: Client<HttpConnector, Body>,
    watchdog_port: u16,
    response_timeout: Duration,
}

impl FunctionProxy {
    pub fn new(
        resolver: Arc<dyn BaseUrlResolver>,
        client_config: &ProxyClientConfig,
        watchdog_port: u16,
    ) -> Self {
        tracing::info!(
            dial_timeout = ?client_config.dial_timeout,
            keep_alive = ?client_config.keep_alive,
            idle_connection_timeout = ?client_config.idle_connection_timeout,
            expect_continue_timeout = ?client_config.expect_continue_timeout,
            max_idle_per_host = client_config.max_idle_per_host,
            response_timeout = ?client_config.response_timeout,
            watchdog_port,
            "Function proxy client configured"
        );

        Self {
            resolver,
            client: client_config.build_client(),
            watchdog_port,
            response_timeout: client_config.response_timeout,
        }
    }

    pub fn from_config(resolver: Arc<dyn BaseUrlResolver>, config: &GatewayConfig) -> Self {
        let client_config = ProxyClientConfig::new(&config.upstream, &config.timeouts);
        Self::new(resolver, &client_config, config.upstream.watchdog_port)
    }

    /// Run one request through the proxy.
    pub async fn forward(&self, route: FunctionRoute, request: Request<Body>) -> Response {
        let deadline = tokio::time::Instant::now() + self.response_timeout;

        if !is_allowed_method(request.method()) {
            tracing::debug!(method = %request.method(), "Method not allowed");
            return response::method_not_allowed();
        }

        let name = match route.name {
            Some(name) if !name.is_empty() => name,
            _ => return response::missing_function_name(),
        };

        let address = match self.resolver.resolve(&name).await {
            Ok(address) => address,
            Err(err) => {
                match &err {
                    ResolveError::NotFound { .. } => {
                        tracing::warn!(function = %name, error = %err, "Function not found")
                    }
                    ResolveError::Fault { .. } => {
                        tracing::error!(function = %name, error = %err, "Function resolution failed")
                    }
                }
                metrics::record_invocation(
                    &name,
                    response::RESOLUTION_FAILURE_STATUS.as_u16(),
                    Duration::ZERO,
                );
                return response::service_not_found(&name);
            }
        };

        let (parts, body) = request.into_parts();

        let uri = match upstream_uri(&address, self.watchdog_port, &route.params, parts.uri.query())
        {
            Ok(uri) => uri,
            Err(err) => {
                tracing::error!(function = %name, host = %address, error = %err, "Cannot build upstream url");
                return response::service_unreachable(&name);
            }
        };

        let remote_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let mut upstream = Request::new(body);
        *upstream.method_mut() = parts.method.clone();
        *upstream.uri_mut() = uri.clone();
        *upstream.headers_mut() = upstream_headers(&parts.headers, remote_ip);

        let mut timer = InvocationTimer::start(name);

        let outcome = tokio::time::timeout_at(deadline, self.client.request(upstream)).await;
        match outcome {
            Ok(Ok(upstream_response)) => {
                let (mut response_parts, upstream_body) = upstream_response.into_parts();
                timer.status = response_parts.status;

                let content_type = resolve_content_type(&response_parts.headers, &parts.headers);
                response_parts.headers.insert(CONTENT_TYPE, content_type);

                Response::from_parts(response_parts, relay_body(upstream_body, timer))
            }
            Ok(Err(err)) => {
                tracing::error!(
                    function = %timer.function,
                    method = %parts.method,
                    url = %uri,
                    elapsed = ?timer.start.elapsed(),
                    error = %err,
                    "Upstream request failed"
                );
                timer.status = StatusCode::INTERNAL_SERVER_ERROR;
                response::service_unreachable(&timer.function)
            }
            Err(_) => {
                tracing::error!(
                    function = %timer.function,
                    method = %parts.method,
                    url = %uri,
                    elapsed = ?timer.start.elapsed(),
                    timeout = ?self.response_timeout,
                    "Upstream request timed out"
                );
                timer.status = StatusCode::INTERNAL_SERVER_ERROR;
                response::service_unreachable(&timer.function)
            }
        }
    }
}

/// Stream the function's body to the client unchanged.
///
/// The status line is already committed, so a failure here can only be
/// logged; the client sees a truncated body.
fn relay_body(upstream: hyper::body::Incoming, timer: InvocationTimer) -> Body {
    let stream = Body::new(upstream).into_data_stream().map(move |chunk| {
        if let Err(err) = &chunk {
            tracing::error!(function = %timer.function, error = %err, "Response body copy failed");
        }
        chunk
    });
    Body::from_stream(stream)
}

/// Times an invocation from dispatch until the response body is done.
///
/// Logs and records metrics on drop, so every exit path is covered.
struct InvocationTimer {
    function: String,
    status: StatusCode,
    start: Instant,
}

impl InvocationTimer {
    fn start(function: String) -> Self {
        Self {
            function,
            status: StatusCode::OK,
            start: Instant::now(),
        }
    }
}

impl Drop for InvocationTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::info!(
            function = %self.function,
            status = self.status.as_u16(),
            "{} took {:.6} seconds",
            self.function,
            elapsed.as_secs_f64()
        );
        metrics::record_invocation(&self.function, self.status.as_u16(), elapsed);
    }
}

/// Axum handler for the function routes.
pub async fn function_proxy(
    State(proxy): State<Arc<FunctionProxy>>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    request: Request<Body>,
) -> Response {
    let route = FunctionRoute::from_request(params.as_ref().ok(), request.uri().path());
    proxy.forward(route, request).await
}
