//! Provider management endpoints.
//!
//! The gateway only fixes the routes; the platform supplies the handlers.
//! Unset handlers leave their method unrouted.
//!
//! ```text
//! GET/POST/PUT/DELETE  /system/functions            list, deploy, update, delete
//! GET                  /system/function/{name}      replica status
//! POST                 /system/scale-function/{name}
//! GET                  /system/info
//! GET/PUT/POST/DELETE  /system/secrets
//! ```

use axum::handler::Handler;
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::Router;

/// Handlers for the `/system` routes.
///
/// Each setter may be called once; registering the same slot twice panics
/// when the routes overlap.
#[derive(Default)]
pub struct SystemHandlers {
    functions: Option<MethodRouter>,
    replicas: Option<MethodRouter>,
    scale: Option<MethodRouter>,
    info: Option<MethodRouter>,
    secrets: Option<MethodRouter>,
}

impl SystemHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// `GET /system/functions`
    pub fn function_reader<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.functions = add(self.functions, on(MethodFilter::GET, handler));
        self
    }

    /// `POST /system/functions`
    pub fn deploy<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.functions = add(self.functions, on(MethodFilter::POST, handler));
        self
    }

    /// `PUT /system/functions`
    pub fn update<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.functions = add(self.functions, on(MethodFilter::PUT, handler));
        self
    }

    /// `DELETE /system/functions`
    pub fn delete<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.functions = add(self.functions, on(MethodFilter::DELETE, handler));
        self
    }

    /// `GET /system/function/{name}`
    pub fn replica_reader<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.replicas = add(self.replicas, on(MethodFilter::GET, handler));
        self
    }

    /// `POST /system/scale-function/{name}`
    pub fn replica_updater<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.scale = add(self.scale, on(MethodFilter::POST, handler));
        self
    }

    /// `GET /system/info`
    pub fn info<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.info = add(self.info, on(MethodFilter::GET, handler));
        self
    }

    /// `GET`, `PUT`, `POST` and `DELETE /system/secrets`
    pub fn secrets<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        let methods = MethodFilter::GET
            .or(MethodFilter::PUT)
            .or(MethodFilter::POST)
            .or(MethodFilter::DELETE);
        self.secrets = add(self.secrets, on(methods, handler));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_none()
            && self.replicas.is_none()
            && self.scale.is_none()
            && self.info.is_none()
            && self.secrets.is_none()
    }

    /// Mount every registered handler.
    pub fn into_router(self) -> Router {
        let routes = [
            ("/system/functions", self.functions),
            ("/system/function/{name}", self.replicas),
            ("/system/scale-function/{name}", self.scale),
            ("/system/info", self.info),
            ("/system/secrets", self.secrets),
        ];

        routes
            .into_iter()
            .fold(Router::new(), |router, (path, methods)| match methods {
                Some(methods) => router.route(path, methods),
                None => router,
            })
    }
}

fn add(slot: Option<MethodRouter>, route: MethodRouter) -> Option<MethodRouter> {
    Some(match slot {
        Some(existing) => existing.merge(route),
        None => route,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Path;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn handlers() -> SystemHandlers {
        SystemHandlers::new()
            .function_reader(|| async { "[]" })
            .deploy(|| async { StatusCode::ACCEPTED })
            .replica_reader(|Path(name): Path<String>| async move { name })
            .info(|| async { "provider 1.0" })
    }

    async fn call(router: Router, method: &str, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_registered_handlers_are_routed() {
        let router = handlers().into_router();

        assert_eq!(
            call(router.clone(), "GET", "/system/functions").await,
            (StatusCode::OK, "[]".to_string())
        );
        assert_eq!(
            call(router.clone(), "POST", "/system/functions").await.0,
            StatusCode::ACCEPTED
        );
        assert_eq!(
            call(router.clone(), "GET", "/system/function/figlet").await,
            (StatusCode::OK, "figlet".to_string())
        );
        assert_eq!(
            call(router, "GET", "/system/info").await,
            (StatusCode::OK, "provider 1.0".to_string())
        );
    }

    #[tokio::test]
    async fn test_unregistered_methods_and_routes() {
        let router = handlers().into_router();

        assert_eq!(
            call(router.clone(), "DELETE", "/system/functions").await.0,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            call(router.clone(), "POST", "/system/info").await.0,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            call(router, "GET", "/system/secrets").await.0,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_secrets_accepts_its_methods() {
        let router = SystemHandlers::new()
            .secrets(|| async { StatusCode::NO_CONTENT })
            .into_router();

        for method in ["GET", "PUT", "POST", "DELETE"] {
            assert_eq!(
                call(router.clone(), method, "/system/secrets").await.0,
                StatusCode::NO_CONTENT,
                "{method}"
            );
        }
        assert_eq!(
            call(router, "PATCH", "/system/secrets").await.0,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(SystemHandlers::new().is_empty());
        assert!(!SystemHandlers::new().info(|| async { "" }).is_empty());
    }
}
