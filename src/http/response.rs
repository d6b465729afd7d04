//! Responses the gateway produces itself.
//!
//! # Design Decisions
//! - Plain-text bodies with fixed wording; callers match on them
//! - Caller errors (405, 400) carry no internal marker
//! - Resolution and transport failures carry `X-OpenFaaS-Internal: proxy`
//! - Resolution failures are always 503

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::http::headers::mark_internal;

pub const MISSING_FUNCTION_NAME: &str = "Please provide a valid route /function/function_name.";

/// Status used for every resolution failure.
pub const RESOLUTION_FAILURE_STATUS: StatusCode = StatusCode::SERVICE_UNAVAILABLE;

pub fn method_not_allowed() -> Response {
    StatusCode::METHOD_NOT_ALLOWED.into_response()
}

pub fn missing_function_name() -> Response {
    (StatusCode::BAD_REQUEST, MISSING_FUNCTION_NAME).into_response()
}

pub fn service_not_found(function: &str) -> Response {
    mark_internal(
        (
            RESOLUTION_FAILURE_STATUS,
            format!("Cannot find service: {}.", function),
        )
            .into_response(),
    )
}

pub fn service_unreachable(function: &str) -> Response {
    mark_internal(
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Can't reach service for: {}.", function),
        )
            .into_response(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::X_OPENFAAS_INTERNAL;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_client_errors_are_not_marked() {
        let response = missing_function_name();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(X_OPENFAAS_INTERNAL).is_none());
        assert_eq!(body_text(response).await, MISSING_FUNCTION_NAME);

        let response = method_not_allowed();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().get(X_OPENFAAS_INTERNAL).is_none());
    }

    #[tokio::test]
    async fn test_gateway_failures_are_marked() {
        let response = service_not_found("figlet");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[X_OPENFAAS_INTERNAL], "proxy");
        assert_eq!(body_text(response).await, "Cannot find service: figlet.");

        let response = service_unreachable("figlet");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[X_OPENFAAS_INTERNAL], "proxy");
        assert_eq!(body_text(response).await, "Can't reach service for: figlet.");
    }
}
