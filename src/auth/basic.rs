//! Basic auth middleware.
//!
//! Wraps handlers so that requests without a matching
//! `Authorization: Basic …` header are answered with 401 before the
//! handler runs. Any one of the configured pairs is accepted.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use super::credentials::BasicAuthCredentials;

pub const REALM: &str = r#"Basic realm="Restricted""#;

pub async fn basic_auth(
    State(accepted): State<Arc<Vec<BasicAuthCredentials>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let supplied = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(parse_basic_auth);

    match supplied {
        Some((user, password)) if accepted.iter().any(|c| matches(c, &user, &password)) => {
            next.run(request).await
        }
        _ => {
            tracing::debug!(path = %request.uri().path(), "Rejected request without valid credentials");
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, REALM)],
        "invalid credentials",
    )
        .into_response()
}

/// Decode `Basic base64(user:password)`.
pub fn parse_basic_auth(value: &HeaderValue) -> Option<(String, String)> {
    let value = value.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

fn matches(credentials: &BasicAuthCredentials, user: &str, password: &str) -> bool {
    // Both comparisons always run.
    let user_ok = credentials.user.as_bytes().ct_eq(user.as_bytes());
    let password_ok = credentials.password.as_bytes().ct_eq(password.as_bytes());
    (user_ok & password_ok).into()
}
