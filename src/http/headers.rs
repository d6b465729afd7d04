//! Header propagation between client, gateway and function.
//!
//! # Responsibilities
//! - Clone inbound headers onto the upstream request
//! - Add X-Forwarded-Host / X-Forwarded-For when the client did not
//! - Pick the Content-Type relayed back to the client
//! - Mark failures that originate in the gateway itself

use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use std::net::IpAddr;

/// Set on error responses produced by the gateway rather than the function.
pub const X_OPENFAAS_INTERNAL: HeaderName = HeaderName::from_static("x-openfaas-internal");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Content-Type used when neither side supplied one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Append every value of every header in `source` to `destination`.
///
/// Multi-valued headers keep their order.
pub fn copy_headers(destination: &mut HeaderMap, source: &HeaderMap) {
    for (name, value) in source.iter() {
        destination.append(name.clone(), value.clone());
    }
}

/// Headers for the upstream request.
///
/// `Host` is left to the HTTP client so it matches the upstream authority;
/// the original value travels in `X-Forwarded-Host`.
pub fn upstream_headers(original: &HeaderMap, remote_ip: Option<IpAddr>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(original.len() + 2);
    copy_headers(&mut headers, original);
    headers.remove(HOST);

    set_forwarded_headers(&mut headers, original.get(HOST), remote_ip);
    headers
}

/// Fill in forwarding metadata without overwriting what a previous hop set.
pub fn set_forwarded_headers(
    headers: &mut HeaderMap,
    original_host: Option<&HeaderValue>,
    remote_ip: Option<IpAddr>,
) {
    if !headers.contains_key(&X_FORWARDED_HOST) {
        if let Some(host) = original_host {
            headers.insert(X_FORWARDED_HOST, host.clone());
        }
    }

    if !headers.contains_key(&X_FORWARDED_FOR) {
        if let Some(ip) = remote_ip {
            if let Ok(value) = HeaderValue::from_str(&ip.to_string()) {
                headers.insert(X_FORWARDED_FOR, value);
            }
        }
    }
}

/// Content-Type for the relayed response: the function's, else the
/// request's, else [`DEFAULT_CONTENT_TYPE`].
pub fn resolve_content_type(upstream: &HeaderMap, request: &HeaderMap) -> HeaderValue {
    non_empty(upstream.get(CONTENT_TYPE))
        .or_else(|| non_empty(request.get(CONTENT_TYPE)))
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE))
}

fn non_empty(value: Option<&HeaderValue>) -> Option<&HeaderValue> {
    value.filter(|v| !v.is_empty())
}

/// Tag a response as a gateway-side failure.
pub fn mark_internal(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(X_OPENFAAS_INTERNAL, HeaderValue::from_static("proxy"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_headers_keeps_multiple_values() {
        let mut source = HeaderMap::new();
        source.append("x-tag", HeaderValue::from_static("a"));
        source.append("x-tag", HeaderValue::from_static("b"));
        source.insert("X-Custom", HeaderValue::from_static("value"));

        let mut destination = HeaderMap::new();
        copy_headers(&mut destination, &source);

        let tags: Vec<_> = destination.get_all("x-tag").iter().collect();
        assert_eq!(tags, vec!["a", "b"]);
        assert_eq!(destination["x-custom"], "value");

        // Independent of the source after copying.
        source.remove("x-tag");
        assert_eq!(destination.get_all("x-tag").iter().count(), 2);
    }

    #[test]
    fn test_forwarded_for_added_when_absent() {
        let mut original = HeaderMap::new();
        original.insert(HOST, HeaderValue::from_static("gateway.example.com"));

        let headers = upstream_headers(&original, Some("203.0.113.5".parse().unwrap()));

        assert_eq!(headers[X_FORWARDED_FOR], "203.0.113.5");
        assert_eq!(headers[X_FORWARDED_HOST], "gateway.example.com");
        assert!(headers.get(HOST).is_none());
    }

    #[test]
    fn test_existing_forwarded_headers_pass_through() {
        let mut original = HeaderMap::new();
        original.insert(HOST, HeaderValue::from_static("gateway.example.com"));
        original.insert(X_FORWARDED_FOR, HeaderValue::from_static("198.51.100.7"));
        original.insert(X_FORWARDED_HOST, HeaderValue::from_static("edge.example.com"));

        let headers = upstream_headers(&original, Some("203.0.113.5".parse().unwrap()));

        assert_eq!(headers[X_FORWARDED_FOR], "198.51.100.7");
        assert_eq!(headers[X_FORWARDED_HOST], "edge.example.com");
        assert_eq!(headers.get_all(X_FORWARDED_FOR).iter().count(), 1);
    }

    #[test]
    fn test_content_type_precedence() {
        let mut upstream = HeaderMap::new();
        let mut request = HeaderMap::new();
        assert_eq!(resolve_content_type(&upstream, &request), "text/plain");

        request.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        assert_eq!(resolve_content_type(&upstream, &request), "text/csv");

        upstream.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert_eq!(resolve_content_type(&upstream, &request), "application/json");
    }

    #[test]
    fn test_mark_internal() {
        let response = mark_internal(Response::new(axum::body::Body::empty()));
        assert_eq!(response.headers()[X_OPENFAAS_INTERNAL], "proxy");
    }
}
