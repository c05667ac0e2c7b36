//! Reverse Proxy
//!
//! Forwards requests under a proxy prefix to the configured target,
//! keeping the full path and query. Bodies are buffered on the way in
//! and streamed on the way out.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{HeaderMap, StatusCode},
    response::Response,
};

use super::error::DevServerError;
use super::state::DevServerState;
use crate::config::ProxyRule;

/// Largest request body forwarded upstream (50 MB, same as uploads)
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Headers that describe a single connection and must not be forwarded
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.contains(&name)
}

/// Target URL for a request path: `{target}{path}?{query}`
pub fn target_url(rule: &ProxyRule, path_and_query: &str) -> Result<reqwest::Url, DevServerError> {
    let target = format!("{}{}", rule.target.trim_end_matches('/'), path_and_query);
    reqwest::Url::parse(&target).map_err(|e| DevServerError::BadTarget(format!("{}: {}", target, e)))
}

/// `host[:port]` of a URL, as sent in the Host header
fn authority(url: &reqwest::Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Copy request headers for the upstream request.
///
/// With `change_origin`, Host (and Origin when present) are rewritten to
/// the target so backends that check them see their own address.
pub fn upstream_headers(
    headers: &HeaderMap,
    rule: &ProxyRule,
    target: &reqwest::Url,
) -> reqwest::header::HeaderMap {
    let mut out = reqwest::header::HeaderMap::new();

    for (name, value) in headers {
        let name = name.as_str();
        // reqwest computes the length from the buffered body
        if is_hop_by_hop(name) || name == "content-length" {
            continue;
        }
        if rule.change_origin && (name == "host" || name == "origin") {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::from_bytes(name.as_bytes()),
            reqwest::header::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            out.append(name, value);
        }
    }

    if rule.change_origin {
        if let Some(host) = authority(target).and_then(|a| reqwest::header::HeaderValue::from_str(&a).ok()) {
            out.insert(reqwest::header::HOST, host);
        }
        if headers.contains_key("origin") {
            let origin = target.origin().ascii_serialization();
            if let Ok(origin) = reqwest::header::HeaderValue::from_str(&origin) {
                out.insert(reqwest::header::ORIGIN, origin);
            }
        }
    }

    out
}

/// Forward a request to the rule's target and relay the answer
pub async fn forward(
    state: &DevServerState,
    rule: &ProxyRule,
    request: Request,
) -> Result<Response, DevServerError> {
    let (parts, body) = request.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = target_url(rule, path_and_query)?;

    let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
        .map_err(|e| DevServerError::BadTarget(e.to_string()))?;
    let headers = upstream_headers(&parts.headers, rule, &target);
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| DevServerError::BadRequest(e.to_string()))?;

    tracing::debug!(method = %method, target = %target, "Proxying request");

    let upstream = state
        .client
        .request(method, target)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| DevServerError::Upstream {
            target: rule.target.clone(),
            error: e.to_string(),
        })?;

    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = Response::builder().status(status);
    for (name, value) in upstream.headers() {
        if !is_hop_by_hop(name.as_str()) {
            response = response.header(name.as_str(), value.as_bytes());
        }
    }

    response
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| DevServerError::Internal(format!("Failed to relay response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(change_origin: bool) -> ProxyRule {
        ProxyRule {
            prefix: "/api".to_string(),
            target: "http://localhost:8000/".to_string(),
            change_origin,
        }
    }

    #[test]
    fn test_target_url_keeps_path_and_query() {
        let url = target_url(&rule(true), "/api/projects?limit=5").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/projects?limit=5");
    }

    #[test]
    fn test_change_origin_rewrites_host_and_origin() {
        let mut headers = HeaderMap::new();
        headers.insert("host", "localhost:8080".parse().unwrap());
        headers.insert("origin", "http://localhost:8080".parse().unwrap());
        headers.insert("connection", "keep-alive".parse().unwrap());
        headers.insert("accept", "application/json".parse().unwrap());

        let target = target_url(&rule(true), "/api/health").unwrap();
        let out = upstream_headers(&headers, &rule(true), &target);

        assert_eq!(out.get("host").unwrap(), "localhost:8000");
        assert_eq!(out.get("origin").unwrap(), "http://localhost:8000");
        assert_eq!(out.get("accept").unwrap(), "application/json");
        assert!(out.get("connection").is_none());
    }

    #[test]
    fn test_without_change_origin_host_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert("host", "localhost:8080".parse().unwrap());

        let target = target_url(&rule(false), "/api/health").unwrap();
        let out = upstream_headers(&headers, &rule(false), &target);

        assert_eq!(out.get("host").unwrap(), "localhost:8080");
        assert!(out.get("origin").is_none());
    }
}
