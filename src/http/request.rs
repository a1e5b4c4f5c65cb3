//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Extract the routing-relevant host and path
//! - Apply the subdomain rewrite to the request target
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Only the first Host value is consulted; `:port` is dropped
//! - HTTP/2 requests without Host fall back to the `:authority` in the URI
//! - Query string survives the rewrite untouched
//! - The parsed target must round-trip to the routed path, or the request is
//!   refused

use axum::http::uri::{Authority, PathAndQuery};
use axum::http::{header, HeaderMap, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::{EdgeRequest, RewriteError, SubdomainRewriter};

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Assigns a UUID v4 to requests that arrive without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeEdgeRequestId;

impl MakeRequestId for MakeEdgeRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID, or `"unknown"` if none was assigned.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Host the client asked for, without port.
pub fn client_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    match headers.get(header::HOST) {
        Some(value) => Some(strip_port(&String::from_utf8_lossy(value.as_bytes()))),
        None => uri.host().map(str::to_string),
    }
}

fn strip_port(host: &str) -> String {
    host.parse::<Authority>()
        .map(|authority| authority.host().to_string())
        .unwrap_or_else(|_| host.to_string())
}

pub fn edge_request<B>(request: &Request<B>) -> EdgeRequest {
    EdgeRequest {
        host: client_host(request.headers(), request.uri()),
        uri: request.uri().path().to_string(),
    }
}

/// Rewrite the request target in place and return the routed descriptor.
///
/// The request is untouched on error.
pub fn apply_rewrite<B>(
    rewriter: &SubdomainRewriter,
    request: &mut Request<B>,
) -> Result<EdgeRequest, RewriteError> {
    let mut edge = edge_request(request);
    rewriter.rewrite(&mut edge)?;

    let path_and_query = routed_target(&edge.uri, request.uri().query())?;

    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    let uri = Uri::from_parts(parts).map_err(|_| RewriteError::InvalidPath {
        path: edge.uri.clone(),
    })?;

    *request.uri_mut() = uri;
    Ok(edge)
}

/// Parse `path` plus the client's query into a request target.
///
/// Fails unless the parsed target carries exactly `path` and `query`; a `#`
/// or `?` inside `path` would otherwise truncate it.
fn routed_target(path: &str, query: Option<&str>) -> Result<PathAndQuery, RewriteError> {
    let invalid = || RewriteError::InvalidPath {
        path: path.to_string(),
    };

    let target = match query {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };
    let parsed = target.parse::<PathAndQuery>().map_err(|_| invalid())?;

    if parsed.path() != path || parsed.query() != query {
        return Err(invalid());
    }
    Ok(parsed)
}
