//! Response handling and transformation.
//!
//! # Responsibilities
//! - Map rewrite failures to HTTP status codes
//! - Strip hop-by-hop headers in both directions
//!
//! # Design Decisions
//! - Host outside the base domain → 421 Misdirected Request
//! - Other unroutable requests → 400 Bad Request
//! - Origin unreachable → 502 Bad Gateway

use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::RewriteError;

/// Headers that apply to a single connection and are never forwarded.
pub const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

impl RewriteError {
    pub fn status(&self) -> StatusCode {
        match self {
            RewriteError::HostMismatch { .. } => StatusCode::MISDIRECTED_REQUEST,
            RewriteError::MissingHost
            | RewriteError::EmptySubdomain { .. }
            | RewriteError::InvalidSubdomain { .. }
            | RewriteError::InvalidPath { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RewriteError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Origin request failed").into_response()
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}
