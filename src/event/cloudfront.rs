//! CloudFront origin-request event handling.
//!
//! The edge runtime hands the function an event shaped like
//! `{"Records":[{"cf":{"config":{..},"request":{..}}}]}` and forwards whatever
//! request object the function returns. Header names in `request.headers` are
//! lowercase and map to a list of `{key, value}` entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::routing::{EdgeRequest, RewriteError, SubdomainRewriter};

/// Errors produced while handling an origin-request event.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event contains no records")]
    NoRecords,

    #[error("Malformed event: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Top-level event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OriginRequestEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventRecord {
    pub cf: CloudFrontPayload,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CloudFrontPayload {
    pub request: CloudFrontRequest,

    /// Distribution config and anything else the runtime adds.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The request object forwarded to the origin.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CloudFrontRequest {
    pub uri: String,

    #[serde(default)]
    pub headers: BTreeMap<String, Vec<HeaderEntry>>,

    /// `method`, `querystring`, `clientIp`, `origin`, ... carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeaderEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

impl CloudFrontRequest {
    /// All values of a header, in the order the runtime delivered them.
    pub fn header_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .get(&name.to_ascii_lowercase())
            .into_iter()
            .flatten()
            .map(|entry| entry.value.as_str())
    }
}

/// Rewrite the first record's request URI for its tenant prefix.
pub fn handle_origin_request(
    rewriter: &SubdomainRewriter,
    event: OriginRequestEvent,
) -> Result<CloudFrontRequest, EventError> {
    let record = event.records.into_iter().next().ok_or(EventError::NoRecords)?;
    let mut request = record.cf.request;

    let mut edge = EdgeRequest::from_host_values(request.header_values("host"), request.uri.clone());
    rewriter.rewrite(&mut edge)?;

    request.uri = edge.uri;
    Ok(request)
}

/// JSON in, JSON out.
pub fn handle_event_json(rewriter: &SubdomainRewriter, input: &str) -> Result<String, EventError> {
    let event: OriginRequestEvent = serde_json::from_str(input)?;
    let request = handle_origin_request(rewriter, event)?;
    Ok(serde_json::to_string(&request)?)
}
