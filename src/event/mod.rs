//! Edge event subsystem.
//!
//! # Data Flow
//! ```text
//! Origin-request event JSON (Records[0].cf.request)
//!     → cloudfront.rs (deserialize, read first `host` header)
//!     → routing::SubdomainRewriter
//!     → request with rewritten `uri`, every other field unchanged
//! ```
//!
//! # Design Decisions
//! - Unknown event fields are carried through verbatim
//! - Only `Records[0]` is consulted, as the edge runtime delivers one record

pub mod cloudfront;

pub use cloudfront::{
    handle_event_json, handle_origin_request, CloudFrontRequest, EventError, HeaderEntry,
    OriginRequestEvent,
};
