//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path)
//!     → request.rs (EdgeRequest: first Host value + URI path)
//!     → rewriter.rs (suffix check, label extraction, prefix + default document)
//!     → Return: rewritten EdgeRequest or RewriteError
//! ```
//!
//! # Design Decisions
//! - Exactly one mapping: `{sub}.{base}/{path}` → `/{sub}/{path}`
//! - Rewriter is immutable after construction (shared via Arc, no locks)
//! - Single pass: rewriting an already rewritten path prefixes it again
//! - Failures leave the request untouched

pub mod request;
pub mod rewriter;

pub use request::EdgeRequest;
pub use rewriter::{RewriteError, SubdomainRewriter, DEFAULT_DOCUMENT};
