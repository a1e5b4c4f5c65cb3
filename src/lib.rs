//! Wildcard-subdomain edge rewriter.
//!
//! Routes `{sub}.example.com/{path}` to `/{sub}/{path}` in a shared origin
//! store, resolving directory paths to `index.html`.

pub mod config;
pub mod event;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{EdgeRequest, RewriteError, SubdomainRewriter};
