//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, host/path extraction, rewrite)
//!     → server.rs (forward to origin store)
//!     → response.rs (status mapping, hop-by-hop stripping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeEdgeRequestId, X_FORWARDED_HOST, X_REQUEST_ID};
pub use server::{EdgeState, HttpServer, Origin};
