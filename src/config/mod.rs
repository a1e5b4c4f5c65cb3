//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (SUBDOMAIN_BASE, EDGE_BIND_ADDRESS, EDGE_ORIGIN_ADDRESS)
//!     → validation.rs (semantic checks)
//!     → EdgeConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → HttpServer swaps rewriter + origin atomically
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Environment wins over the file
//! - The base domain reaches the rewriter as a constructor argument, never a global

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    EdgeConfig, ListenerConfig, ObservabilityConfig, OriginConfig, RewriteConfig, SecurityConfig,
    TimeoutConfig,
};
pub use validation::ValidationError;
