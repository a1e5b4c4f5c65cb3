//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the base domain shape
//! - Validate addresses and value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::uri::Authority;
use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::EdgeConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rewrite.subdomain_base must not be empty")]
    EmptySubdomainBase,

    #[error("rewrite.subdomain_base {0:?} must be a bare domain like \"example.com\"")]
    MalformedSubdomainBase(String),

    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("origin.address {0:?} is not a host:port authority")]
    InvalidOriginAddress(String),

    #[error("origin.host_header {0:?} is not a valid header value")]
    InvalidOriginHost(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_subdomain_base(&config.rewrite.subdomain_base) {
        errors.push(e);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }

    if config.origin.address.parse::<Authority>().is_err() {
        errors.push(ValidationError::InvalidOriginAddress(config.origin.address.clone()));
    }

    if let Some(host) = &config.origin.host_header {
        if host.is_empty() || HeaderValue::from_str(host).is_err() {
            errors.push(ValidationError::InvalidOriginHost(host.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that `base` is a bare domain such as `example.com`.
pub fn validate_subdomain_base(base: &str) -> Result<(), ValidationError> {
    if base.is_empty() {
        return Err(ValidationError::EmptySubdomainBase);
    }
    if base.starts_with('.')
        || base.ends_with('.')
        || base.contains("..")
        || base.chars().any(|c| c.is_whitespace() || c == '/' || c == ':')
    {
        return Err(ValidationError::MalformedSubdomainBase(base.to_string()));
    }
    Ok(())
}
