//! Subdomain to path-prefix rewriting.
//!
//! # Responsibilities
//! - Check the Host against the configured base domain suffix
//! - Extract the leftmost label as the tenant subdomain
//! - Prefix the URI with `/{subdomain}`
//! - Resolve directory-style paths to the default document
//!
//! # Design Decisions
//! - Suffix match is literal and case-sensitive
//! - The bare base domain (no label) does not match
//! - `a.b.example.com` routes to `a`: only the first label is used
//! - Labels are restricted to ASCII alphanumerics and `-`, so the prefix is
//!   always a single path segment

use thiserror::Error;

use crate::routing::request::EdgeRequest;

/// Document served for paths ending in `/`.
pub const DEFAULT_DOCUMENT: &str = "index.html";

/// Reasons a request cannot be routed to a tenant prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// Host does not end with `.{base}`.
    #[error("Host does not match the expected domain: {host} does not match *.{base}")]
    HostMismatch { host: String, base: String },

    /// Request carried no Host value.
    #[error("Request has no Host header")]
    MissingHost,

    /// Host matched the suffix but its first label is empty (e.g. `.example.com`).
    #[error("Host {host} has an empty subdomain label")]
    EmptySubdomain { host: String },

    /// First label contains characters outside `[A-Za-z0-9-]`.
    #[error("Host {host} has an invalid subdomain label {label:?}")]
    InvalidSubdomain { host: String, label: String },

    /// Routed path is not a valid request target.
    #[error("Routed path {path} is not a valid request target")]
    InvalidPath { path: String },
}

impl RewriteError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RewriteError::HostMismatch { .. } => "host_mismatch",
            RewriteError::MissingHost => "missing_host",
            RewriteError::EmptySubdomain { .. } => "empty_subdomain",
            RewriteError::InvalidSubdomain { .. } => "invalid_subdomain",
            RewriteError::InvalidPath { .. } => "invalid_path",
        }
    }
}

/// Maps `{sub}.{base}/{path}` to `/{sub}/{path}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainRewriter {
    base: String,
    /// `.{base}`, precomputed for the hot path.
    suffix: String,
}

impl SubdomainRewriter {
    /// Create a rewriter for hosts under `base` (e.g. `example.com`).
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        let suffix = format!(".{}", base);
        Self { base, suffix }
    }

    /// The configured base domain.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Extract the subdomain label from a matching host.
    pub fn subdomain<'h>(&self, host: &'h str) -> Result<&'h str, RewriteError> {
        if !host.ends_with(&self.suffix) {
            return Err(RewriteError::HostMismatch {
                host: host.to_string(),
                base: self.base.clone(),
            });
        }

        let label = host.split('.').next().unwrap_or_default();
        if label.is_empty() {
            return Err(RewriteError::EmptySubdomain {
                host: host.to_string(),
            });
        }
        if !is_dns_label(label) {
            return Err(RewriteError::InvalidSubdomain {
                host: host.to_string(),
                label: label.to_string(),
            });
        }
        Ok(label)
    }

    /// Build the origin path for `subdomain` and the client's `uri`.
    pub fn routed_path(&self, subdomain: &str, uri: &str) -> String {
        let mut routed = format!("/{}{}", subdomain, uri);
        if routed.ends_with('/') {
            routed.push_str(DEFAULT_DOCUMENT);
        }
        routed
    }

    /// Rewrite the request URI in place.
    ///
    /// On error the request is left unmodified. Not idempotent: a second call
    /// prefixes the subdomain again.
    pub fn rewrite<'r>(&self, request: &'r mut EdgeRequest) -> Result<&'r EdgeRequest, RewriteError> {
        let host = request.host.as_deref().ok_or(RewriteError::MissingHost)?;
        let subdomain = self.subdomain(host)?;
        let routed = self.routed_path(subdomain, &request.uri);

        tracing::info!(
            host = %host,
            subdomain = %subdomain,
            uri = %routed,
            "Routing to origin path"
        );

        request.uri = routed;
        Ok(&*request)
    }
}

fn is_dns_label(label: &str) -> bool {
    label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> SubdomainRewriter {
        SubdomainRewriter::new("example.com")
    }

    fn rewrite(host: &str, uri: &str) -> Result<String, RewriteError> {
        let mut req = EdgeRequest::new(host, uri);
        rewriter().rewrite(&mut req).map(|r| r.uri.clone())
    }

    #[test]
    fn test_file_path_is_prefixed() {
        assert_eq!(rewrite("a.example.com", "/index.html").unwrap(), "/a/index.html");
        assert_eq!(rewrite("blog.example.com", "/css/site.css").unwrap(), "/blog/css/site.css");
    }

    #[test]
    fn test_root_resolves_to_default_document() {
        assert_eq!(rewrite("a.example.com", "/").unwrap(), "/a/index.html");
    }

    #[test]
    fn test_directory_resolves_to_default_document() {
        assert_eq!(rewrite("a.example.com", "/foo/").unwrap(), "/a/foo/index.html");
    }

    #[test]
    fn test_foreign_host_is_rejected() {
        let err = rewrite("evil.com", "/x").unwrap_err();
        assert_eq!(
            err,
            RewriteError::HostMismatch {
                host: "evil.com".into(),
                base: "example.com".into(),
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("evil.com"));
        assert!(msg.contains("*.example.com"));
    }

    #[test]
    fn test_uri_untouched_on_mismatch() {
        let mut req = EdgeRequest::new("evil.com", "/x");
        assert!(rewriter().rewrite(&mut req).is_err());
        assert_eq!(req.uri, "/x");
    }

    #[test]
    fn test_bare_base_does_not_match() {
        assert!(matches!(
            rewrite("example.com", "/"),
            Err(RewriteError::HostMismatch { .. })
        ));
    }

    #[test]
    fn test_lookalike_domain_does_not_match() {
        assert!(matches!(
            rewrite("a.notexample.com", "/"),
            Err(RewriteError::HostMismatch { .. })
        ));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert!(matches!(
            rewrite("a.EXAMPLE.com", "/"),
            Err(RewriteError::HostMismatch { .. })
        ));
    }

    #[test]
    fn test_nested_subdomain_uses_first_label() {
        assert_eq!(rewrite("a.b.example.com", "/x").unwrap(), "/a/x");
    }

    #[test]
    fn test_missing_host() {
        let mut req = EdgeRequest::from_host_values(Vec::<String>::new(), "/x");
        assert_eq!(rewriter().rewrite(&mut req).unwrap_err(), RewriteError::MissingHost);
        assert_eq!(req.uri, "/x");
    }

    #[test]
    fn test_empty_label() {
        let err = rewrite(".example.com", "/").unwrap_err();
        assert_eq!(err.kind(), "empty_subdomain");
    }

    #[test]
    fn test_label_outside_dns_charset_is_rejected() {
        for host in ["#.example.com", "?.example.com", "a/b.example.com", "a#.example.com", "a b.example.com"] {
            let mut req = EdgeRequest::new(host, "/private/report.pdf");
            let err = rewriter().rewrite(&mut req).unwrap_err();
            assert_eq!(err.kind(), "invalid_subdomain", "{}", host);
            assert_eq!(req.uri, "/private/report.pdf");
        }
    }

    #[test]
    fn test_label_with_hyphen_and_digits_is_accepted() {
        assert_eq!(rewrite("my-site-2.example.com", "/").unwrap(), "/my-site-2/index.html");
        assert_eq!(rewrite("Shop.example.com", "/x").unwrap(), "/Shop/x");
    }

    #[test]
    fn test_rewrite_is_single_pass() {
        let rw = rewriter();
        let mut req = EdgeRequest::new("a.example.com", "/page.html");
        rw.rewrite(&mut req).unwrap();
        rw.rewrite(&mut req).unwrap();
        assert_eq!(req.uri, "/a/a/page.html");
    }

    #[test]
    fn test_rewritten_uri_never_ends_with_slash() {
        for uri in ["/", "/a/", "/a/b/", "//", ""] {
            let routed = rewrite("t.example.com", uri).unwrap();
            assert!(routed.starts_with("/t"));
            assert!(!routed.ends_with('/'), "{} ended with a slash", routed);
        }
    }
}
