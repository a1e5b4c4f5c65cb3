//! Request descriptor seen by the rewriter.

use serde::{Deserialize, Serialize};

/// The two fields of an edge request the rewriter cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EdgeRequest {
    /// First value of the Host header, if the request carried one.
    pub host: Option<String>,

    /// Request path, rewritten in place.
    pub uri: String,
}

impl EdgeRequest {
    /// Create a request with a Host value.
    pub fn new(host: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            uri: uri.into(),
        }
    }

    /// Create a request from every Host value present; only the first is kept.
    pub fn from_host_values<I, S>(values: I, uri: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            host: values.into_iter().next().map(Into::into),
            uri: uri.into(),
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_host_value_wins() {
        let req = EdgeRequest::from_host_values(["a.example.com", "b.example.com"], "/");
        assert_eq!(req.host(), Some("a.example.com"));
    }

    #[test]
    fn test_no_host_values() {
        let req = EdgeRequest::from_host_values(Vec::<String>::new(), "/x");
        assert_eq!(req.host(), None);
        assert_eq!(req.uri(), "/x");
    }
}
