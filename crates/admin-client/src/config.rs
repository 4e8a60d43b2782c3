//! Configuration types for admin-client.

use std::time::Duration;

/// Default request timeout for the retrieval API.
pub const DEFAULT_RAG_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for document uploads to the retrieval API.
pub const DEFAULT_RAG_UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for connecting to the two upstream services.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the primary backend (e.g., "http://backend:8001").
    pub backend_url: String,
    /// Base URL of the retrieval API (e.g., "http://rag-api:8000").
    pub rag_url: String,
    /// Timeout for JSON calls to the retrieval API.
    pub rag_timeout: Duration,
    /// Timeout for multipart uploads to the retrieval API.
    pub rag_upload_timeout: Duration,
}

impl ClientConfig {
    /// Create a new configuration with the given base URLs and default timeouts.
    pub fn new(backend_url: impl Into<String>, rag_url: impl Into<String>) -> Self {
        Self {
            backend_url: trim_base(backend_url.into()),
            rag_url: trim_base(rag_url.into()),
            rag_timeout: DEFAULT_RAG_TIMEOUT,
            rag_upload_timeout: DEFAULT_RAG_UPLOAD_TIMEOUT,
        }
    }

    /// Override the retrieval API timeouts.
    pub fn with_rag_timeouts(mut self, request: Duration, upload: Duration) -> Self {
        self.rag_timeout = request;
        self.rag_upload_timeout = upload;
        self
    }

    /// Full URL of a primary backend endpoint.
    pub fn backend_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }

    /// Full URL of a retrieval API endpoint.
    pub fn rag_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.rag_url, path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://backend:8001", "http://rag-api:8000")
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_targets() {
        let config = ClientConfig::default();
        assert_eq!(config.backend_url, "http://backend:8001");
        assert_eq!(config.rag_url, "http://rag-api:8000");
        assert_eq!(config.rag_timeout, Duration::from_secs(30));
        assert_eq!(config.rag_upload_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_endpoints_strip_trailing_slash() {
        let config = ClientConfig::new("http://localhost:8001/", "http://localhost:8000/");
        assert_eq!(config.backend_endpoint("/users"), "http://localhost:8001/users");
        assert_eq!(config.rag_endpoint("/documents"), "http://localhost:8000/documents");
    }

    #[test]
    fn test_with_rag_timeouts() {
        let config = ClientConfig::default()
            .with_rag_timeouts(Duration::from_secs(5), Duration::from_secs(10));
        assert_eq!(config.rag_timeout, Duration::from_secs(5));
        assert_eq!(config.rag_upload_timeout, Duration::from_secs(10));
    }
}
