//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use admin_client::config::{DEFAULT_RAG_TIMEOUT, DEFAULT_RAG_UPLOAD_TIMEOUT};
use admin_client::ClientConfig;

const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(8 * 60 * 60);

/// Admin web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Primary backend base URL.
    pub backend_url: String,
    /// Retrieval API base URL.
    pub rag_url: String,
    /// Timeout for retrieval API JSON calls.
    pub rag_timeout: Duration,
    /// Timeout for retrieval API uploads.
    pub rag_upload_timeout: Duration,
    /// How often idle consoles and cache entries are swept.
    pub gc_interval: Duration,
    /// How long a browser's console survives without requests.
    pub session_idle: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ADMIN_ADDR` | Server bind address | `127.0.0.1:3000` |
    /// | `BACKEND_URL` | Primary backend URL | `http://backend:8001` |
    /// | `RAG_API_URL` | Retrieval API URL | `http://rag-api:8000` |
    /// | `RAG_TIMEOUT_SECS` | Retrieval call timeout | `30` |
    /// | `RAG_UPLOAD_TIMEOUT_SECS` | Retrieval upload timeout | `120` |
    /// | `CACHE_GC_SECS` | Console and cache sweep interval | `60` |
    /// | `SESSION_IDLE_SECS` | Idle console lifetime | `28800` |
    ///
    /// Durations must be whole seconds greater than zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("ADMIN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let defaults = ClientConfig::default();
        let backend_url = env::var("BACKEND_URL").unwrap_or(defaults.backend_url);
        let rag_url = env::var("RAG_API_URL").unwrap_or(defaults.rag_url);

        let rag_timeout = seconds("RAG_TIMEOUT_SECS", DEFAULT_RAG_TIMEOUT)?;
        let rag_upload_timeout = seconds("RAG_UPLOAD_TIMEOUT_SECS", DEFAULT_RAG_UPLOAD_TIMEOUT)?;
        let gc_interval = seconds("CACHE_GC_SECS", DEFAULT_GC_INTERVAL)?;
        let session_idle = seconds("SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE)?;

        Ok(Self {
            addr,
            backend_url,
            rag_url,
            rag_timeout,
            rag_upload_timeout,
            gc_interval,
            session_idle,
        })
    }

    /// Client configuration for the two upstream services.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.backend_url, &self.rag_url)
            .with_rag_timeouts(self.rag_timeout, self.rag_upload_timeout)
    }
}

fn seconds(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    parse_seconds(name, env::var(name).ok().as_deref(), default)
}

fn parse_seconds(
    name: &'static str,
    raw: Option<&str>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::ZeroSeconds(name)),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(ConfigError::InvalidSeconds(name)),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ADMIN_ADDR format")]
    InvalidAddr,

    #[error("{0} must be a whole number of seconds")]
    InvalidSeconds(&'static str),

    #[error("{0} must be greater than zero")]
    ZeroSeconds(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_duration_uses_default() {
        let parsed = parse_seconds("CACHE_GC_SECS", None, DEFAULT_GC_INTERVAL).unwrap();
        assert_eq!(parsed, Duration::from_secs(60));
    }

    #[test]
    fn test_duration_is_whole_seconds() {
        let parsed = parse_seconds("RAG_TIMEOUT_SECS", Some(" 45 "), DEFAULT_RAG_TIMEOUT).unwrap();
        assert_eq!(parsed, Duration::from_secs(45));

        let err = parse_seconds("RAG_TIMEOUT_SECS", Some("1.5"), DEFAULT_RAG_TIMEOUT).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSeconds("RAG_TIMEOUT_SECS")));
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        for name in ["CACHE_GC_SECS", "RAG_TIMEOUT_SECS", "RAG_UPLOAD_TIMEOUT_SECS"] {
            let err = parse_seconds(name, Some("0"), DEFAULT_GC_INTERVAL).unwrap_err();
            assert!(matches!(err, ConfigError::ZeroSeconds(rejected) if rejected == name));
            assert_eq!(err.to_string(), format!("{name} must be greater than zero"));
        }
    }
}
