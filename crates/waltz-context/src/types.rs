//! Store configuration and per-request options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Path of the user-context cache endpoint, relative to the base URL.
pub const CONTEXT_CACHE_PATH: &str = "/user-context/cache";

/// User-context store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the server hosting the user-context cache.
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Request timeout in seconds. `None` waits for the server indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_store_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            timeout_secs: None,
        }
    }
}

impl StoreConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `WALTZ_CONTEXT_URL` | Base URL of the user-context cache server |
    /// | `WALTZ_CONTEXT_TIMEOUT` | Request timeout in seconds |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("WALTZ_CONTEXT_URL").unwrap_or_else(|_| default_store_url()),
            timeout_secs: std::env::var("WALTZ_CONTEXT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// Options forwarded with a single store request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Extra headers, e.g. the upstream session's auth headers.
    pub headers: BTreeMap<String, String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(headers: BTreeMap<String, String>) -> Self {
        Self { headers }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        std::env::remove_var("WALTZ_CONTEXT_URL");
        std::env::remove_var("WALTZ_CONTEXT_TIMEOUT");

        let config = StoreConfig::from_env();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.url, "http://localhost:8080");
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    #[serial]
    fn test_config_from_env_overrides() {
        std::env::set_var("WALTZ_CONTEXT_URL", "https://waltz.example.org");
        std::env::set_var("WALTZ_CONTEXT_TIMEOUT", "15");

        let config = StoreConfig::from_env();

        std::env::remove_var("WALTZ_CONTEXT_URL");
        std::env::remove_var("WALTZ_CONTEXT_TIMEOUT");

        assert_eq!(config.url, "https://waltz.example.org");
        assert_eq!(config.timeout_secs, Some(15));
    }

    #[test]
    fn test_config_deserialize_fills_defaults() {
        let config: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::default()
            .with_url("http://cache.local")
            .with_timeout_secs(5);

        assert_eq!(config.url, "http://cache.local");
        assert_eq!(config.timeout_secs, Some(5));
    }

    #[test]
    fn test_request_options_builder() {
        let options = RequestOptions::new()
            .with_header("x-user", "alice")
            .with_header("authorization", "Basic YWxpY2U6");

        assert_eq!(options.headers.len(), 2);
        assert_eq!(options.headers["x-user"], "alice");
    }
}
