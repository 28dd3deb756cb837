//! Runtime configuration for the collector

use std::time::Duration;

use crate::error::{CollectorError, CollectorResult};

/// Environment variable holding the static API key
pub const API_KEY_ENV: &str = "TRIAGE_API_KEY";

/// Everything the collector needs for one run: endpoint, credential,
/// page sizing, and the pacing/retry knobs. Tests construct this directly
/// with short delays; `main` builds it from the environment and CLI.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub base_url: String,
    pub api_key: String,
    pub page_size: u32,
    /// Total attempts per page fetch, including the first
    pub max_attempts: u32,
    /// Backoff base: attempt n waits base * 2^n before the next try
    pub retry_base_delay: Duration,
    /// Pause before every page request
    pub inter_request_delay: Duration,
    /// Pause after a page that yielded records
    pub post_request_delay: Duration,
    /// Pause before each second-pass retry of an empty page
    pub retry_pass_delay: Duration,
    /// Safety valve for a service that never stops advertising more pages
    pub max_pages: Option<u32>,
}

impl CollectorConfig {
    /// Configuration with production pacing defaults
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: trim_trailing_slash(base_url.into()),
            api_key: api_key.into(),
            page_size: 5,
            max_attempts: 8,
            retry_base_delay: Duration::from_secs(1),
            inter_request_delay: Duration::from_millis(500),
            post_request_delay: Duration::from_secs(1),
            retry_pass_delay: Duration::from_secs(2),
            max_pages: None,
        }
    }

    /// Read the credential from the environment. A missing key is a fatal
    /// startup condition, checked before any network work begins.
    pub fn from_env(base_url: impl Into<String>) -> CollectorResult<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            CollectorError::config(format!("{} must be set", API_KEY_ENV))
        })?;

        if api_key.trim().is_empty() {
            return Err(CollectorError::config(format!("{} is empty", API_KEY_ENV)));
        }

        Ok(Self::new(base_url, api_key))
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollectorConfig::new("https://example.com", "key");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.max_attempts, 8);
        assert_eq!(config.retry_base_delay, Duration::from_secs(1));
        assert!(config.max_pages.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = CollectorConfig::new("https://example.com/", "key");
        assert_eq!(config.base_url, "https://example.com");
    }
}
