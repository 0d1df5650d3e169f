//! Dashboard configuration.

use std::env;
use std::time::Duration;

/// Environment variable overriding [`DashboardConfig::api_url`].
pub const API_URL_ENV: &str = "POOLDASH_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:8001/api";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Base URL of the pool API; endpoint paths are appended to it.
    pub api_url: String,

    /// Poll cadence of the overview page (stats and recent blocks).
    pub overview_interval: Duration,

    /// Poll cadence of the block and payment history pages.
    pub history_interval: Duration,

    /// Number of recent blocks shown on the overview page.
    pub overview_block_limit: u32,

    /// Number of rows requested by the history pages.
    pub history_limit: u32,

    /// Per-request timeout. Keep it below the shortest interval so a hung
    /// request does not swallow ticks.
    pub request_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            overview_interval: Duration::from_secs(10),
            history_interval: Duration::from_secs(30),
            overview_block_limit: 10,
            history_limit: 50,
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl DashboardConfig {
    /// Defaults, with the API URL taken from `POOLDASH_API_URL` if set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = url;
            }
        }
        config
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_cadences() {
        let config = DashboardConfig::default();
        assert_eq!(config.overview_interval, Duration::from_secs(10));
        assert_eq!(config.history_interval, Duration::from_secs(30));
        assert_eq!(config.overview_block_limit, 10);
        assert_eq!(config.history_limit, 50);
        assert!(config.request_timeout < config.overview_interval);
    }

    #[test]
    fn with_api_url_replaces_only_the_url() {
        let config = DashboardConfig::default().with_api_url("http://pool.example:9000/api");
        assert_eq!(config.api_url, "http://pool.example:9000/api");
        assert_eq!(config.history_limit, 50);
    }
}
