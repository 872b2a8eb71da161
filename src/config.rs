//! Configuration module for the anime catalog
//!
//! Handles loading environment variables and application configuration.

use std::env;

use crate::constants::DEFAULT_PER_PAGE;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the upstream content API. Every data call degrades to
    /// its empty result when this is missing.
    pub api_url: Option<String>,
    /// Public URL of this site, used for canonical links and the sitemap
    pub site_url: String,
    /// Site name appended to page titles
    pub site_name: String,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Items per catalog page
    pub per_page: u32,
    /// Timeout for upstream requests in seconds
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            site_url: "https://gogosugoi.vercel.app".to_string(),
            site_name: "GogoSugoi".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            per_page: DEFAULT_PER_PAGE,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to the defaults. A missing
    /// `API_URL` is logged here and again by every data call.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_url = env::var("API_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        if api_url.is_none() {
            tracing::error!("[CONFIG_ERROR] API_URL is not defined; catalog data will be empty");
        }

        Self {
            api_url,
            site_url: env::var("SITE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
            site_name: env::var("SITE_NAME").unwrap_or(defaults.site_name),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_or(env::var("PORT").ok(), defaults.port),
            per_page: parse_or(env::var("CATALOG_PER_PAGE").ok(), defaults.per_page),
            request_timeout_secs: parse_or(
                env::var("REQUEST_TIMEOUT_SECS").ok(),
                defaults.request_timeout_secs,
            ),
        }
    }

    /// Config pointing at a given upstream, defaults elsewhere
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: Some(api_url.into()),
            ..Self::default()
        }
    }

    /// `host:port` for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, fallback: T) -> T {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_url.is_none());
        assert_eq!(config.per_page, 24);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_with_api_url() {
        let config = Config::with_api_url("http://localhost:9000");
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.site_name, "GogoSugoi");
    }

    #[test]
    fn test_parse_or_falls_back() {
        assert_eq!(parse_or::<u16>(Some("abc".to_string()), 8080), 8080);
        assert_eq!(parse_or::<u16>(Some(" 3000 ".to_string()), 8080), 3000);
        assert_eq!(parse_or::<u32>(None, 24), 24);
    }
}
