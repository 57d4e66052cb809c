use std::{env, time::Duration};

use anyhow::{Context, Result};
use url::Url;

const DEFAULT_PROFILE_URL: &str = "https://graph.microsoft.com/v1.0/me";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Profile endpoint called with the session's access token
    pub profile_url: Url,
    /// Upper bound for one profile request (default: 10s)
    pub profile_timeout: Duration,
    /// Path to SQLite database file (default: "gatehouse.db")
    /// Note: Only used when the `auth-sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `auth-redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PROFILE_URL` - Profile endpoint (default: Microsoft Graph `/v1.0/me`)
    /// - `PROFILE_TIMEOUT_SECONDS` - Profile request timeout (default: 10)
    /// - `SQLITE_PATH` - SQLite database path (default: "gatehouse.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let profile_url = lookup("PROFILE_URL").unwrap_or_else(|| DEFAULT_PROFILE_URL.to_string());

        Ok(Self {
            profile_url: Url::parse(&profile_url)
                .with_context(|| format!("PROFILE_URL is not a valid URL: {profile_url}"))?,
            profile_timeout: lookup("PROFILE_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(10)),
            sqlite_path: lookup("SQLITE_PATH").unwrap_or_else(|| "gatehouse.db".to_string()),
            redis_url: lookup("REDIS_URL")
                .unwrap_or_else(|| "redis://localhost:6379".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.profile_url.as_str(), DEFAULT_PROFILE_URL);
        assert_eq!(config.profile_timeout, Duration::from_secs(10));
        assert_eq!(config.sqlite_path, "gatehouse.db");
        assert_eq!(config.redis_url, "redis://localhost:6379");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(|key: &str| match key {
            "PROFILE_URL" => Some("http://localhost:9000/me".to_string()),
            "PROFILE_TIMEOUT_SECONDS" => Some("2".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.profile_url.as_str(), "http://localhost:9000/me");
        assert_eq!(config.profile_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_profile_url() {
        let result = Config::from_lookup(|key: &str| {
            (key == "PROFILE_URL").then(|| "not a url".to_string())
        });

        assert!(result.is_err());
    }
}
