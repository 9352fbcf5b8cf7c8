use std::{env, path::PathBuf, time::Duration};

use anyhow::{bail, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 600)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    /// Note: Only used when the `memory` feature is enabled.
    #[allow(dead_code)]
    pub cache_max_entries: usize,
    /// Budget for detached cache maintenance, in milliseconds (default: 5,000)
    pub cache_background_timeout_ms: u64,
    /// Path to SQLite database file (default: "bookshelf.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
    /// Secret used to sign access tokens (required)
    pub jwt_secret: String,
    /// Access token lifetime in hours (default: 24)
    pub token_ttl_hours: i64,
    /// Directory where uploaded cover images are written (default: "uploads")
    pub upload_dir: PathBuf,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_secs: u64,
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 600)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `CACHE_BACKGROUND_TIMEOUT_MS` - Background cache task budget (default: 5,000)
    /// - `SQLITE_PATH` - SQLite database path (default: "bookshelf.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `JWT_SECRET` - Token signing secret (required, non-empty)
    /// - `TOKEN_TTL_HOURS` - Token lifetime in hours (default: 24)
    /// - `UPLOAD_DIR` - Cover image directory (default: "uploads")
    /// - `REQUEST_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Unparsable numeric values fall back to their defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must be set to a non-empty value");
        }

        Ok(Self {
            cache_ttl_seconds: parse_or(lookup("CACHE_TTL_SECONDS"), 600),
            cache_max_entries: parse_or(lookup("CACHE_MAX_ENTRIES"), 10_000),
            cache_background_timeout_ms: parse_or(lookup("CACHE_BACKGROUND_TIMEOUT_MS"), 5_000),
            sqlite_path: lookup("SQLITE_PATH").unwrap_or_else(|| "bookshelf.db".to_string()),
            redis_url: lookup("REDIS_URL")
                .unwrap_or_else(|| "redis://localhost:6379".to_string()),
            jwt_secret,
            token_ttl_hours: parse_or(lookup("TOKEN_TTL_HOURS"), 24),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            request_timeout_secs: parse_or(lookup("REQUEST_TIMEOUT_SECS"), 10),
        })
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn cache_background_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_background_timeout_ms)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = config_from(&[("JWT_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.cache_ttl_seconds, 600);
        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.cache_background_timeout_ms, 5_000);
        assert_eq!(config.sqlite_path, "bookshelf.db");
        assert_eq!(config.redis_url, "redis://localhost:6379");
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("JWT_SECRET", "s3cret"),
            ("CACHE_TTL_SECONDS", "30"),
            ("CACHE_BACKGROUND_TIMEOUT_MS", "250"),
            ("UPLOAD_DIR", "/var/lib/bookshelf/covers"),
        ])
        .unwrap();

        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.cache_background_timeout(), Duration::from_millis(250));
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/bookshelf/covers"));
    }

    #[test]
    fn test_unparsable_number_falls_back() {
        let config =
            config_from(&[("JWT_SECRET", "s3cret"), ("CACHE_TTL_SECONDS", "ten")]).unwrap();

        assert_eq!(config.cache_ttl_seconds, 600);
    }

    #[test]
    fn test_missing_jwt_secret_is_an_error() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("JWT_SECRET", "   ")]).is_err());
    }

    #[test]
    fn test_token_ttl_conversion() {
        let config = config_from(&[("JWT_SECRET", "s3cret"), ("TOKEN_TTL_HOURS", "2")]).unwrap();

        assert_eq!(config.token_ttl(), chrono::Duration::hours(2));
    }
}
