//! Web service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PUR_BEURRE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; when neither is set the service runs on in-memory stores)
//! - `PUR_BEURRE_HOST` - Bind address (default: 127.0.0.1)
//! - `PUR_BEURRE_PORT` - Listen port (default: 8000)
//! - `PUR_BEURRE_BASE_URL` - Public URL (default: <http://localhost:8000>)
//! - `PUR_BEURRE_SESSION_TTL_SECONDS` - Session lifetime (default: two weeks, at most ten years)
//! - `PUR_BEURRE_MEMORY_SESSION_CAPACITY` - Session cap in in-memory mode (default: 100000)
//! - `PUR_BEURRE_AUTH_RATE_LIMIT` - Rate limit login/account creation (default: true)
//! - `PUR_BEURRE_TRUST_PROXY` - Key rate limits on `X-Forwarded-For`/`X-Real-IP`
//!   instead of the peer address (default: false, enable only behind a proxy that
//!   overwrites them)
//! - `PUR_BEURRE_DEBUG` - Verbose error pages (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default session lifetime in seconds (two weeks).
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Longest accepted session lifetime in seconds (ten years).
pub const MAX_SESSION_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Default number of live sessions kept when running without a database.
pub const DEFAULT_MEMORY_SESSION_CAPACITY: u64 = 100_000;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web service configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: Url,
    /// Session lifetime in seconds
    pub session_ttl_seconds: i64,
    /// Maximum number of sessions held by the in-memory store
    pub memory_session_capacity: u64,
    /// Whether login and account creation are rate limited per client IP
    pub auth_rate_limit: bool,
    /// Whether proxy headers identify the client for rate limiting
    pub trust_proxy: bool,
    /// Debug mode
    pub debug: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            base_url: default_base_url(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            memory_session_capacity: DEFAULT_MEMORY_SESSION_CAPACITY,
            auth_rate_limit: true,
            trust_proxy: false,
            debug: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("PUR_BEURRE_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|url| !url.trim().is_empty())
            .map(SecretString::from);

        let host = parse_or("PUR_BEURRE_HOST", &lookup, IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port = parse_or("PUR_BEURRE_PORT", &lookup, DEFAULT_PORT)?;

        let base_url = match lookup("PUR_BEURRE_BASE_URL") {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("PUR_BEURRE_BASE_URL".to_string(), e.to_string())
            })?,
            None => default_base_url(),
        };

        let session_ttl_seconds: i64 = parse_or(
            "PUR_BEURRE_SESSION_TTL_SECONDS",
            &lookup,
            DEFAULT_SESSION_TTL_SECONDS,
        )?;
        if !(1..=MAX_SESSION_TTL_SECONDS).contains(&session_ttl_seconds) {
            return Err(ConfigError::InvalidEnvVar(
                "PUR_BEURRE_SESSION_TTL_SECONDS".to_string(),
                format!("must be between 1 and {MAX_SESSION_TTL_SECONDS} seconds"),
            ));
        }

        let memory_session_capacity: u64 = parse_or(
            "PUR_BEURRE_MEMORY_SESSION_CAPACITY",
            &lookup,
            DEFAULT_MEMORY_SESSION_CAPACITY,
        )?;
        if memory_session_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PUR_BEURRE_MEMORY_SESSION_CAPACITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let auth_rate_limit = parse_bool_or("PUR_BEURRE_AUTH_RATE_LIMIT", &lookup, true)?;
        let trust_proxy = parse_bool_or("PUR_BEURRE_TRUST_PROXY", &lookup, false)?;
        let debug = parse_bool_or("PUR_BEURRE_DEBUG", &lookup, false)?;

        let sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty());
        let sentry_environment = lookup("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = lookup("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = lookup("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_ttl_seconds,
            memory_session_capacity,
            auth_rate_limit,
            trust_proxy,
            debug,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the database URL, for tools that cannot run without `PostgreSQL`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no database URL is configured.
    pub fn require_database_url(&self) -> Result<&SecretString, ConfigError> {
        self.database_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("PUR_BEURRE_DATABASE_URL".to_string()))
    }

    /// Whether cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse an optional boolean flag (`true`/`false`, `1`/`0`, `yes`/`no`).
fn parse_bool_or<F>(key: &str, lookup: &F, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<WebConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        WebConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.port, 8000);
        assert_eq!(config.session_ttl_seconds, DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.memory_session_capacity, DEFAULT_MEMORY_SESSION_CAPACITY);
        assert!(config.auth_rate_limit);
        assert!(!config.trust_proxy);
        assert!(!config.debug);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/pur_beurre")]).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://localhost/pur_beurre"
        );

        let config = config_from(&[
            ("PUR_BEURRE_DATABASE_URL", "postgres://primary/db"),
            ("DATABASE_URL", "postgres://fallback/db"),
        ])
        .unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://primary/db"
        );
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("PUR_BEURRE_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "PUR_BEURRE_PORT"));
    }

    #[test]
    fn test_session_ttl_must_be_positive() {
        assert!(config_from(&[("PUR_BEURRE_SESSION_TTL_SECONDS", "0")]).is_err());
        let config = config_from(&[("PUR_BEURRE_SESSION_TTL_SECONDS", "3600")]).unwrap();
        assert_eq!(config.session_ttl_seconds, 3600);
    }

    #[test]
    fn test_session_ttl_upper_bound() {
        let err = config_from(&[("PUR_BEURRE_SESSION_TTL_SECONDS", "999999999999")]).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "PUR_BEURRE_SESSION_TTL_SECONDS")
        );

        let max = MAX_SESSION_TTL_SECONDS.to_string();
        let config = config_from(&[("PUR_BEURRE_SESSION_TTL_SECONDS", max.as_str())]).unwrap();
        assert_eq!(config.session_ttl_seconds, MAX_SESSION_TTL_SECONDS);
    }

    #[test]
    fn test_memory_session_capacity() {
        let config = config_from(&[("PUR_BEURRE_MEMORY_SESSION_CAPACITY", "500")]).unwrap();
        assert_eq!(config.memory_session_capacity, 500);
        assert!(config_from(&[("PUR_BEURRE_MEMORY_SESSION_CAPACITY", "0")]).is_err());
    }

    #[test]
    fn test_bool_flags() {
        let config = config_from(&[
            ("PUR_BEURRE_DEBUG", "True"),
            ("PUR_BEURRE_AUTH_RATE_LIMIT", "0"),
            ("PUR_BEURRE_TRUST_PROXY", "yes"),
        ])
        .unwrap();
        assert!(config.debug);
        assert!(!config.auth_rate_limit);
        assert!(config.trust_proxy);

        assert!(config_from(&[("PUR_BEURRE_DEBUG", "maybe")]).is_err());
    }

    #[test]
    fn test_https_base_url_is_secure() {
        let config = config_from(&[("PUR_BEURRE_BASE_URL", "https://purbeurre.example")]).unwrap();
        assert!(config.is_secure());
        assert!(config_from(&[("PUR_BEURRE_BASE_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = config_from(&[("PUR_BEURRE_HOST", "0.0.0.0"), ("PUR_BEURRE_PORT", "9000")])
            .unwrap();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 9000);
    }
}
