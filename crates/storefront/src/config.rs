//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (`https://` enables secure cookies)
//!
//! ## Optional
//! - `PASARKU_API_URL` - Pasarku REST backend (default: `https://pasarku-backend.vercel.app/api`)
//! - `PASARKU_QUALITY_CHECK_URL` - Produce quality prediction service (default: `http://127.0.0.1:8000/predict`)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CATALOG_TTL_SECS` - Catalog cache lifetime (default: 60)
//! - `STOREFRONT_REQUEST_TIMEOUT_SECS` - Backend request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://pasarku-backend.vercel.app/api";
pub const DEFAULT_QUALITY_CHECK_URL: &str = "http://127.0.0.1:8000/predict";
const DEFAULT_CATALOG_TTL_SECS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Pasarku backend configuration
    pub api: PasarkuApiConfig,
    /// Produce quality prediction endpoint
    pub quality_check_url: Url,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Pasarku REST backend configuration.
///
/// Shared by the storefront and the CLI.
#[derive(Debug, Clone)]
pub struct PasarkuApiConfig {
    /// Base URL, without trailing slash (e.g. `https://host/api`)
    pub base_url: Url,
    /// How long catalog search results and the merchant list stay cached
    pub catalog_ttl: Duration,
    /// Timeout applied to every backend request
    pub request_timeout: Duration,
}

impl PasarkuApiConfig {
    /// Configuration for `base_url` with default cache and timeout settings.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            catalog_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Load the backend settings alone.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let base_url = parse_url(
            "PASARKU_API_URL",
            &get_env_or_default("PASARKU_API_URL", DEFAULT_API_URL),
        )?;
        let catalog_ttl = parse_secs(
            "STOREFRONT_CATALOG_TTL_SECS",
            get_optional_env("STOREFRONT_CATALOG_TTL_SECS").as_deref(),
            DEFAULT_CATALOG_TTL_SECS,
        )?;
        let request_timeout = parse_secs(
            "STOREFRONT_REQUEST_TIMEOUT_SECS",
            get_optional_env("STOREFRONT_REQUEST_TIMEOUT_SECS").as_deref(),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            base_url,
            catalog_ttl,
            request_timeout,
        })
    }

    /// Absolute URL for an API path such as `/order/42/status`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = parse_value(
            "STOREFRONT_HOST",
            &get_env_or_default("STOREFRONT_HOST", "127.0.0.1"),
        )?;
        let port = parse_value(
            "STOREFRONT_PORT",
            &get_env_or_default("STOREFRONT_PORT", "3000"),
        )?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        parse_url("STOREFRONT_BASE_URL", &base_url)?;

        let api = PasarkuApiConfig::from_env()?;
        let quality_check_url = parse_url(
            "PASARKU_QUALITY_CHECK_URL",
            &get_env_or_default("PASARKU_QUALITY_CHECK_URL", DEFAULT_QUALITY_CHECK_URL),
        )?;

        Ok(Self {
            host,
            port,
            base_url,
            api,
            quality_check_url,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_value(
                "SENTRY_SAMPLE_RATE",
                &get_env_or_default("SENTRY_SAMPLE_RATE", "1.0"),
            )?,
            sentry_traces_sample_rate: parse_value(
                "SENTRY_TRACES_SAMPLE_RATE",
                &get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0"),
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = parse_value::<Url>(key, raw)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_secs(key: &str, raw: Option<&str>, default: u64) -> Result<Duration, ConfigError> {
    let secs = match raw {
        Some(raw) => parse_value::<u64>(key, raw)?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            api: PasarkuApiConfig::new(DEFAULT_API_URL.parse().unwrap()),
            quality_check_url: DEFAULT_QUALITY_CHECK_URL.parse().unwrap(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_secure_cookies_follow_scheme() {
        assert!(!test_config("http://localhost:3000").is_secure());
        assert!(test_config("https://pasarku.id").is_secure());
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let api = PasarkuApiConfig::new("https://pasarku-backend.vercel.app/api/".parse().unwrap());
        assert_eq!(
            api.endpoint("/order/42/status"),
            "https://pasarku-backend.vercel.app/api/order/42/status"
        );
        assert_eq!(
            api.endpoint("cart"),
            "https://pasarku-backend.vercel.app/api/cart"
        );
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        assert!(parse_url("X", "ftp://example.org").is_err());
        assert!(parse_url("X", "not a url").is_err());
        assert!(parse_url("X", "http://127.0.0.1:8000/predict").is_ok());
    }

    #[test]
    fn test_parse_secs_default_and_invalid() {
        assert_eq!(parse_secs("X", None, 60).unwrap(), Duration::from_secs(60));
        assert_eq!(parse_secs("X", Some("5"), 60).unwrap(), Duration::from_secs(5));
        let err = parse_secs("X", Some("-1"), 60).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "X"));
    }
}
