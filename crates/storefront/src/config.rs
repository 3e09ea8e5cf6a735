//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the defaults match a local development setup
//! with the shop backend on port 8000.
//!
//! - `TAPROOM_API_BASE_URL` - Backend REST base URL (default: `http://127.0.0.1:8000/api`)
//! - `TAPROOM_HOST` - Bind address (default: 127.0.0.1)
//! - `TAPROOM_PORT` - Listen port (default: 3000)
//! - `TAPROOM_CACHE_PATH` - Persisted session cache file (default: `.taproom/session.json`)
//! - `TAPROOM_CHECKOUT_DELAY_MS` - Simulated payment gateway pause (default: 1500, 0 disables)
//! - `TAPROOM_STATIC_DIR` - Stylesheet directory (default: `crates/storefront/static`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend location used by the shop during development.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Default pause before submitting an order.
pub const DEFAULT_CHECKOUT_DELAY_MS: u64 = 1500;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
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
    /// Backend API settings
    pub api: ApiConfig,
    /// Where the session token and profile are persisted
    pub cache_path: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: Url,
    /// Pause before `POST /checkout`, standing in for a payment gateway
    pub checkout_delay: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            checkout_delay: Duration::from_millis(DEFAULT_CHECKOUT_DELAY_MS),
        }
    }
}

impl StorefrontConfig {
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

        let host = get_env_or_default("TAPROOM_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("TAPROOM_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("TAPROOM_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("TAPROOM_PORT".to_string(), e.to_string()))?;

        let api = ApiConfig::from_env()?;
        let cache_path = PathBuf::from(get_env_or_default(
            "TAPROOM_CACHE_PATH",
            ".taproom/session.json",
        ));
        let static_dir = PathBuf::from(get_env_or_default(
            "TAPROOM_STATIC_DIR",
            "crates/storefront/static",
        ));

        Ok(Self {
            host,
            port,
            api,
            cache_path,
            static_dir,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ApiConfig {
    /// Load only the backend settings (shared with the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL or the delay cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = match get_optional_env("TAPROOM_API_BASE_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => default_base_url(),
        };
        let checkout_delay = parse_delay(get_optional_env("TAPROOM_CHECKOUT_DELAY_MS").as_deref())?;

        Ok(Self {
            base_url,
            checkout_delay,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_base_url() -> Url {
    // The constant is a valid absolute URL.
    #[allow(clippy::expect_used)]
    Url::parse(DEFAULT_API_BASE_URL).expect("default base URL is valid")
}

/// Parse a backend base URL, requiring an http(s) scheme.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("TAPROOM_API_BASE_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "TAPROOM_API_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse the checkout delay in milliseconds, falling back to the default.
fn parse_delay(raw: Option<&str>) -> Result<Duration, ConfigError> {
    raw.map_or(Ok(DEFAULT_CHECKOUT_DELAY_MS), |value| {
        value.trim().parse::<u64>().map_err(|e| {
            ConfigError::InvalidEnvVar("TAPROOM_CHECKOUT_DELAY_MS".to_string(), e.to_string())
        })
    })
    .map(Duration::from_millis)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
