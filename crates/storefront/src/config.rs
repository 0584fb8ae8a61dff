//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SHOPIFY_STORE_DOMAIN` - Shopify store domain (e.g., soirn.myshopify.com)
//! - `SHOPIFY_STOREFRONT_ACCESS_TOKEN` - Storefront API access token
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-01)
//! - `WAITLIST_RATE_LIMIT_MAX` - Signups per client per window (default: 5)
//! - `WAITLIST_RATE_LIMIT_WINDOW_SECS` - Rate limit window (default: 60)
//! - `CATALOG_PATH` - Product catalog JSON (default: crates/storefront/content/catalog.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
///
/// These are fatal at startup; no request is ever served with a partial
/// configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Waitlist signup limits
    pub waitlist: WaitlistConfig,
    /// Location of the product catalog
    pub catalog_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Error event sample rate
    pub sentry_sample_rate: f32,
    /// Transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., soirn.myshopify.com)
    pub store_domain: String,
    /// Shopify API version (e.g., 2025-01)
    pub api_version: String,
    /// Storefront API access token
    pub access_token: SecretString,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store_domain", &self.store_domain)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl ShopifyStorefrontConfig {
    /// GraphQL endpoint of the Storefront API.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/api/{}/graphql.json",
            self.store_domain, self.api_version
        )
    }
}

/// Waitlist signup rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitlistConfig {
    /// Requests allowed per client within one window
    pub rate_limit_max: u32,
    /// Length of the fixed rate limit window
    pub rate_limit_window: Duration,
}

impl Default for WaitlistConfig {
    fn default() -> Self {
        Self {
            rate_limit_max: 5,
            rate_limit_window: Duration::from_secs(60),
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
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the Shopify token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_parsed_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        let port = get_parsed_or_default("STOREFRONT_PORT", "3000")?;
        let base_url = get_parsed_or_default("STOREFRONT_BASE_URL", "http://localhost:3000")?;

        let shopify = ShopifyStorefrontConfig::from_env()?;
        let waitlist = WaitlistConfig::from_env()?;
        let catalog_path = PathBuf::from(get_env_or_default(
            "CATALOG_PATH",
            "crates/storefront/content/catalog.json",
        ));

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            shopify,
            waitlist,
            catalog_path,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_parsed_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: get_parsed_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

impl ShopifyStorefrontConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let store_domain = get_required_env("SHOPIFY_STORE_DOMAIN")?;
        validate_store_domain(&store_domain, "SHOPIFY_STORE_DOMAIN")?;

        Ok(Self {
            store_domain,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2025-01"),
            access_token: get_validated_secret("SHOPIFY_STOREFRONT_ACCESS_TOKEN")?,
        })
    }
}

impl WaitlistConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let rate_limit_max: u32 = get_parsed_or_default("WAITLIST_RATE_LIMIT_MAX", "5")?;
        if rate_limit_max == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "WAITLIST_RATE_LIMIT_MAX".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let window_secs: u64 = get_parsed_or_default("WAITLIST_RATE_LIMIT_WINDOW_SECS", "60")?;
        if window_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "WAITLIST_RATE_LIMIT_WINDOW_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            rate_limit_max,
            rate_limit_window: Duration::from_secs(window_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable (or its default) parsed into `T`.
fn get_parsed_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
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

/// A store domain is a bare host name, no scheme or path.
fn validate_store_domain(domain: &str, var_name: &str) -> Result<(), ConfigError> {
    let url = Url::parse(&format!("https://{domain}"))
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if domain.contains("://") || url.host_str() != Some(domain) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "expected a bare domain like soirn.myshopify.com".to_string(),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    // Real API tokens are random hex/base64 and score well above the floor
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
