//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CATALOG_BASE_URL` - Public URL; `https://` enables secure cookies
//!
//! ## Optional
//! - `CATALOG_HOST` - Bind address (default: 127.0.0.1)
//! - `CATALOG_PORT` - Listen port (default: 3000)
//! - `CATALOG_SEED_ADMIN_EMAIL` - Super admin email (default: superadmin@catalog.local)
//! - `CATALOG_SEED_ADMIN_FIRST_NAME` - Super admin first name (default: Super)
//! - `CATALOG_SEED_ADMIN_LAST_NAME` - Super admin last name (default: Admin)
//! - `CATALOG_SEED_ADMIN_PASSWORD` - Super admin password; the account is not seeded without it
//! - `CATALOG_LOCKOUT_MAX_ATTEMPTS` - Failures before lockout (default: 10)
//! - `CATALOG_LOCKOUT_MINUTES` - Lockout duration (default: 5)
//! - `CATALOG_REMEMBER_ME_DAYS` - Persistent session lifetime (default: 14)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use product_catalog_core::Email;

use crate::identity::{IdentitySettings, LockoutPolicy, PasswordPolicy};
use crate::services::SeedAdmin;

/// Default email of the seeded super admin.
pub const DEFAULT_SEED_ADMIN_EMAIL: &str = "superadmin@catalog.local";

/// Accepted values for `CATALOG_LOCKOUT_MAX_ATTEMPTS`.
const MAX_ATTEMPTS_RANGE: RangeInclusive<u32> = 1..=1_000;

/// Accepted values for `CATALOG_LOCKOUT_MINUTES` (up to one year).
const LOCKOUT_MINUTES_RANGE: RangeInclusive<i64> = 1..=525_600;

/// Accepted values for `CATALOG_REMEMBER_ME_DAYS` (up to ten years).
const REMEMBER_ME_DAYS_RANGE: RangeInclusive<i64> = 1..=3_650;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "insert",
    "enter-",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Catalog application configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Super admin seeded at startup
    pub seed_admin: SeedAdmin,
    /// Failures before an account is locked
    pub lockout_max_attempts: u32,
    /// Lockout duration in minutes
    pub lockout_minutes: i64,
    /// Persistent session lifetime in days
    pub remember_me_days: i64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl CatalogConfig {
    /// Configuration with defaults for everything but the connection details.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the default seed email fails to parse.
    pub fn new(database_url: SecretString, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: base_url.into(),
            seed_admin: SeedAdmin {
                email: parse_email("CATALOG_SEED_ADMIN_EMAIL", DEFAULT_SEED_ADMIN_EMAIL)?,
                first_name: "Super".to_owned(),
                last_name: "Admin".to_owned(),
                password: None,
            },
            lockout_max_attempts: 10,
            lockout_minutes: 5,
            remember_me_days: 14,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the seed password looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CATALOG_DATABASE_URL")?;
        let host = get_parsed_env::<IpAddr>("CATALOG_HOST", "127.0.0.1")?;
        let port = get_parsed_env::<u16>("CATALOG_PORT", "3000")?;
        let base_url = get_required_env("CATALOG_BASE_URL")?;

        let seed_admin = SeedAdmin {
            email: parse_email(
                "CATALOG_SEED_ADMIN_EMAIL",
                &get_env_or_default("CATALOG_SEED_ADMIN_EMAIL", DEFAULT_SEED_ADMIN_EMAIL),
            )?,
            first_name: get_env_or_default("CATALOG_SEED_ADMIN_FIRST_NAME", "Super"),
            last_name: get_env_or_default("CATALOG_SEED_ADMIN_LAST_NAME", "Admin"),
            password: get_optional_secret("CATALOG_SEED_ADMIN_PASSWORD")?,
        };

        let lockout_max_attempts =
            get_ranged_env("CATALOG_LOCKOUT_MAX_ATTEMPTS", "10", &MAX_ATTEMPTS_RANGE)?;
        let lockout_minutes = get_ranged_env("CATALOG_LOCKOUT_MINUTES", "5", &LOCKOUT_MINUTES_RANGE)?;
        let remember_me_days =
            get_ranged_env("CATALOG_REMEMBER_ME_DAYS", "14", &REMEMBER_ME_DAYS_RANGE)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            seed_admin,
            lockout_max_attempts,
            lockout_minutes,
            remember_me_days,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Identity rules derived from this configuration.
    #[must_use]
    pub fn identity_settings(&self) -> IdentitySettings {
        IdentitySettings {
            password: PasswordPolicy::default(),
            lockout: LockoutPolicy {
                max_failed_attempts: self.lockout_max_attempts,
                duration: Duration::minutes(self.lockout_minutes),
            },
            remember_me: Duration::days(self.remember_me_days),
        }
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
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an environment variable and require it to fall within `range`.
fn get_ranged_env<T>(key: &str, default: &str, range: &RangeInclusive<T>) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let value = get_parsed_env::<T>(key, default)?;
    check_range(key, value, range)
}

fn check_range<T>(key: &str, value: T, range: &RangeInclusive<T>) -> Result<T, ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{value} is outside {}..={}", range.start(), range.end()),
        ))
    }
}

/// Get an optional secret, rejecting placeholder values.
fn get_optional_secret(key: &str) -> Result<Option<SecretString>, ConfigError> {
    let Some(value) = get_optional_env(key) else {
        return Ok(None);
    };
    let secret = SecretString::from(value);
    validate_not_placeholder(&secret, key)?;
    Ok(Some(secret))
}

/// Reject values that look like an unedited template.
fn validate_not_placeholder(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.expose_secret().to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("contains placeholder pattern '{pattern}'"),
        ));
    }
    Ok(())
}

fn parse_email(key: &str, raw: &str) -> Result<Email, ConfigError> {
    Email::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> CatalogConfig {
        CatalogConfig::new(
            SecretString::from("postgres://localhost/test"),
            "http://localhost:3000",
        )
        .unwrap()
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure_follows_scheme() {
        let mut config = config();
        assert!(!config.is_secure());
        config.base_url = "https://catalog.example.com".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_identity_settings_defaults() {
        let settings = config().identity_settings();
        assert_eq!(settings.lockout, LockoutPolicy::default());
        assert_eq!(settings.remember_me, Duration::days(14));
    }

    #[test]
    fn test_check_range_rejects_out_of_range_policy() {
        let cases = [
            ("CATALOG_LOCKOUT_MINUTES", -5, &LOCKOUT_MINUTES_RANGE),
            ("CATALOG_LOCKOUT_MINUTES", 0, &LOCKOUT_MINUTES_RANGE),
            ("CATALOG_LOCKOUT_MINUTES", i64::MAX, &LOCKOUT_MINUTES_RANGE),
            ("CATALOG_REMEMBER_ME_DAYS", -1, &REMEMBER_ME_DAYS_RANGE),
            ("CATALOG_REMEMBER_ME_DAYS", 100_000_000_000, &REMEMBER_ME_DAYS_RANGE),
        ];
        for (key, value, range) in cases {
            let err = check_range(key, value, range).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidEnvVar(k, _) if k == key),
                "{key}={value}: {err}"
            );
        }

        assert!(matches!(
            check_range("CATALOG_LOCKOUT_MAX_ATTEMPTS", 0, &MAX_ATTEMPTS_RANGE),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_check_range_accepts_defaults_and_bounds() {
        assert_eq!(check_range("K", 10, &MAX_ATTEMPTS_RANGE).unwrap(), 10);
        assert_eq!(check_range("K", 1, &MAX_ATTEMPTS_RANGE).unwrap(), 1);
        assert_eq!(check_range("K", 5, &LOCKOUT_MINUTES_RANGE).unwrap(), 5);
        assert_eq!(check_range("K", 525_600, &LOCKOUT_MINUTES_RANGE).unwrap(), 525_600);
        assert_eq!(check_range("K", 3_650, &REMEMBER_ME_DAYS_RANGE).unwrap(), 3_650);

        // The largest accepted values still build durations without panicking.
        let mut config = config();
        config.lockout_minutes = *LOCKOUT_MINUTES_RANGE.end();
        config.remember_me_days = *REMEMBER_ME_DAYS_RANGE.end();
        let settings = config.identity_settings();
        assert_eq!(settings.remember_me, Duration::days(3_650));
    }

    #[test]
    fn test_validate_not_placeholder() {
        let secret = SecretString::from("ChangeMe123!");
        let result = validate_not_placeholder(&secret, "TEST_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));

        let secret = SecretString::from("Sup3r-str0ng!");
        assert!(validate_not_placeholder(&secret, "TEST_SECRET").is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = config();
        config.seed_admin.password = Some(SecretString::from("Sup3r-str0ng!"));
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains(DEFAULT_SEED_ADMIN_EMAIL));
        assert!(!debug_output.contains("Sup3r-str0ng!"));
        assert!(!debug_output.contains("postgres://localhost/test"));
    }
}
