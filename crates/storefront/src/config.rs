//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `SQLite` connection string (e.g. `sqlite:pizzeria.db?mode=rwc`)
//! - `STOREFRONT_SESSION_SECRET` - Session secret (min 32 chars, not a placeholder)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: http://localhost:3000)

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session secret
    pub session_secret: SecretString,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("STOREFRONT_DATABASE_URL")?);
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");

        let session_secret = get_required_env("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;
        let session_secret = SecretString::from(session_secret);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
        })
    }

    /// Socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (controls cookie flags).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Expose the database URL for pool creation.
    #[must_use]
    pub fn database_url(&self) -> &str {
        self.database_url.expose_secret()
    }
}

fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Validate a session secret: long enough and not an obvious placeholder.
fn validate_session_secret(secret: &str, name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            format!("must be at least {MIN_SESSION_SECRET_LENGTH} characters"),
        ));
    }

    let lowered = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_string(),
                format!("contains placeholder pattern \"{pattern}\""),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected() {
        assert!(matches!(
            validate_session_secret("tooshort", "TEST"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        assert!(matches!(
            validate_session_secret("changeme-changeme-changeme-changeme", "TEST"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_valid_secret_accepted() {
        assert!(validate_session_secret("kX9vQ2mRfT7wB4nJc6hL1pZsD8gA5yEu", "TEST").is_ok());
    }
}
