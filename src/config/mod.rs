//! # Configuration Settings
//!
//! Defines the configuration structure for the unigate service. Configuration
//! is loaded from environment variables (optionally via a `.env` file) and
//! validated once at startup; an invalid token configuration is fatal rather
//! than surfacing per-request.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Token issuance configuration
    #[validate(nested)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file when present, then overlays process environment
    /// variables. Missing values fall back to defaults; the signing key has
    /// no default and must be provided.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = AppConfig::default();

        if let Ok(host) = std::env::var("UNIGATE_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("UNIGATE_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| Error::config(format!("Invalid UNIGATE_PORT value '{}'", port)))?;
        }
        if let Ok(url) = std::env::var("UNIGATE_DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(issuer) = std::env::var("UNIGATE_JWT_ISSUER") {
            config.auth.issuer = issuer;
        }
        if let Ok(audience) = std::env::var("UNIGATE_JWT_AUDIENCE") {
            config.auth.audience = audience;
        }
        if let Ok(key) = std::env::var("UNIGATE_JWT_SIGNING_KEY") {
            config.auth.signing_key = key;
        }
        if let Ok(ttl) = std::env::var("UNIGATE_JWT_TTL_MINUTES") {
            config.auth.token_ttl_minutes = ttl.parse().map_err(|_| {
                Error::config(format!("Invalid UNIGATE_JWT_TTL_MINUTES value '{}'", ttl))
            })?;
        }

        config.validate_all()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_all(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()?;
        Ok(())
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite:") {
            return Err(Error::config("Database URL must start with 'sqlite:'"));
        }

        if self.auth.signing_key.is_empty() {
            return Err(Error::config("JWT signing key must not be empty"));
        }

        if self.auth.signing_key.len() < 32 {
            return Err(Error::config("JWT signing key must be at least 32 characters long"));
        }

        if self.auth.token_ttl_minutes <= 0 {
            return Err(Error::config("Token TTL must be a positive number of minutes"));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080, enable_cors: true }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of pool connections
    #[validate(range(min = 1, message = "Max connections must be at least 1"))]
    pub max_connections: u32,

    /// Minimum number of pool connections
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[validate(range(min = 1, message = "Connect timeout must be at least 1 second"))]
    pub connect_timeout_seconds: u64,

    /// Idle connection reap timeout in seconds (None = never reap)
    pub idle_timeout_seconds: Option<u64>,

    /// Apply embedded migrations on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://unigate.db".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_seconds: 5,
            idle_timeout_seconds: Some(600),
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_seconds.map(Duration::from_secs)
    }
}

/// Token issuance configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// Issuer claim stamped into every token
    #[validate(length(min = 1, message = "Issuer cannot be empty"))]
    pub issuer: String,

    /// Audience claim stamped into every token
    #[validate(length(min = 1, message = "Audience cannot be empty"))]
    pub audience: String,

    /// Symmetric HS256 signing key (secret)
    pub signing_key: String,

    /// Token lifetime in minutes, relative to issuance
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "unigate".to_string(),
            audience: "unigate-clients".to_string(),
            signing_key: String::new(),
            token_ttl_minutes: 60,
        }
    }
}
