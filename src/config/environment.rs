// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses required and optional environment variables with startup validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! Environment-based configuration management.
//!
//! `DATABASE_URL` and `JWT_SECRET` are required and fail startup when absent
//! or invalid; everything else has a default and logs a warning when it falls
//! back.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Minimum accepted JWT secret length in bytes
const MIN_JWT_SECRET_BYTES: usize = 32;

/// Default fixed-window rate limit: requests per window
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 300;
/// Default fixed-window rate limit: window length in seconds
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
/// Tighter window applied to the auth endpoints
pub const AUTH_RATE_LIMIT_REQUESTS: u32 = 10;
/// Default TTL for catalog cache entries in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type for security and redaction behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Whether the current process runs with `ENVIRONMENT=production`.
///
/// Read directly from the environment so error redaction works even on
/// paths that have no access to the parsed [`ServerConfig`].
#[must_use]
pub fn is_production() -> bool {
    env::var("ENVIRONMENT")
        .or_else(|_| env::var("NODE_ENV"))
        .map(|v| Environment::from_str_or_default(&v).is_production())
        .unwrap_or(false)
}

/// Type-safe database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    Sqlite { path: PathBuf },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        if let Some(path_str) = s.strip_prefix("sqlite:") {
            if path_str == ":memory:" {
                Self::Memory
            } else {
                Self::Sqlite {
                    path: PathBuf::from(path_str),
                }
            }
        } else {
            // Fallback: treat as SQLite file path
            Self::Sqlite {
                path: PathBuf::from(s),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::Sqlite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/forma.db"),
        }
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret (never logged)
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Access token expiry in hours
    pub jwt_expiry_hours: i64,
    /// Refresh token expiry in days
    pub refresh_expiry_days: i64,
}

/// Fixed-window rate limit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Requests per window for general API traffic
    pub requests_per_window: u32,
    /// Requests per window for the auth endpoints
    pub auth_requests_per_window: u32,
    /// Window length in seconds
    pub window_seconds: u64,
}

/// External wger exercise-database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WgerConfig {
    pub enabled: bool,
    pub base_url: String,
}

impl Default for WgerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://wger.de/api/v2".to_owned(),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
    /// CORS origin for the SPA frontend; `None` allows any origin
    pub frontend_url: Option<String>,
    /// Catalog cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// wger external exercise database
    pub wger: WgerConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable (`DATABASE_URL`,
    /// `JWT_SECRET`) is missing or fails validation, or an optional
    /// variable is present but unparseable.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        if dotenvy::dotenv().is_err() {
            warn!("No .env file found, using process environment only");
        }

        let database_url = env::var("DATABASE_URL")
            .context("DATABASE_URL is required (e.g. sqlite:./data/forma.db)")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is required")?;

        let config = Self {
            http_port: env_var_or("PORT", "8080")?
                .parse()
                .context("Invalid PORT value")?,
            log_level: LogLevel::from_str_or_default(&env_var_or("RUST_LOG", "info")?),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )?),
            database_url: DatabaseUrl::parse_url(&database_url),
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: env_var_or("JWT_EXPIRY_HOURS", "24")?
                    .parse()
                    .context("Invalid JWT_EXPIRY_HOURS value")?,
                refresh_expiry_days: env_var_or("REFRESH_EXPIRY_DAYS", "30")?
                    .parse()
                    .context("Invalid REFRESH_EXPIRY_DAYS value")?,
            },
            rate_limit: RateLimitConfig {
                enabled: env_var_or("RATE_LIMIT_ENABLED", "true")?
                    .parse()
                    .context("Invalid RATE_LIMIT_ENABLED value")?,
                requests_per_window: env_var_or(
                    "RATE_LIMIT_REQUESTS",
                    &DEFAULT_RATE_LIMIT_REQUESTS.to_string(),
                )?
                .parse()
                .context("Invalid RATE_LIMIT_REQUESTS value")?,
                auth_requests_per_window: env_var_or(
                    "AUTH_RATE_LIMIT_REQUESTS",
                    &AUTH_RATE_LIMIT_REQUESTS.to_string(),
                )?
                .parse()
                .context("Invalid AUTH_RATE_LIMIT_REQUESTS value")?,
                window_seconds: env_var_or(
                    "RATE_LIMIT_WINDOW",
                    &DEFAULT_RATE_LIMIT_WINDOW_SECS.to_string(),
                )?
                .parse()
                .context("Invalid RATE_LIMIT_WINDOW value")?,
            },
            frontend_url: env::var("FRONTEND_URL").ok(),
            cache_ttl_secs: env_var_or("CACHE_TTL_SECS", &DEFAULT_CACHE_TTL_SECS.to_string())?
                .parse()
                .context("Invalid CACHE_TTL_SECS value")?,
            wger: WgerConfig {
                enabled: env_var_or("WGER_ENABLED", "true")?
                    .parse()
                    .context("Invalid WGER_ENABLED value")?,
                base_url: env_var_or("WGER_BASE_URL", "https://wger.de/api/v2")?,
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate cross-field constraints and emit warnings for risky setups
    fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            bail!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_BYTES} bytes, got {}",
                self.auth.jwt_secret.len()
            );
        }
        if self.auth.jwt_expiry_hours <= 0 {
            bail!("JWT_EXPIRY_HOURS must be positive");
        }
        if self.frontend_url.is_none() {
            warn!("FRONTEND_URL not set; CORS will allow any origin");
        }
        if self.environment.is_production() && self.database_url.is_memory() {
            warn!("In-memory database in production: all data is lost on restart");
        }
        Ok(())
    }

    /// One-line summary for startup logging (secrets omitted)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} env={} db={} rate_limit={}/{}s cache_ttl={}s wger={}",
            self.http_port,
            self.environment,
            self.database_url,
            self.rate_limit.requests_per_window,
            self.rate_limit.window_seconds,
            self.cache_ttl_secs,
            self.wger.enabled,
        )
    }
}

/// Read an environment variable with a default fallback
fn env_var_or(name: &str, default: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Ok(default.to_owned()),
        Err(e) => bail!("Failed to read {name}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_parsing() {
        assert!(DatabaseUrl::parse_url("sqlite::memory:").is_memory());
        let url = DatabaseUrl::parse_url("sqlite:./data/forma.db");
        assert_eq!(url.to_connection_string(), "sqlite:./data/forma.db");
        // Bare paths are treated as sqlite files
        let bare = DatabaseUrl::parse_url("./forma.db");
        assert_eq!(bare.to_connection_string(), "sqlite:./forma.db");
    }

    #[test]
    fn test_log_level_fallback() {
        assert_eq!(LogLevel::from_str_or_default("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("bogus"), LogLevel::Info);
    }

    #[test]
    fn test_environment_parsing() {
        assert!(Environment::from_str_or_default("prod").is_production());
        assert!(!Environment::from_str_or_default("dev").is_production());
    }
}
