//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `DATABASE_URL` - `PostgreSQL` connection string; when absent the store
//!   runs on in-memory repositories
//! - `SMTP_HOST` - SMTP relay; when absent invoice e-mail is disabled
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SMTP_USERNAME` / `SMTP_PASSWORD` - SMTP credentials (required with `SMTP_HOST`)
//! - `SMTP_FROM` - Fallback sender when the business e-mail is not set
//! - `EMAIL_TIMEOUT_SECS` - Per-attempt timeout for invoice e-mail (default: 30)
//! - `NOTIFICATION_QUEUE_CAPACITY` - Pending notification events (default: 256)

use std::time::Duration;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_EMAIL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// SMTP relay settings for invoice delivery.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: Option<String>,
}

/// Store application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub smtp: Option<SmtpConfig>,
    pub email_timeout: Duration,
    pub notification_queue_capacity: usize,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a value cannot be parsed or the SMTP block
    /// is only partially configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let database_url = get("DATABASE_URL");

        let smtp = match get("SMTP_HOST") {
            Some(smtp_host) => Some(SmtpConfig {
                host: smtp_host,
                port: parse_or("SMTP_PORT", get("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
                username: get("SMTP_USERNAME")
                    .ok_or_else(|| ConfigError::MissingEnvVar("SMTP_USERNAME".to_string()))?,
                password: get("SMTP_PASSWORD")
                    .ok_or_else(|| ConfigError::MissingEnvVar("SMTP_PASSWORD".to_string()))?,
                from_address: get("SMTP_FROM"),
            }),
            None => None,
        };

        let email_timeout = Duration::from_secs(parse_or(
            "EMAIL_TIMEOUT_SECS",
            get("EMAIL_TIMEOUT_SECS"),
            DEFAULT_EMAIL_TIMEOUT_SECS,
        )?);

        let notification_queue_capacity = parse_or(
            "NOTIFICATION_QUEUE_CAPACITY",
            get("NOTIFICATION_QUEUE_CAPACITY"),
            DEFAULT_QUEUE_CAPACITY,
        )?;
        if notification_queue_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "NOTIFICATION_QUEUE_CAPACITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            database_url,
            smtp,
            email_timeout,
            notification_queue_capacity,
        })
    }

    /// `host:port` listen address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
