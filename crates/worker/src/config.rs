//! Worker configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `REPLENISH_DATABASE_URL` - `PostgreSQL` connection string
//! - `REPLENISH_MEDIA_BASE_URL` - Public base URL for catalog media
//! - `SMTP_HOST` - SMTP server hostname
//! - `SMTP_USERNAME` - SMTP authentication username
//! - `SMTP_PASSWORD` - SMTP authentication password
//! - `SMTP_FROM` - Fallback sender address when the store has no support identity
//!
//! ## Optional
//! - `REPLENISH_STORE_ID` - Store scope for catalog and settings lookups (default: 1)
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SMTP_FROM_NAME` - Fallback sender display name (default: "Customer Support")

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use replenish_core::StoreId;

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_NAME: &str = "Customer Support";
const DEFAULT_STORE_ID: i32 = 1;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Worker application configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Store scope used for product and settings lookups
    pub store_id: StoreId,
    /// Base URL for catalog media, normalized to end with a slash
    pub media_base_url: String,
    /// SMTP transport configuration
    pub email: EmailConfig,
}

/// SMTP transport configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Fallback sender address
    pub from_address: String,
    /// Fallback sender display name
    pub from_name: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .finish()
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = SecretString::from(require("REPLENISH_DATABASE_URL")?);

        let media_base_url = normalize_base_url(&require("REPLENISH_MEDIA_BASE_URL")?)?;

        let store_id = match std::env::var("REPLENISH_STORE_ID") {
            Ok(raw) => raw.parse::<i32>().map(StoreId::new).map_err(|e| {
                ConfigError::InvalidEnvVar("REPLENISH_STORE_ID".into(), e.to_string())
            })?,
            Err(_) => StoreId::new(DEFAULT_STORE_ID),
        };

        let smtp_port = match std::env::var("SMTP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".into(), e.to_string()))?,
            Err(_) => DEFAULT_SMTP_PORT,
        };

        let email = EmailConfig {
            smtp_host: require("SMTP_HOST")?,
            smtp_port,
            smtp_username: require("SMTP_USERNAME")?,
            smtp_password: SecretString::from(require("SMTP_PASSWORD")?),
            from_address: require("SMTP_FROM")?,
            from_name: std::env::var("SMTP_FROM_NAME")
                .unwrap_or_else(|_| DEFAULT_FROM_NAME.to_string()),
        };

        Ok(Self {
            database_url,
            store_id,
            media_base_url,
            email,
        })
    }
}

fn require(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Validate a base URL and make sure it ends with a slash so media paths can
/// be appended directly.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("REPLENISH_MEDIA_BASE_URL".into(), e.to_string()))?;

    let mut s = url.to_string();
    if !s.ends_with('/') {
        s.push('/');
    }
    Ok(s)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_appends_slash() {
        assert_eq!(
            normalize_base_url("https://cdn.example.com/media").unwrap(),
            "https://cdn.example.com/media/"
        );
    }

    #[test]
    fn test_normalize_base_url_keeps_existing_slash() {
        assert_eq!(
            normalize_base_url("https://cdn.example.com/media/").unwrap(),
            "https://cdn.example.com/media/"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_garbage() {
        assert!(normalize_base_url("not a url").is_err());
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            smtp_username: "mailer".into(),
            smtp_password: SecretString::from("hunter2".to_string()),
            from_address: "support@example.com".into(),
            from_name: "Support".into(),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }
}
