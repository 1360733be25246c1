//! Client configuration read from the environment.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },
}

/// Where the product API lives and how long a request may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub const URL_VAR: &'static str = "PRODUCT_API_URL";
    pub const TIMEOUT_VAR: &'static str = "PRODUCT_API_TIMEOUT_SECS";
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000/api/v1";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the common case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; unset variables fall back to
    /// the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match lookup(Self::URL_VAR) {
            Some(value) => {
                let trimmed = value.trim();
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(ConfigError::InvalidUrl {
                        var: Self::URL_VAR,
                        value,
                    });
                }
                trimmed.to_string()
            }
            None => Self::DEFAULT_BASE_URL.to_string(),
        };

        let timeout = match lookup(Self::TIMEOUT_VAR) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: Self::TIMEOUT_VAR,
                        value,
                    })
                }
            },
            None => Self::DEFAULT_TIMEOUT,
        };

        Ok(Self { base_url, timeout })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}
