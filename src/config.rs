//! Server configuration.
//!
//! Credentials and endpoint for the Dooray REST API, loaded once at process
//! start from environment variables.

use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the Dooray API base URL.
pub const ENV_BASE_URL: &str = "DOORAY_BASE_URL";

/// Environment variable holding the Dooray API key.
pub const ENV_API_KEY: &str = "DOORAY_API_KEY";

/// Environment variable overriding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "DOORAY_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
}

/// Dooray API configuration, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct DoorayConfig {
    /// Base URL of the Dooray API (e.g. "https://api.dooray.com").
    pub base_url: String,

    /// API key sent on every request.
    pub api_key: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl DoorayConfig {
    /// Create a configuration from explicit values.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `DOORAY_BASE_URL`: API base URL (required)
    /// - `DOORAY_API_KEY`: API key (required)
    /// - `DOORAY_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            std::env::var(ENV_BASE_URL).map_err(|_| ConfigError::MissingEnvVar(ENV_BASE_URL))?;
        let api_key =
            std::env::var(ENV_API_KEY).map_err(|_| ConfigError::MissingEnvVar(ENV_API_KEY))?;
        let timeout_secs = std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            base_url,
            api_key,
            timeout_secs,
        })
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
