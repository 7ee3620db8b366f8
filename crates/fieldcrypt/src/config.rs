//! Configuration loading and validation.
//!
//! Values are read from `FIELDCRYPT_`-prefixed environment variables. Host
//! applications call [`Config::from_env`] once at startup and surface any error
//! before a session begins.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// URL of the authenticated key endpoint. **Required.**
    pub key_endpoint: String,

    /// Transport timeout (seconds) for the key request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_request_timeout() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is absent or a value is invalid.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("FIELDCRYPT"))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        let endpoint = self.key_endpoint.trim();
        if endpoint.is_empty() {
            anyhow::bail!("FIELDCRYPT_KEY_ENDPOINT is required and must not be empty");
        }
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            anyhow::bail!("FIELDCRYPT_KEY_ENDPOINT must be an http(s) URL");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("FIELDCRYPT_REQUEST_TIMEOUT_SECS must be > 0");
        }
        Ok(())
    }
}
