//! Application settings loaded from the environment.
//!
//! Everything except the Wave API key has a development default, so a bare
//! `cargo run` against a local `SQLite` file works out of the box.

use std::time::Duration;

use crate::errors::{Error, Result};

/// Runtime settings for the server and the external providers.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Public base URL used to build payment redirect and webhook URLs
    pub public_base_url: String,
    /// Wave API base URL
    pub wave_base_url: String,
    /// Wave API key (required)
    pub wave_api_key: String,
    /// Request timeout for outbound provider calls
    pub provider_timeout: Duration,
    /// WhatsApp provider endpoint, if configured
    pub whatsapp_url: Option<String>,
    /// SMS provider endpoint, if configured
    pub sms_url: Option<String>,
}

impl Settings {
    /// Loads settings from environment variables.
    ///
    /// # Errors
    /// Returns an error if `WAVE_API_KEY` is unset or a numeric variable
    /// fails to parse.
    pub fn from_env() -> Result<Self> {
        let wave_api_key = std::env::var("WAVE_API_KEY").map_err(Error::EnvVar)?;

        let provider_timeout_secs: u64 = match std::env::var("PROVIDER_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| Error::Config {
                message: format!("PROVIDER_TIMEOUT_SECS is not a number: {raw}"),
            })?,
            Err(_) => 30,
        };

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            wave_base_url: std::env::var("WAVE_BASE_URL")
                .unwrap_or_else(|_| "https://api.wave.com".to_string()),
            wave_api_key,
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            whatsapp_url: std::env::var("WHATSAPP_URL").ok(),
            sms_url: std::env::var("SMS_URL").ok(),
        })
    }
}
