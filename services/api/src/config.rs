//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use interview_prep_core::RampSchedule;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub cors_origin: String,
    pub openai_api_key: Option<String>,
    pub extraction_model: String,
    pub upload_step: Duration,
    pub processing_step: Duration,
    pub auth_delay: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address = parse_or(&lookup, "BIND_ADDRESS", "0.0.0.0:8000".parse::<SocketAddr>())?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        // --- Extraction Settings ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        let extraction_model =
            lookup("EXTRACTION_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        // --- Simulated Latencies ---
        let upload_step = Duration::from_millis(parse_or(&lookup, "UPLOAD_STEP_MS", Ok(100))?);
        let processing_step =
            Duration::from_millis(parse_or(&lookup, "PROCESSING_STEP_MS", Ok(150))?);
        let auth_delay = Duration::from_millis(parse_or(&lookup, "AUTH_DELAY_MS", Ok(1000))?);

        let max_upload_bytes = parse_or(&lookup, "MAX_UPLOAD_BYTES", Ok(10 * 1024 * 1024))?;

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            openai_api_key,
            extraction_model,
            upload_step,
            processing_step,
            auth_delay,
            max_upload_bytes,
        })
    }

    /// The progress ramp played for each criteria submission.
    pub fn ramp_schedule(&self) -> RampSchedule {
        RampSchedule {
            upload_step_delay: self.upload_step,
            processing_step_delay: self.processing_step,
            ..RampSchedule::default()
        }
    }
}

/// Parses `key` when present, otherwise falls back to `default`.
fn parse_or<F, T>(
    lookup: &F,
    key: &str,
    default: Result<T, <T as FromStr>::Err>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => default.map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
    }
}
