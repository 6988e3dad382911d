//! Application-level configuration loaded from the environment.

use std::env;

use thiserror::Error;
use tracing::info;

/// Port used by the test configuration.
#[cfg(test)]
const DEFAULT_PORT: u16 = 10000;
/// Web frontend allowed to call the read API.
const DEFAULT_ALLOWED_ORIGIN: &str = "https://papaya-website-eight.vercel.app";

/// Errors raised while reading the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("required environment variable `{0}` is not set")]
    MissingVar(&'static str),
    /// `PORT` is set to something that is not a TCP port.
    #[error("`PORT` value `{0}` is not a valid port number")]
    InvalidPort(String),
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Chat platform bot token, handed to the gateway implementation.
    pub discord_token: String,
    /// Storage backend URL (`mongodb://`, `memory:`, or a file path).
    pub database_url: String,
    /// TCP port the read API listens on.
    pub port: u16,
    /// Single origin allowed by the CORS layer.
    pub allowed_origin: String,
}

impl AppConfig {
    /// Read the configuration, failing fast when a required variable is
    /// missing so the process exits non-zero at startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        let discord_token = require("DISCORD_TOKEN")?;
        let database_url = require("DATABASE_URL")?;

        let port = match env::var("PORT") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Ok(_) | Err(_) => return Err(ConfigError::MissingVar("PORT")),
        };

        let allowed_origin = env::var("ALLOWED_ORIGIN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_owned());

        info!(port, allowed_origin, "configuration loaded");

        Ok(Self {
            discord_token,
            database_url,
            port,
            allowed_origin,
        })
    }

    /// Configuration for tests: in-memory store on the default port.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            discord_token: "test-token".to_owned(),
            database_url: "memory:".to_owned(),
            port: DEFAULT_PORT,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_owned(),
        }
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}
