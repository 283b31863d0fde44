use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::environment::{resolve_backend_url, BackendMode, HostEnvironment};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub backend_url: Option<String>,
    pub backend_mode: BackendMode,
    pub host_environment: HostEnvironment,
    pub demo_mode: bool,
    pub token_store_path: PathBuf,
    /// Budget for lightweight reads (job description, résumé load).
    pub short_timeout: Duration,
    /// Budget for generation calls (review, questions).
    pub long_timeout: Duration,
    pub retry_delay: Duration,
    pub max_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8787)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            backend_url: std::env::var("BACKEND_URL").ok(),
            backend_mode: parse_env("BACKEND_MODE", BackendMode::Auto)?,
            host_environment: parse_env("HOST_ENVIRONMENT", HostEnvironment::Extension)?,
            demo_mode: parse_env("DEMO_MODE", false)?,
            token_store_path: std::env::var("TOKEN_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".panel/auth.json")),
            short_timeout: Duration::from_secs(parse_env("SHORT_TIMEOUT_SECS", 30)?),
            long_timeout: Duration::from_secs(parse_env("LONG_TIMEOUT_SECS", 150)?),
            retry_delay: Duration::from_millis(parse_env("RETRY_DELAY_MS", 2000)?),
            max_retries: parse_env("MAX_RETRIES", 1)?,
        })
    }

    /// Backend base URL after applying the dev override.
    pub fn backend_base_url(&self) -> String {
        resolve_backend_url(self.backend_mode, self.backend_url.as_deref())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}
