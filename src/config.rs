use crate::error::{Result, VerifyError};
use crate::poll::{PollOptions, DEFAULT_ATTEMPTS, DEFAULT_DELAY};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONTAINER_WIDTH: f64 = 800.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub token: Option<String>,
    pub poll_attempts: u32,
    pub poll_delay: Duration,
    pub http_timeout_secs: u64,
    /// Width of the preview column pages are scaled to.
    pub container_width: f64,
}

fn load_env() {
    let _ = dotenvy::dotenv();
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match non_empty_var(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| VerifyError::Config(format!("{} must be a number, got '{}'", name, raw))),
    }
}

/// Preview width must be a positive, finite number of pixels.
pub fn validate_container_width(width: f64) -> Result<f64> {
    if width.is_finite() && width > 0.0 {
        Ok(width)
    } else {
        Err(VerifyError::Config(format!(
            "Container width must be a positive number of pixels, got {}",
            width
        )))
    }
}

impl Config {
    /// Reads `.env` (if any) and the process environment.
    pub fn from_env() -> Result<Self> {
        load_env();
        Self::from_vars()
    }

    /// Like `from_env`, but with an explicit `.env` file, e.g. one in the app data folder.
    pub fn from_path(env_path: &Path) -> Result<Self> {
        if env_path.exists() {
            dotenvy::from_path(env_path)
                .map_err(|e| VerifyError::Config(format!("Could not read {}: {}", env_path.display(), e)))?;
        }
        Self::from_vars()
    }

    fn from_vars() -> Result<Self> {
        let base_url = non_empty_var("VERIFY_API_BASE_URL")
            .ok_or_else(|| VerifyError::Config("VERIFY_API_BASE_URL not set in .env".to_string()))?;
        Ok(Self {
            base_url,
            token: non_empty_var("VERIFY_API_TOKEN"),
            poll_attempts: parse_var("VERIFY_POLL_ATTEMPTS", DEFAULT_ATTEMPTS)?,
            poll_delay: Duration::from_millis(parse_var(
                "VERIFY_POLL_DELAY_MS",
                DEFAULT_DELAY.as_millis() as u64,
            )?),
            http_timeout_secs: parse_var("VERIFY_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            container_width: validate_container_width(parse_var(
                "VERIFY_CONTAINER_WIDTH",
                DEFAULT_CONTAINER_WIDTH,
            )?)?,
        })
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            max_attempts: self.poll_attempts,
            delay: self.poll_delay,
        }
    }
}

/// "configured" when a backend URL is available, "not_configured" otherwise.
pub fn status() -> String {
    load_env();
    match non_empty_var("VERIFY_API_BASE_URL") {
        Some(_) => "configured".to_string(),
        None => "not_configured".to_string(),
    }
}
