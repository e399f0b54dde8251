//! Stream configuration parsed from environment variables.

use canvas::Brush;
use canvas::consts::{DEFAULT_AI_COLOR, DEFAULT_AI_WIDTH};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeouts: Timeouts,
    /// Brush sealed onto AI strokes.
    pub ai_brush: Brush,
}

impl StreamConfig {
    /// Config pointed at `api_url` with every other value defaulted.
    #[must_use]
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeouts: Timeouts::default(),
            ai_brush: Brush::new(DEFAULT_AI_COLOR, DEFAULT_AI_WIDTH),
        }
    }

    /// Build typed stream config from environment variables.
    ///
    /// Required:
    /// - `SKETCH_API_KEY_ENV` (names the env var containing the key)
    ///
    /// Optional:
    /// - `SKETCH_API_URL`: default chat-completions endpoint
    /// - `SKETCH_REQUEST_TIMEOUT_SECS`: default 120
    /// - `SKETCH_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SKETCH_STROKE_COLOR`: default `#4A90E2`
    /// - `SKETCH_STROKE_WIDTH`: default 3.0, must be positive
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] when the key variable is unset
    /// and [`ConfigError::Parse`] for an unusable stroke width.
    pub fn from_env() -> Result<Self, ConfigError> {
        let key_var = std::env::var("SKETCH_API_KEY_ENV")
            .map_err(|_| ConfigError::MissingApiKey { var: "SKETCH_API_KEY_ENV".into() })?;
        let api_key = std::env::var(&key_var).map_err(|_| ConfigError::MissingApiKey { var: key_var.clone() })?;

        let api_url = std::env::var("SKETCH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeouts = Timeouts {
            request_secs: env_parse_u64("SKETCH_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("SKETCH_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let color = std::env::var("SKETCH_STROKE_COLOR").unwrap_or_else(|_| DEFAULT_AI_COLOR.to_string());
        let width = parse_width(std::env::var("SKETCH_STROKE_WIDTH").ok().as_deref())?;

        Ok(Self { api_url, api_key, timeouts, ai_brush: Brush::new(color, width) })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_width(raw: Option<&str>) -> Result<f64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_AI_WIDTH);
    };
    match raw.trim().parse::<f64>() {
        Ok(width) if width.is_finite() && width > 0.0 => Ok(width),
        _ => Err(ConfigError::Parse(format!("invalid SKETCH_STROKE_WIDTH: {raw}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
