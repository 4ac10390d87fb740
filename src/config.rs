//! Console configuration
//!
//! Reads config from env vars (a `.env` file is loaded first if present):
//!   MDP_API_BASE_URL         - backend base URL (default: http://localhost:8000/api/v1)
//!   MDP_PROJECT_ID           - project attached to created functions (optional)
//!   MDP_PAGE_SIZE            - default search page size (default: 20)
//!   MDP_REQUEST_TIMEOUT_SECS - per-request timeout (default: 30)

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    pub project_id: Option<String>,
    pub page_size: u32,
    pub request_timeout: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            project_id: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ConsoleConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("ignoring unreadable .env file: {}", e);
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let page_size = match non_blank("MDP_PAGE_SIZE") {
            Some(raw) => parse_positive("MDP_PAGE_SIZE", &raw)? as u32,
            None => defaults.page_size,
        };
        let request_timeout = match non_blank("MDP_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("MDP_REQUEST_TIMEOUT_SECS", &raw)?),
            None => defaults.request_timeout,
        };

        Ok(Self {
            api_base_url: non_blank("MDP_API_BASE_URL").unwrap_or(defaults.api_base_url),
            project_id: non_blank("MDP_PROJECT_ID"),
            page_size,
            request_timeout,
        })
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 && n <= u32::MAX as u64 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: raw.to_string(),
        }),
    }
}
