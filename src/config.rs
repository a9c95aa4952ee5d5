// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Built once at startup and passed to the services that need it.

use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.f3nation.com";
pub const DEFAULT_API_CLIENT: &str = "beatdown-sync";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Upstream API ---
    /// F3 Nation API bearer token
    pub api_key: String,
    /// Value of the `client` header identifying this integration
    pub api_client: String,
    /// API base URL (no trailing slash)
    pub api_base_url: String,

    // --- Retry policy for upstream fetches ---
    /// Total attempts per request, including the first
    pub upstream_max_attempts: u32,
    /// Base delay for exponential backoff
    pub upstream_backoff: Duration,
    /// Ceiling on any single wait, including server-supplied hints
    pub upstream_max_backoff: Duration,

    // --- Service ---
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Bearer token the scheduler presents to `/tasks/sync`.
    /// When unset, scheduled syncs over HTTP are refused.
    pub sync_trigger_token: Option<String>,
}

impl Config {
    /// Config for tests: offline values, fast retries.
    pub fn test_default() -> Self {
        Self {
            api_key: "test_api_key".to_string(),
            api_client: DEFAULT_API_CLIENT.to_string(),
            api_base_url: "http://127.0.0.1:9".to_string(),
            upstream_max_attempts: 3,
            upstream_backoff: Duration::from_millis(1),
            upstream_max_backoff: Duration::from_millis(50),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            sync_trigger_token: Some("test_sync_token".to_string()),
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = var("F3_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("F3_API_KEY"))?;

        let api_base_url = var("F3_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            api_client: var("F3_API_CLIENT").unwrap_or_else(|| DEFAULT_API_CLIENT.to_string()),
            api_base_url,
            upstream_max_attempts: parse_or(&var, "UPSTREAM_MAX_ATTEMPTS", 3u32)?.max(1),
            upstream_backoff: Duration::from_millis(parse_or(&var, "UPSTREAM_BACKOFF_MS", 1000)?),
            upstream_max_backoff: Duration::from_secs(parse_or(
                &var,
                "UPSTREAM_MAX_BACKOFF_SECS",
                60,
            )?),
            gcp_project_id: var("GCP_PROJECT_ID").unwrap_or_else(|| "local-dev".to_string()),
            port: parse_or(&var, "PORT", 8080)?,
            sync_trigger_token: var("SYNC_TRIGGER_TOKEN")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

/// Parse an optional variable, falling back to a default when unset.
fn parse_or<F, T>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
