// ABOUTME: Runtime configuration for the forecaster: API endpoint, HTTP policy, concurrency and local paths
// ABOUTME: Loaded from CUTLINE_* environment variables with defaults; CLI flags override individual fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! Environment-based runtime configuration

use std::env;
use std::error::Error as StdError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use cutline_core::config::OverridePolicy;
use cutline_core::constants::api::{DEFAULT_BASE_URL, DEFAULT_SERVER_INDEX, DEFAULT_TIER};
use cutline_core::constants::candidates::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
use cutline_core::constants::env_vars;
use cutline_core::constants::http::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, DEFAULT_POOL_MAX_IDLE_PER_HOST,
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_TIMEOUT_SECS,
};
use cutline_core::constants::paths::{DEFAULT_OUTPUT_DIR, DEFAULT_PROFILE_PATH};
use cutline_providers::HttpClientConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Valid local offsets (hours east of UTC)
const TZ_OFFSET_RANGE: (i32, i32) = (-12, 14);

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Retry attempts after the first request
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    pub retry_base_delay_ms: u64,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
        }
    }
}

impl HttpSettings {
    /// Client configuration for `TrackerClient`
    #[must_use]
    pub const fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            pool_max_idle_per_host: self.pool_max_idle_per_host,
            max_retries: self.max_retries,
            retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }
}

/// Settings of one CLI invocation apart from the forecast model knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Bestdori-compatible API base URL
    pub base_url: String,
    /// Index into per-server timestamp arrays
    pub server_index: usize,
    /// Tier forecast by default
    pub tier: u32,
    /// HTTP client settings
    pub http: HttpSettings,
    /// Concurrent candidate loads (1..=8)
    pub concurrency: usize,
    /// Seasonality profile JSON
    pub profile_path: PathBuf,
    /// Optional holiday calendar JSON
    pub calendar_path: Option<PathBuf>,
    /// Directory for forecast artifacts
    pub output_dir: PathBuf,
    /// Local offset override; detected per event when absent
    pub tz_offset_hours: Option<i32>,
    /// Handling of unknown forecast override keys
    pub override_policy: OverridePolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            server_index: DEFAULT_SERVER_INDEX,
            tier: DEFAULT_TIER,
            http: HttpSettings::default(),
            concurrency: DEFAULT_CONCURRENCY,
            profile_path: PathBuf::from(DEFAULT_PROFILE_PATH),
            calendar_path: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            tz_offset_hours: None,
            override_policy: OverridePolicy::Warn,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or a value is out of range
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            base_url: env::var(env_vars::BASE_URL).unwrap_or(defaults.base_url),
            server_index: parse_or(env_vars::SERVER_INDEX, defaults.server_index)?,
            tier: parse_or(env_vars::TIER, defaults.tier)?,
            http: HttpSettings {
                timeout_secs: parse_or(env_vars::HTTP_TIMEOUT_SECS, defaults.http.timeout_secs)?,
                connect_timeout_secs: parse_or(
                    env_vars::HTTP_CONNECT_TIMEOUT_SECS,
                    defaults.http.connect_timeout_secs,
                )?,
                max_retries: parse_or(env_vars::HTTP_MAX_RETRIES, defaults.http.max_retries)?,
                retry_base_delay_ms: parse_or(
                    env_vars::HTTP_RETRY_DELAY_MS,
                    defaults.http.retry_base_delay_ms,
                )?,
                pool_max_idle_per_host: parse_or(
                    env_vars::HTTP_POOL_SIZE,
                    defaults.http.pool_max_idle_per_host,
                )?,
            },
            concurrency: parse_or(env_vars::CONCURRENCY, defaults.concurrency)?,
            profile_path: env::var(env_vars::PROFILE_PATH)
                .map_or(defaults.profile_path, PathBuf::from),
            calendar_path: env::var(env_vars::CALENDAR_PATH)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            output_dir: env::var(env_vars::OUTPUT_DIR).map_or(defaults.output_dir, PathBuf::from),
            tz_offset_hours: parse_optional(env_vars::TZ_OFFSET)?,
            override_policy: if parse_or(env_vars::STRICT_OVERRIDES, false)? {
                OverridePolicy::Reject
            } else {
                OverridePolicy::Warn
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            bail!(
                "concurrency must be between 1 and {MAX_CONCURRENCY}, got {}",
                self.concurrency
            );
        }
        if self.http.timeout_secs == 0 {
            bail!("HTTP timeout must be positive");
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!("API base URL must be http(s): {}", self.base_url);
        }
        if let Some(offset) = self.tz_offset_hours {
            let (low, high) = TZ_OFFSET_RANGE;
            if !(low..=high).contains(&offset) {
                bail!("timezone offset must be between {low} and {high} hours, got {offset}");
            }
        }
        Ok(())
    }

    /// Log a one-line summary of the active settings
    pub fn log_summary(&self) {
        info!(
            base_url = %self.base_url,
            server = self.server_index,
            tier = self.tier,
            concurrency = self.concurrency,
            retries = self.http.max_retries,
            profile = %self.profile_path.display(),
            calendar = ?self.calendar_path,
            output = %self.output_dir.display(),
            tz_offset = ?self.tz_offset_hours,
            "Runtime configuration loaded"
        );
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    parse_optional(key).map(|value| value.unwrap_or(default))
}

fn parse_optional<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid {key} value: {raw:?}")),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server_index, 3);
        assert_eq!(config.tier, 1000);
        assert_eq!(config.concurrency, 5);
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = RuntimeConfig::default();
        config.concurrency = 0;
        assert!(config.validate().is_err());
        config.concurrency = 9;
        assert!(config.validate().is_err());
        config.concurrency = 8;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tz_offset_bounds() {
        let mut config = RuntimeConfig::default();
        config.tz_offset_hours = Some(15);
        assert!(config.validate().is_err());
        config.tz_offset_hours = Some(-5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_http_settings_map_to_client_config() {
        let settings = HttpSettings {
            timeout_secs: 3,
            connect_timeout_secs: 1,
            max_retries: 2,
            retry_base_delay_ms: 10,
            pool_max_idle_per_host: 4,
        };
        let client = settings.client_config();
        assert_eq!(client.timeout, Duration::from_secs(3));
        assert_eq!(client.retry_base_delay, Duration::from_millis(10));
        assert_eq!(client.max_retries, 2);
    }
}
