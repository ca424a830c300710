// ABOUTME: Pooled HTTP client for the tracker API with fixed timeouts and bounded retry
// ABOUTME: Constructed once and injected into sources; 404 maps to absent data, not an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use std::time::Duration;

use cutline_core::constants::http::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, DEFAULT_POOL_MAX_IDLE_PER_HOST,
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_TIMEOUT_SECS,
};
use cutline_core::errors::ProviderError;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Upper bound on a single backoff sleep
const MAX_RETRY_DELAY_MS: u64 = 5_000;

/// Source name used in error messages
const PROVIDER_NAME: &str = "tracker";

/// Timeouts, pooling and retry policy of a [`TrackerClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// Attempts after the first one
    pub max_retries: u32,
    /// First backoff delay; doubled per attempt
    pub retry_base_delay: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
        }
    }
}

impl HttpClientConfig {
    /// `base · 2^attempt`, capped
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = u64::try_from(self.retry_base_delay.as_millis()).unwrap_or(u64::MAX);
        let delay = base.saturating_mul(1_u64 << attempt.min(16));
        Duration::from_millis(delay.min(MAX_RETRY_DELAY_MS))
    }
}

/// HTTP client bound to one API base URL
#[derive(Debug, Clone)]
pub struct TrackerClient {
    client: Client,
    base_url: String,
    config: HttpClientConfig,
}

impl TrackerClient {
    /// Build the pooled client.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ConfigurationError`] if the TLS backend or
    /// connection pool cannot be initialized.
    pub fn new(base_url: impl Into<String>, config: HttpClientConfig) -> Result<Self, ProviderError> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| ProviderError::ConfigurationError(e.to_string()))?;
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Base URL with a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration
    #[must_use]
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET `path` relative to the base URL and decode the JSON body.
    ///
    /// Returns `Ok(None)` on 404. Transient failures (connect, timeout, 429,
    /// 5xx) are retried with exponential backoff up to `max_retries` times.
    ///
    /// # Errors
    ///
    /// Returns the last [`ProviderError`] once retries are exhausted, or
    /// immediately for non-retryable statuses and undecodable bodies.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &'static str,
    ) -> Result<Option<T>, ProviderError> {
        let url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        let mut attempt = 0;
        loop {
            match self.attempt(&url, query, what).await {
                Ok(body) => return Ok(body),
                Err(error) if error.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.delay_for_attempt(attempt);
                    warn!(
                        url = %url,
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Transient tracker failure, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &'static str,
    ) -> Result<Option<T>, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(url, "Tracker resource not found");
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::api(
                PROVIDER_NAME,
                status.as_u16(),
                truncate(&message, 200),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| self.request_error(&e))?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ProviderError::ParseError {
                provider: PROVIDER_NAME.to_owned(),
                what,
                message: e.to_string(),
            })
    }

    fn request_error(&self, error: &reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout {
                provider: PROVIDER_NAME.to_owned(),
                elapsed: self.config.timeout,
            }
        } else if error.is_builder() {
            ProviderError::ConfigurationError(error.to_string())
        } else {
            ProviderError::NetworkError(error.to_string())
        }
    }
}

fn truncate(message: &str, max_chars: usize) -> String {
    message.chars().take(max_chars).collect()
}
