// ABOUTME: Structured error type for remote event-data sources
// ABOUTME: Classifies network, status, timeout and parse failures with retry hints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use std::time::Duration;

use thiserror::Error;

/// Failure of an `EventSource` call.
///
/// Absent data is not an error: sources return `Ok(None)` for that. These
/// variants describe transport or decoding failures which the forecasting
/// pipeline treats as "data unavailable" once the retry budget is spent.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Remote API answered with a non-success status
    #[error("{provider} API error ({status_code}): {message}")]
    ApiError {
        /// Source name
        provider: String,
        /// HTTP status code
        status_code: u16,
        /// Response body excerpt or reason
        message: String,
        /// Whether retrying could succeed
        retryable: bool,
    },

    /// Connection-level failure
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request exceeded its deadline
    #[error("{provider} request timed out after {elapsed:?}")]
    Timeout {
        /// Source name
        provider: String,
        /// Configured timeout
        elapsed: Duration,
    },

    /// Payload could not be decoded into the expected shape
    #[error("{provider} returned an unparseable {what}: {message}")]
    ParseError {
        /// Source name
        provider: String,
        /// Which resource failed to decode
        what: &'static str,
        /// Decoder message
        message: String,
    },

    /// Client misconfiguration (bad base URL, TLS setup, ...)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl ProviderError {
    /// Whether the failure is transient and worth another attempt
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError { retryable, .. } => *retryable,
            Self::NetworkError(_) | Self::Timeout { .. } => true,
            Self::ParseError { .. } | Self::ConfigurationError(_) => false,
        }
    }

    /// Build an API error, deriving the retry hint from the status code
    #[must_use]
    pub fn api(provider: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status_code,
            message: message.into(),
            retryable: is_retryable_status(status_code),
        }
    }
}

/// 429 and 5xx responses are transient
#[must_use]
pub const fn is_retryable_status(status: u16) -> bool {
    status == 429 || (status >= 500 && status <= 599)
}

#[cfg(feature = "provider-errors")]
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: "http".to_owned(),
                elapsed: Duration::ZERO,
            }
        } else if err.is_decode() {
            Self::ParseError {
                provider: "http".to_owned(),
                what: "response body",
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::api("http", status.as_u16(), err.to_string())
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            provider: "http".to_owned(),
            what: "json payload",
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_status_classification() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(200));
    }

    #[test]
    fn test_api_error_derives_retry_hint() {
        assert!(ProviderError::api("tracker", 502, "bad gateway").is_retryable());
        assert!(!ProviderError::api("tracker", 400, "bad request").is_retryable());
        assert!(ProviderError::NetworkError("reset".into()).is_retryable());
    }
}
