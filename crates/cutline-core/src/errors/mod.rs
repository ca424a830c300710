// ABOUTME: Error taxonomy for the forecasting pipeline
// ABOUTME: Fatal ForecastError, non-fatal ForecastWarning, and re-exported provider/config errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! # Errors
//!
//! - [`ForecastError`]: aborts the current run (missing target data, bad
//!   configuration, no identifiable event)
//! - [`ForecastWarning`]: non-fatal conditions recorded in the report
//! - [`ProviderError`]: remote-source failures, converted into
//!   `DataUnavailable` at the target boundary

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::config::ConfigError;

/// Remote data-source errors
pub mod provider;

pub use provider::ProviderError;

/// Result alias for pipeline operations
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Fatal pipeline error
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A required piece of target data is missing or could not be fetched
    #[error("{what} unavailable for event {event_id}")]
    DataUnavailable {
        /// What was missing (e.g. "event metadata", "score series")
        what: &'static str,
        /// Event the data belongs to
        event_id: u32,
    },

    /// Forecast configuration rejected
    #[error("Invalid forecast configuration: {0}")]
    ConfigValidation(#[from] ConfigError),

    /// Current event could not be determined from the recent-events feed
    #[error("Could not identify the current event")]
    EventNotIdentified,

    /// Remote source failure that escaped the absent-data conversion
    #[error("Data source error: {0}")]
    Provider(#[from] ProviderError),

    /// Local file-system failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ForecastError {
    /// Shorthand for [`ForecastError::DataUnavailable`]
    #[must_use]
    pub const fn unavailable(what: &'static str, event_id: u32) -> Self {
        Self::DataUnavailable { what, event_id }
    }
}

/// Non-fatal condition recorded on a forecast report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastWarning {
    /// Shape fit for a candidate did not converge; the initial guess was used
    FitFailure {
        /// Candidate whose fit failed
        event_id: u32,
    },
    /// No candidate supplied usable data; ratio fell back to 1.0
    NoHistoricalMatches,
    /// Intensity ratio was outside `[ratio_min, ratio_max]`
    RatioClipped {
        /// Ratio before clipping
        raw: f64,
        /// Ratio used
        clipped: f64,
    },
    /// Cutoff-to-now calibration scale was outside `[scale_min, scale_max]`
    ScaleClipped {
        /// Scale before clipping
        raw: f64,
        /// Scale used
        clipped: f64,
    },
    /// Backtest correction was outside `[corr_min, corr_max]`
    CorrectionClipped {
        /// Correction before clipping
        raw: f64,
        /// Correction used
        clipped: f64,
    },
}

impl fmt::Display for ForecastWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FitFailure { event_id } => {
                write!(f, "shape fit failed for event {event_id}, using initial guess")
            }
            Self::NoHistoricalMatches => write!(f, "no historical matches, ratio set to 1.0"),
            Self::RatioClipped { raw, clipped } => {
                write!(f, "ratio {raw:.4} clipped to {clipped:.4}")
            }
            Self::ScaleClipped { raw, clipped } => {
                write!(f, "calibration scale {raw:.4} clipped to {clipped:.4}")
            }
            Self::CorrectionClipped { raw, clipped } => {
                write!(f, "backtest correction {raw:.4} clipped to {clipped:.4}")
            }
        }
    }
}
