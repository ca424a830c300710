// ABOUTME: Configuration module for the forecaster application
// ABOUTME: Runtime settings from the environment plus re-exports of the forecast model configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! Configuration
//!
//! - **Environment**: API endpoint, HTTP policy, concurrency and file locations
//! - **Forecast**: the model knobs, defined in `cutline-core`

/// Environment-based runtime configuration
pub mod environment;

pub use cutline_core::config::{ConfigError, ForecastConfig, OverridePolicy, CONFIG_KEYS};
pub use environment::{HttpSettings, RuntimeConfig};
