// ABOUTME: Core types and constants for the Cutline tier-cutoff forecaster
// ABOUTME: Foundation crate with error handling, domain models, forecast configuration, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

#![deny(unsafe_code)]

//! # Cutline Core
//!
//! Foundation crate providing shared types for the Cutline forecaster. The
//! algorithms live in `cutline-intelligence`, the remote data adapters in
//! `cutline-providers`; both depend only on the types defined here.
//!
//! ## Modules
//!
//! - **errors**: `ForecastError`, `ProviderError`, `ConfigError` and non-fatal `ForecastWarning`s
//! - **models**: events, score/speed series, seasonality profile, shape parameters, forecast output
//! - **config**: strongly typed `ForecastConfig` with validated overrides
//! - **constants**: API endpoints, model constants and defaults organized by domain

/// Unified error handling for the forecasting pipeline and its collaborators
pub mod errors;

/// Core data models (events, series, profile, curve parameters, forecast output)
pub mod models;

/// Forecast tuning configuration with validated overrides
pub mod config;

/// Constants organized by domain
pub mod constants;
