// ABOUTME: Main library entry point for the Cutline tier-cutoff forecaster
// ABOUTME: Wires logging, runtime configuration, data loading, storage and the forecast runner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

#![deny(unsafe_code)]

//! # Cutline
//!
//! Forecasts the final score of a tier cutoff (for example the 1000th place)
//! of a running ranking event from its partial progress and the trajectories
//! of comparable past events.
//!
//! ## Crates
//!
//! - **cutline-core**: models, errors, forecast configuration, constants
//! - **cutline-intelligence**: the pure forecasting pipeline
//! - **cutline-providers**: HTTP event source and peak-speed estimation
//! - **cutline** (this crate): configuration, loading, storage and the CLI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cutline::config::{ForecastConfig, RuntimeConfig};
//! use cutline::pipeline::{build_runner, ForecastRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = RuntimeConfig::from_env()?;
//!     let runner = build_runner(&runtime, ForecastConfig::from_environment()?).await?;
//!     let outcome = runner
//!         .run(&ForecastRequest {
//!             event_id: Some(231),
//!             tier: runtime.tier,
//!             freeze_hours: None,
//!             tz_offset_hours: runtime.tz_offset_hours,
//!         })
//!         .await?;
//!     println!("predicted final: {:.0}", outcome.report.predicted_final);
//!     Ok(())
//! }
//! ```

/// Candidate discovery and loading
pub mod candidates;

/// Runtime and forecast configuration
pub mod config;

/// Structured logging setup
pub mod logging;

/// Async forecast runner
pub mod pipeline;

/// Seasonality profile construction from past events
pub mod profile;

/// Profile, calendar and artifact files
pub mod storage;

/// Target loading and freeze split
pub mod target;

pub use cutline_core::errors::{ForecastError, ForecastResult, ForecastWarning};
pub use pipeline::{ForecastOutcome, ForecastRequest, ForecastRunner};
