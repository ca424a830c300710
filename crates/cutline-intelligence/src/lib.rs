// ABOUTME: Forecasting algorithms for the Cutline tier-cutoff forecaster
// ABOUTME: Seasonality, shape fitting, intensity ratio, calibration, smoothing and integration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

#![deny(unsafe_code)]

//! # Cutline Intelligence
//!
//! Pure, single-threaded forecasting algorithms. Nothing in this crate performs
//! I/O; the [`engine::ForecastEngine`] takes loaded series and returns a
//! [`cutline_core::models::ForecastReport`].
//!
//! ## Pipeline
//!
//! deseasonalize → fit shape per candidate → intensity ratio → rescale →
//! re-modulate → calibrate → smooth → integrate

/// Workday calendars (holidays and make-up workdays)
pub mod calendar;

/// Local-time helpers and timezone detection
pub mod clock;

/// Hour-of-day x day-type seasonal factors
pub mod seasonality;

/// Throughput derived from cumulative observations
pub mod speed;

/// Bounded Levenberg-Marquardt least squares
pub mod optimizer;

/// Growth + panic-sprint curve model
pub mod shape;

/// Window intensities and the blended ratio
pub mod intensity;

/// Forecast grid and magnitude calibration
pub mod calibration;

/// Saturating ceiling on normalized speed
pub mod smoothing;

/// Cumulative score integration
pub mod integration;

/// Seasonality profile aggregation from past events
pub mod profile_builder;

/// End-to-end forecast composition
pub mod engine;

pub use engine::{ForecastEngine, ForecastInput};
