// ABOUTME: Core data models for the Cutline forecaster
// ABOUTME: Re-exports events, score/speed series, profile, shape parameters and forecast outputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! # Data Models
//!
//! Value objects shared by the pipeline. Raw observations and the windows
//! derived from them are separate values; nothing here is mutated after a
//! run has produced it.
//!
//! - `EventMeta`: event identity, nominal window and category
//! - `ScorePoint` / `SpeedSample` / `SkeletonSample`: observed and derived series
//! - `SeasonalityProfile`: hour-of-day x day-type throughput profile
//! - `ShapeParameters`: growth + panic-sprint curve parameters
//! - `HistoricalCandidate`: a loaded analogue event
//! - `ForecastCurve`, `ForecastReport`, `CutoffArtifact`: run outputs

mod candidate;
mod event;
mod forecast;
mod profile;
mod series;
mod shape;

pub use candidate::HistoricalCandidate;
pub use event::{corrected_start, EventMeta};
pub use forecast::{
    ArtifactPoint, BacktestEvaluation, CalibrationSummary, CutoffArtifact, ForecastCurve,
    ForecastReport, RatioBreakdown,
};
pub use profile::{DayType, HourlyStats, SeasonalityProfile};
pub use series::{ScorePoint, SkeletonSample, SpeedSample};
pub use shape::ShapeParameters;
