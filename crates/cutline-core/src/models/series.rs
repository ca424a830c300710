// ABOUTME: Observed score points and derived speed/skeleton samples
// ABOUTME: Plain value types produced once per run and read-only afterwards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use serde::{Deserialize, Serialize};

/// One observed cumulative cutoff score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    /// Observation time (epoch milliseconds)
    pub time_ms: i64,
    /// Cumulative event points at the tier boundary
    pub score: f64,
}

/// Throughput between two consecutive score observations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSample {
    /// Time of the later observation (epoch milliseconds)
    pub time_ms: i64,
    /// Hours since the event start
    pub hours_elapsed: f64,
    /// Points per minute
    pub raw_speed: f64,
    /// `raw_speed / scale`
    pub normalized_speed: f64,
}

/// A speed sample with its seasonal factor divided out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkeletonSample {
    /// Time (epoch milliseconds)
    pub time_ms: i64,
    /// Hours since the event start
    pub hours_elapsed: f64,
    /// Normalized speed before deseasonalization
    pub normalized_speed: f64,
    /// Deseasonalized normalized speed
    pub skeleton: f64,
}
