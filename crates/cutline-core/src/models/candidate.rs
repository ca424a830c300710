// ABOUTME: Historical analogue event loaded for shape fitting and intensity comparison
// ABOUTME: Fit and window-intensity results are attached by producing a new value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use serde::{Deserialize, Serialize};

use super::{ShapeParameters, SpeedSample};

/// A past event comparable to the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalCandidate {
    /// Event id
    pub event_id: u32,
    /// Peak-speed scale used for normalization (points per minute)
    pub scale: f64,
    /// Speed samples relative to the candidate's nominal start
    pub series: Vec<SpeedSample>,
    /// Event length in hours
    pub total_hours: f64,
    /// Nominal start (epoch milliseconds)
    pub start_ts: i64,
    /// Fitted shape parameters, when the fit converged
    #[serde(default)]
    pub fitted: Option<ShapeParameters>,
    /// Clipped mean skeleton over the comparison window
    #[serde(default)]
    pub window_intensity: Option<f64>,
    /// Plain mean normalized speed over the comparison window
    #[serde(default)]
    pub raw_window_mean: Option<f64>,
}

impl HistoricalCandidate {
    /// Freshly loaded candidate without analysis results
    #[must_use]
    pub const fn new(
        event_id: u32,
        scale: f64,
        series: Vec<SpeedSample>,
        total_hours: f64,
        start_ts: i64,
    ) -> Self {
        Self {
            event_id,
            scale,
            series,
            total_hours,
            start_ts,
            fitted: None,
            window_intensity: None,
            raw_window_mean: None,
        }
    }

    /// Copy carrying analysis results
    #[must_use]
    pub fn analyzed(
        &self,
        fitted: Option<ShapeParameters>,
        window_intensity: Option<f64>,
        raw_window_mean: Option<f64>,
    ) -> Self {
        Self {
            fitted,
            window_intensity,
            raw_window_mean,
            ..self.clone()
        }
    }

    /// Whether the candidate contributes to the shape average and skeleton ratio
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.fitted.is_some() && self.window_intensity.is_some()
    }
}
