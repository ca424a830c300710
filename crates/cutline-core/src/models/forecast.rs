// ABOUTME: Forecast outputs: curve, diagnostics report, backtest evaluation and JSON artifact
// ABOUTME: Produced per run and never shared as mutable state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use serde::{Deserialize, Serialize};

use super::{ScorePoint, ShapeParameters};
use crate::errors::ForecastWarning;

/// Curves computed on the uniform forecast grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCurve {
    /// Hours since the corrected start
    pub time_grid: Vec<f64>,
    /// Rescaled shape (deseasonalized normalized speed)
    pub skeleton: Vec<f64>,
    /// Skeleton with seasonality and panic blend re-applied
    pub modulated: Vec<f64>,
    /// Calibrated and ceiling-smoothed normalized speed
    pub smoothed: Vec<f64>,
    /// Observed points followed by predicted points, sorted by time
    pub cumulative_score: Vec<ScorePoint>,
}

impl ForecastCurve {
    /// Score of the last point of the curve
    #[must_use]
    pub fn final_score(&self) -> Option<f64> {
        self.cumulative_score.last().map(|p| p.score)
    }
}

/// How the intensity ratio was obtained
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioBreakdown {
    /// Target skeleton intensity over mean candidate intensity
    pub skeleton_ratio: Option<f64>,
    /// Target raw window mean over mean candidate raw window mean
    pub norm_ratio: Option<f64>,
    /// Weight of the norm ratio in the blend
    pub w_norm: f64,
    /// Ratio before clipping
    pub raw: f64,
    /// Ratio applied to the shape parameters
    pub ratio: f64,
}

impl RatioBreakdown {
    /// Ratio used when nothing can be compared
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            skeleton_ratio: None,
            norm_ratio: None,
            w_norm: 0.0,
            raw: 1.0,
            ratio: 1.0,
        }
    }
}

/// Magnitude corrections applied to the modulated curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSummary {
    /// Hours from start to the first local 18:00
    pub cutoff_hours: f64,
    /// Cutoff-to-now scale before clipping
    pub raw_scale: f64,
    /// Clipped cutoff-to-now scale
    pub scale: f64,
    /// Trailing-window correction before clipping, when computed
    pub raw_correction: Option<f64>,
    /// Clipped trailing-window correction, when computed
    pub correction: Option<f64>,
    /// Final multiplier on the modulated curve
    pub applied_scale: f64,
}

/// Forecast quality against withheld observations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestEvaluation {
    /// Forecast final score
    pub predicted_final: f64,
    /// Last withheld observed score
    pub actual_final: f64,
    /// `(predicted - actual) / actual`
    pub relative_error: f64,
}

impl BacktestEvaluation {
    /// Compare a prediction with the real final score; `None` if `actual` is not positive
    #[must_use]
    pub fn evaluate(predicted_final: f64, actual_final: f64) -> Option<Self> {
        (actual_final > 0.0).then(|| Self {
            predicted_final,
            actual_final,
            relative_error: (predicted_final - actual_final) / actual_final,
        })
    }
}

/// Full result of one forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    /// Target event id
    pub event_id: u32,
    /// Tier forecast
    pub tier: u32,
    /// Start after maintenance-delay correction (epoch milliseconds)
    pub corrected_start_ts: i64,
    /// Event length (hours from the corrected start)
    pub total_hours: f64,
    /// Hours observed
    pub now_hours: f64,
    /// Peak-speed scale of the target
    pub target_scale: f64,
    /// Timezone offset used for local-time rules
    pub tz_offset_hours: i32,
    /// Candidates that contributed, newest first
    pub candidate_ids: Vec<u32>,
    /// Mean of the fitted candidate parameters
    pub averaged_params: ShapeParameters,
    /// Parameters after ratio rescaling
    pub rescaled_params: ShapeParameters,
    /// Ratio derivation
    pub ratio: RatioBreakdown,
    /// Calibration derivation
    pub calibration: CalibrationSummary,
    /// Non-fatal conditions
    pub warnings: Vec<ForecastWarning>,
    /// Forecast final cumulative score
    pub predicted_final: f64,
    /// Curves
    pub curve: ForecastCurve,
    /// Present in freeze mode when withheld data exists
    pub backtest: Option<BacktestEvaluation>,
}

/// One point of the output artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPoint {
    /// Epoch milliseconds
    pub time: i64,
    /// Cumulative score
    pub ep: i64,
}

/// JSON artifact `{"result": true, "cutoffs": [{"time", "ep"}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutoffArtifact {
    /// Always `true` for a produced forecast
    pub result: bool,
    /// Observed then predicted points, sorted by time
    pub cutoffs: Vec<ArtifactPoint>,
}

impl CutoffArtifact {
    /// Build the artifact from a cumulative curve
    #[must_use]
    pub fn from_curve(curve: &ForecastCurve) -> Self {
        let mut cutoffs: Vec<ArtifactPoint> = curve
            .cumulative_score
            .iter()
            .filter(|p| p.score.is_finite())
            .map(|p| ArtifactPoint {
                time: p.time_ms,
                ep: p.score as i64,
            })
            .collect();
        cutoffs.sort_by_key(|p| p.time);
        Self {
            result: true,
            cutoffs,
        }
    }
}
