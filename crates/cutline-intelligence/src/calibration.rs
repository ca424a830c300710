// ABOUTME: Output calibrator rescaling the modulated curve against observed score mass
// ABOUTME: Cutoff-to-now magnitude scale followed by a trailing 24h correction on long observations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! # Output Calibrator
//!
//! The rescaled shape is only as good as the analogues it came from. Two
//! corrections pull the magnitude back toward what the target actually did:
//!
//! 1. **Cutoff-to-now**: score gained since the first local 18:00 compared with
//!    the model mass over the same span, clipped to `[scale_min, scale_max]`.
//! 2. **Trailing 24h** (only past 50 observed hours): score gained in the last
//!    24 hours against the already-scaled model mass, clipped to
//!    `[corr_min, corr_max]`.
//!
//! The applied scale is their product.

use cutline_core::config::ForecastConfig;
use cutline_core::constants::forecast::{
    BACKTEST_MIN_OBSERVED_HOURS, BACKTEST_WINDOW_HOURS, GRID_POINTS,
};
use cutline_core::constants::speed::MS_PER_HOUR;
use cutline_core::errors::ForecastWarning;
use cutline_core::models::{CalibrationSummary, ScorePoint};
use tracing::{debug, warn};

/// First index whose value is `>= x` (`values` sorted ascending)
#[must_use]
pub fn searchsorted_left(values: &[f64], x: f64) -> usize {
    values.partition_point(|&v| v < x)
}

/// First index whose value is `> x` (`values` sorted ascending)
#[must_use]
pub fn searchsorted_right(values: &[f64], x: f64) -> usize {
    values.partition_point(|&v| v <= x)
}

/// Uniform grid over `[0, total_hours]`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    hours: Vec<f64>,
    step_hours: f64,
}

impl TimeGrid {
    /// `points` evenly spaced hours including both ends
    #[must_use]
    pub fn uniform(total_hours: f64, points: usize) -> Self {
        let total = total_hours.max(0.0);
        match points {
            0 => Self {
                hours: Vec::new(),
                step_hours: 0.0,
            },
            1 => Self {
                hours: vec![0.0],
                step_hours: 0.0,
            },
            n => {
                let step_hours = total / (n - 1) as f64;
                let mut hours: Vec<f64> = (0..n).map(|i| i as f64 * step_hours).collect();
                if let Some(last) = hours.last_mut() {
                    *last = total;
                }
                Self { hours, step_hours }
            }
        }
    }

    /// Default forecast grid
    #[must_use]
    pub fn for_event(total_hours: f64) -> Self {
        Self::uniform(total_hours, GRID_POINTS)
    }

    /// Grid hours
    #[must_use]
    pub fn hours(&self) -> &[f64] {
        &self.hours
    }

    /// Spacing in hours
    #[must_use]
    pub const fn step_hours(&self) -> f64 {
        self.step_hours
    }

    /// Spacing in minutes
    #[must_use]
    pub fn step_minutes(&self) -> f64 {
        self.step_hours * 60.0
    }

    /// Number of grid points
    #[must_use]
    pub fn len(&self) -> usize {
        self.hours.len()
    }

    /// Whether the grid has no points
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    fn clamp_index(&self, index: isize) -> usize {
        let last = self.hours.len().saturating_sub(1);
        usize::try_from(index.max(0)).map_or(0, |i| i.min(last))
    }
}

/// Observed cumulative scores relative to the corrected start, sorted by time
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservedProgress {
    hours: Vec<f64>,
    scores: Vec<f64>,
}

impl ObservedProgress {
    /// Sort `points` and express their times as hours since `start_ts`
    #[must_use]
    pub fn new(points: &[ScorePoint], start_ts: i64) -> Self {
        let mut sorted = points.to_vec();
        sorted.sort_by_key(|p| p.time_ms);
        Self {
            hours: sorted
                .iter()
                .map(|p| (p.time_ms - start_ts) as f64 / MS_PER_HOUR)
                .collect(),
            scores: sorted.iter().map(|p| p.score).collect(),
        }
    }

    /// Whether nothing was observed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Hours of the last observation
    #[must_use]
    pub fn last_hours(&self) -> Option<f64> {
        self.hours.last().copied()
    }

    /// Largest observed score (0.0 without observations)
    #[must_use]
    pub fn max_score(&self) -> f64 {
        self.scores.iter().copied().fold(0.0, f64::max)
    }

    /// Score of the last observation strictly before `hours`, else the first observation
    #[must_use]
    pub fn score_before(&self, hours: f64) -> Option<f64> {
        let pos = searchsorted_left(&self.hours, hours);
        if pos > 0 {
            self.scores.get(pos - 1).copied()
        } else {
            self.scores.first().copied()
        }
    }
}

/// Calibration result with any clipping warnings
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationOutcome {
    /// Derivation
    pub summary: CalibrationSummary,
    /// `ScaleClipped` / `CorrectionClipped`
    pub warnings: Vec<ForecastWarning>,
}

/// Applies the two magnitude corrections
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputCalibrator {
    scale_min: f64,
    scale_max: f64,
    corr_min: f64,
    corr_max: f64,
}

impl OutputCalibrator {
    /// Limits from a validated configuration
    #[must_use]
    pub const fn from_config(config: &ForecastConfig) -> Self {
        Self {
            scale_min: config.scale_min,
            scale_max: config.scale_max,
            corr_min: config.corr_min,
            corr_max: config.corr_max,
        }
    }

    /// Compute the applied scale for `modulated` sampled on `grid`.
    ///
    /// `target_scale` converts normalized speed to points per minute.
    #[must_use]
    pub fn calibrate(
        &self,
        grid: &TimeGrid,
        modulated: &[f64],
        target_scale: f64,
        observed: &ObservedProgress,
        cutoff_hours: f64,
        now_hours: f64,
    ) -> CalibrationOutcome {
        let mut warnings = Vec::new();
        let dt_min = grid.step_minutes();
        let max_score = observed.max_score();

        let idx_cutoff = grid.clamp_index(searchsorted_left(grid.hours(), cutoff_hours) as isize);
        let idx_now = grid.clamp_index(searchsorted_right(grid.hours(), now_hours) as isize - 1);

        let mut cumulative = Vec::with_capacity(modulated.len());
        let mut running = 0.0;
        for value in modulated {
            running = (value * target_scale).mul_add(dt_min, running);
            cumulative.push(running);
        }
        let at = |i: usize| cumulative.get(i).copied().unwrap_or(0.0);
        let model_mass = if idx_cutoff == 0 {
            at(idx_now)
        } else {
            at(idx_now) - at(idx_cutoff - 1)
        };
        let observed_mass = observed
            .score_before(cutoff_hours)
            .map_or(0.0, |before| max_score - before);

        let raw_scale = if model_mass > 0.0 && observed_mass >= 0.0 {
            observed_mass / model_mass
        } else {
            1.0
        };
        let scale = raw_scale.clamp(self.scale_min, self.scale_max);
        if (scale - raw_scale).abs() > f64::EPSILON {
            warn!(raw = raw_scale, clipped = scale, "Calibration scale clipped");
            warnings.push(ForecastWarning::ScaleClipped {
                raw: raw_scale,
                clipped: scale,
            });
        }
        debug!(
            cutoff_hours,
            model_mass, observed_mass, raw_scale, scale, "Cutoff-to-now calibration"
        );

        let mut raw_correction = None;
        let mut correction = None;
        if now_hours > BACKTEST_MIN_OBSERVED_HOURS {
            let t0 = (now_hours - BACKTEST_WINDOW_HOURS).max(0.0);
            let idx_t0 = searchsorted_left(grid.hours(), t0);
            if idx_now > idx_t0 {
                let window_sum: f64 = modulated
                    .get(idx_t0..idx_now)
                    .map_or(0.0, |slice| slice.iter().sum());
                let model_24 = window_sum * target_scale * scale * dt_min;
                let observed_24 = observed
                    .score_before(t0)
                    .map_or(0.0, |before| max_score - before);
                if model_24 > 0.0 && observed_24 >= 0.0 {
                    let raw = observed_24 / model_24;
                    let clipped = raw.clamp(self.corr_min, self.corr_max);
                    if (clipped - raw).abs() > f64::EPSILON {
                        warn!(raw, clipped, "Trailing-window correction clipped");
                        warnings.push(ForecastWarning::CorrectionClipped { raw, clipped });
                    }
                    debug!(model_24, observed_24, raw, clipped, "Trailing-window correction");
                    raw_correction = Some(raw);
                    correction = Some(clipped);
                }
            }
        }

        CalibrationOutcome {
            summary: CalibrationSummary {
                cutoff_hours,
                raw_scale,
                scale,
                raw_correction,
                correction,
                applied_scale: scale * correction.unwrap_or(1.0),
            },
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(points: &[(f64, f64)]) -> ObservedProgress {
        let points: Vec<ScorePoint> = points
            .iter()
            .map(|&(h, score)| ScorePoint {
                time_ms: (h * MS_PER_HOUR) as i64,
                score,
            })
            .collect();
        ObservedProgress::new(&points, 0)
    }

    /// Observations on a constant 1 point/minute line
    fn linear_progress(until_hours: u32) -> ObservedProgress {
        let points: Vec<(f64, f64)> = (0..=until_hours)
            .map(|h| (f64::from(h), f64::from(h) * 60.0))
            .collect();
        progress(&points)
    }

    #[test]
    fn test_searchsorted_semantics() {
        let values = [0.0, 1.0, 1.0, 2.0];
        assert_eq!(searchsorted_left(&values, 1.0), 1);
        assert_eq!(searchsorted_right(&values, 1.0), 3);
        assert_eq!(searchsorted_left(&values, 5.0), 4);
        assert_eq!(searchsorted_right(&values, -1.0), 0);
    }

    #[test]
    fn test_uniform_grid_endpoints() {
        let grid = TimeGrid::uniform(99.0, 100);
        assert_eq!(grid.len(), 100);
        assert!((grid.step_hours() - 1.0).abs() < 1e-12);
        assert!((grid.step_minutes() - 60.0).abs() < 1e-9);
        assert!((grid.hours()[99] - 99.0).abs() < f64::EPSILON);
        assert!(TimeGrid::uniform(10.0, 0).is_empty());
    }

    #[test]
    fn test_score_before_uses_strictly_earlier_point() {
        let observed = progress(&[(1.0, 10.0), (2.0, 20.0), (3.0, 30.0)]);
        assert_eq!(observed.score_before(2.0), Some(10.0));
        assert_eq!(observed.score_before(2.5), Some(20.0));
        assert_eq!(observed.score_before(0.5), Some(10.0));
        assert_eq!(ObservedProgress::default().score_before(1.0), None);
    }

    #[test]
    fn test_perfect_model_needs_no_correction() {
        let grid = TimeGrid::uniform(99.0, 100);
        // 1 point/minute with a scale of 100 -> normalized 0.01
        let modulated = vec![0.01; 100];
        let observed = linear_progress(40);
        let outcome = OutputCalibrator::from_config(&ForecastConfig::default()).calibrate(
            &grid, &modulated, 100.0, &observed, 10.0, 40.0,
        );
        // grid [10, 40] holds 31 steps; observed runs from the 9h point to 40h
        assert!((outcome.summary.raw_scale - 1.0).abs() < 1e-9);
        assert!(outcome.summary.correction.is_none());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_scale_clipped_with_warning() {
        let grid = TimeGrid::uniform(99.0, 100);
        let modulated = vec![0.001; 100];
        let observed = linear_progress(30);
        let outcome = OutputCalibrator::from_config(&ForecastConfig::default()).calibrate(
            &grid, &modulated, 100.0, &observed, 5.0, 30.0,
        );
        assert!((outcome.summary.scale - 2.0).abs() < f64::EPSILON);
        assert!(matches!(
            outcome.warnings[0],
            ForecastWarning::ScaleClipped { .. }
        ));
    }

    #[test]
    fn test_trailing_correction_only_after_fifty_hours() {
        let grid = TimeGrid::uniform(99.0, 100);
        let modulated = vec![0.01; 100];
        let observed = linear_progress(60);
        let outcome = OutputCalibrator::from_config(&ForecastConfig::default()).calibrate(
            &grid, &modulated, 100.0, &observed, 10.0, 60.0,
        );
        let summary = outcome.summary;
        let correction = summary.correction.unwrap();
        assert!((0.6..=1.6).contains(&correction));
        assert!((summary.applied_scale - summary.scale * correction).abs() < 1e-12);
    }

    /// 1 point/minute until 36h, then `late_per_minute` through 60h
    fn progress_changing_pace_at_36h(late_per_minute: f64) -> ObservedProgress {
        let points: Vec<(f64, f64)> = (0..=60u32)
            .map(|h| {
                let hours = f64::from(h);
                let score = if h <= 36 {
                    hours * 60.0
                } else {
                    (hours - 36.0).mul_add(late_per_minute * 60.0, 36.0 * 60.0)
                };
                (hours, score)
            })
            .collect();
        progress(&points)
    }

    #[test]
    fn test_fast_trailing_window_clipped_to_corr_max() {
        let grid = TimeGrid::uniform(99.0, 100);
        let modulated = vec![0.01; 100];
        let observed = progress_changing_pace_at_36h(10.0);
        let outcome = OutputCalibrator::from_config(&ForecastConfig::default()).calibrate(
            &grid, &modulated, 100.0, &observed, 10.0, 60.0,
        );
        let summary = outcome.summary;
        assert!((summary.scale - 2.0).abs() < f64::EPSILON);
        let raw = summary.raw_correction.unwrap();
        assert!((raw - 5.020_833).abs() < 1e-3);
        assert_eq!(summary.correction, Some(1.6));
        assert!((summary.applied_scale - 3.2).abs() < 1e-12);
        assert!(matches!(
            outcome.warnings[0],
            ForecastWarning::ScaleClipped { .. }
        ));
        assert!(outcome.warnings.iter().any(|w| matches!(
            w,
            ForecastWarning::CorrectionClipped { raw, clipped }
                if (raw - 5.020_833).abs() < 1e-3 && (clipped - 1.6).abs() < f64::EPSILON
        )));
    }

    #[test]
    fn test_slow_trailing_window_clipped_to_corr_min() {
        let grid = TimeGrid::uniform(99.0, 100);
        let modulated = vec![0.01; 100];
        let observed = progress_changing_pace_at_36h(0.1);
        let outcome = OutputCalibrator::from_config(&ForecastConfig::default()).calibrate(
            &grid, &modulated, 100.0, &observed, 10.0, 60.0,
        );
        let summary = outcome.summary;
        // observed 2304 - 540 against 51 model hours at 60 points each
        assert!((summary.scale - 1764.0 / 3060.0).abs() < 1e-9);
        let raw = summary.raw_correction.unwrap();
        assert!(raw < 0.6);
        assert_eq!(summary.correction, Some(0.6));
        assert!((summary.applied_scale - summary.scale * 0.6).abs() < 1e-12);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            outcome.warnings[0],
            ForecastWarning::CorrectionClipped { clipped, .. } if (clipped - 0.6).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn test_zero_model_mass_keeps_unit_scale() {
        let grid = TimeGrid::uniform(99.0, 100);
        let modulated = vec![0.0; 100];
        let outcome = OutputCalibrator::from_config(&ForecastConfig::default()).calibrate(
            &grid,
            &modulated,
            100.0,
            &linear_progress(20),
            5.0,
            20.0,
        );
        assert!((outcome.summary.applied_scale - 1.0).abs() < f64::EPSILON);
    }
}
