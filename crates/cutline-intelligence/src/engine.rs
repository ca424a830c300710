// ABOUTME: Pure forecast engine composing seasonality, shape fitting, ratio, calibration, smoothing, integration
// ABOUTME: Identical inputs and configuration always produce an identical ForecastReport
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! # Forecast Engine
//!
//! Everything after data loading happens here, single-threaded:
//!
//! 1. Correct the target start for maintenance delays and pick the local offset
//! 2. Deseasonalize target and candidate speeds
//! 3. Fit the shape model per candidate (evening-onward samples only)
//! 4. Compare window intensities and derive the clipped ratio
//! 5. Average, rescale and re-modulate the shape on the forecast grid
//! 6. Calibrate, smooth and integrate into a cumulative score curve

use std::sync::Arc;

use cutline_core::config::ForecastConfig;
use cutline_core::constants::shape::MIN_FIT_SAMPLES;
use cutline_core::errors::{ForecastError, ForecastResult, ForecastWarning};
use cutline_core::models::{
    BacktestEvaluation, EventMeta, ForecastCurve, ForecastReport, HistoricalCandidate, ScorePoint,
    SeasonalityProfile,
};
use tracing::{debug, info, warn};

use crate::calendar::WorkdayCalendar;
use crate::calibration::{ObservedProgress, OutputCalibrator, TimeGrid};
use crate::clock::{detect_tz_offset, first_evening_cutoff, hours_between, same_day_evening};
use crate::integration::{assemble_curve, integrate_future};
use crate::intensity::{
    intensity_ratio, raw_window_mean, rescale_parameters, window_intensity, ComparisonWindow,
    TargetWindow,
};
use crate::seasonality::SeasonalityModel;
use crate::shape::{shape_curve, ShapeFitter};
use crate::smoothing::CeilingSmoother;
use crate::speed::speed_samples;

/// Everything the engine needs for one run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastInput {
    /// Tier being forecast
    pub tier: u32,
    /// Target metadata with the nominal start
    pub target: EventMeta,
    /// Observations visible to the forecast
    pub observed: Vec<ScorePoint>,
    /// Observations withheld in freeze mode, used only for evaluation
    pub withheld: Vec<ScorePoint>,
    /// Peak-speed scale of the target (points per minute)
    pub target_scale: f64,
    /// Loaded analogues, newest first
    pub candidates: Vec<HistoricalCandidate>,
    /// Local offset override; detected from the start when absent
    pub tz_offset_hours: Option<i32>,
}

/// Stateless forecaster bound to one configuration and profile
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: ForecastConfig,
    seasonality: SeasonalityModel,
    fitter: ShapeFitter,
}

impl ForecastEngine {
    /// Engine for a validated configuration
    #[must_use]
    pub fn new(
        config: ForecastConfig,
        profile: &SeasonalityProfile,
        calendar: Arc<dyn WorkdayCalendar>,
    ) -> Self {
        let seasonality = SeasonalityModel::build(profile, config.weekend_multiplier, calendar)
            .with_panic(config.panic_scaler, config.panic_ease_power);
        Self {
            config,
            seasonality,
            fitter: ShapeFitter::default(),
        }
    }

    /// Replace the shape fitter
    #[must_use]
    pub const fn with_fitter(mut self, fitter: ShapeFitter) -> Self {
        self.fitter = fitter;
        self
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Seasonality model used by this engine
    #[must_use]
    pub const fn seasonality(&self) -> &SeasonalityModel {
        &self.seasonality
    }

    /// Fit and window statistics for one candidate
    #[must_use]
    pub fn analyze_candidate(
        &self,
        candidate: &HistoricalCandidate,
        window: ComparisonWindow,
        seasonality: &SeasonalityModel,
    ) -> (HistoricalCandidate, Option<ForecastWarning>) {
        let skeleton = seasonality.remove_seasonality(&candidate.series);

        let fit_from = same_day_evening(candidate.start_ts, seasonality.tz_offset_hours())
            .unwrap_or(candidate.start_ts);
        let (t, y): (Vec<f64>, Vec<f64>) = skeleton
            .iter()
            .filter(|s| s.time_ms >= fit_from && s.skeleton.is_finite())
            .map(|s| (s.hours_elapsed, s.skeleton))
            .unzip();

        let mut warning = None;
        let fitted = if t.len() >= MIN_FIT_SAMPLES {
            let fit = self.fitter.fit(&t, &y, candidate.total_hours);
            if let Some(failure) = &fit.failure {
                warn!(
                    event_id = candidate.event_id,
                    error = %failure,
                    "Shape fit failed, using initial guess"
                );
                warning = Some(ForecastWarning::FitFailure {
                    event_id: candidate.event_id,
                });
            }
            Some(fit.params)
        } else {
            debug!(
                event_id = candidate.event_id,
                samples = t.len(),
                "Too few evening samples to fit"
            );
            None
        };

        let analyzed = candidate.analyzed(
            fitted,
            window_intensity(&skeleton, window),
            raw_window_mean(&skeleton, window),
        );
        (analyzed, warning)
    }

    /// Run the full forecast.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::DataUnavailable`] when the target has no
    /// observations or no usable peak-speed scale.
    pub fn run(&self, input: &ForecastInput) -> ForecastResult<ForecastReport> {
        let event_id = input.target.event_id;
        if input.observed.is_empty() {
            return Err(ForecastError::unavailable("score series", event_id));
        }
        if !input.target_scale.is_finite() || input.target_scale <= 0.0 {
            return Err(ForecastError::unavailable("peak speed scale", event_id));
        }

        let mut observed = input.observed.clone();
        observed.sort_by_key(|p| p.time_ms);
        let target = input.target.with_corrected_start(&observed);
        if target.start_ts != input.target.start_ts {
            info!(
                event_id,
                nominal = input.target.start_ts,
                corrected = target.start_ts,
                "Start corrected for maintenance delay"
            );
        }
        let start_ts = target.start_ts;
        let total_hours = target.total_hours();
        let tz_offset_hours = input
            .tz_offset_hours
            .unwrap_or_else(|| detect_tz_offset(start_ts));
        let seasonality = self.seasonality.clone().with_tz_offset(tz_offset_hours);

        let progress = ObservedProgress::new(&observed, start_ts);
        let now_hours = progress.last_hours().unwrap_or(0.0).max(0.0);
        let window = ComparisonWindow::new(self.config.t_start_cmp, now_hours, self.config.t_end_cap);

        let target_skeleton = seasonality
            .remove_seasonality(&speed_samples(&observed, start_ts, input.target_scale));
        let target_window = TargetWindow {
            intensity: window_intensity(&target_skeleton, window),
            raw_mean: raw_window_mean(&target_skeleton, window),
        };

        let mut warnings = Vec::new();
        let mut candidates = Vec::with_capacity(input.candidates.len());
        for candidate in &input.candidates {
            let (analyzed, warning) = self.analyze_candidate(candidate, window, &seasonality);
            warnings.extend(warning);
            candidates.push(analyzed);
        }

        let ratio = intensity_ratio(target_window, &candidates, now_hours, &self.config);
        warnings.extend(ratio.warnings);
        let (averaged_params, rescaled_params) =
            rescale_parameters(&candidates, ratio.breakdown.ratio);

        let grid = TimeGrid::for_event(total_hours);
        let skeleton = shape_curve(grid.hours(), &rescaled_params, total_hours);
        let modulated = seasonality.apply_seasonality(
            grid.hours(),
            &skeleton,
            start_ts,
            total_hours,
            rescaled_params.t_panic,
        );

        let cutoff_hours = first_evening_cutoff(start_ts, tz_offset_hours)
            .map_or(0.0, |cutoff| hours_between(start_ts, cutoff));
        let calibration = OutputCalibrator::from_config(&self.config).calibrate(
            &grid,
            &modulated,
            input.target_scale,
            &progress,
            cutoff_hours,
            now_hours,
        );
        warnings.extend(calibration.warnings);
        let applied = calibration.summary.applied_scale;

        let scaled: Vec<f64> = modulated.iter().map(|v| v * applied).collect();
        let smoothed = CeilingSmoother::from_config(&self.config).apply_all(&scaled);

        let max_score = progress.max_score();
        let predicted = integrate_future(
            &grid,
            &smoothed,
            input.target_scale,
            start_ts,
            now_hours,
            max_score,
        );
        let cumulative_score = assemble_curve(&observed, predicted);
        let predicted_final = cumulative_score.last().map_or(max_score, |p| p.score);

        let backtest = input
            .withheld
            .iter()
            .map(|p| p.score)
            .reduce(f64::max)
            .and_then(|actual| BacktestEvaluation::evaluate(predicted_final, actual));
        if let Some(evaluation) = &backtest {
            info!(
                event_id,
                predicted = evaluation.predicted_final,
                actual = evaluation.actual_final,
                relative_error = evaluation.relative_error,
                "Backtest evaluation"
            );
        }

        info!(
            event_id,
            tier = input.tier,
            candidates = candidates.len(),
            ratio = ratio.breakdown.ratio,
            applied_scale = applied,
            predicted_final,
            "Forecast complete"
        );

        Ok(ForecastReport {
            event_id,
            tier: input.tier,
            corrected_start_ts: start_ts,
            total_hours,
            now_hours,
            target_scale: input.target_scale,
            tz_offset_hours,
            candidate_ids: candidates.iter().map(|c| c.event_id).collect(),
            averaged_params,
            rescaled_params,
            ratio: ratio.breakdown,
            calibration: calibration.summary,
            warnings,
            predicted_final,
            curve: ForecastCurve {
                time_grid: grid.hours().to_vec(),
                skeleton,
                modulated,
                smoothed,
                cumulative_score,
            },
            backtest,
        })
    }
}
