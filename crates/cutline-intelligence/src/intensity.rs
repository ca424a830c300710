// ABOUTME: Intensity ratio engine comparing target and analogue events over a shared time window
// ABOUTME: Blends skeleton and raw ratios by observed progress, clips the result, rescales shape parameters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! # Intensity Ratio Engine
//!
//! The target and every candidate are compared over the same window of
//! event-relative hours `[t_start_cmp, min(now, t_end_cap)]`.
//!
//! - `skeleton_ratio`: target clipped skeleton mean / mean of candidate clipped skeleton means
//!   (only candidates with both a fit and an intensity)
//! - `norm_ratio`: target raw normalized mean / mean of candidate raw normalized means
//!   (every candidate with window data)
//!
//! With both available they are blended with `w_norm = clip(0.2 + 0.6·cos(sπ − π), 0, 1)`,
//! `s = clip(now / t_end_cap, 0, 1)`: early in the event the skeleton ratio
//! dominates, later the observed ratio takes over. The blend weights are an
//! empirical heuristic, not a derived quantity.

use std::f64::consts::PI;

use cutline_core::config::ForecastConfig;
use cutline_core::constants::forecast::{SIGMA_CLIP, SIGMA_CLIP_MIN_STD};
use cutline_core::errors::ForecastWarning;
use cutline_core::models::{HistoricalCandidate, RatioBreakdown, ShapeParameters, SkeletonSample};
use tracing::{info, warn};

/// Event-relative comparison window (hours, inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonWindow {
    /// Window start
    pub start_hours: f64,
    /// Window end
    pub end_hours: f64,
}

impl ComparisonWindow {
    /// `[t_start_cmp, min(end_source, t_end_cap)]`
    #[must_use]
    pub fn new(t_start_cmp: f64, end_source_hours: f64, t_end_cap: f64) -> Self {
        Self {
            start_hours: t_start_cmp,
            end_hours: end_source_hours.min(t_end_cap),
        }
    }

    /// Whether `hours` lies in the window
    #[must_use]
    pub fn contains(&self, hours: f64) -> bool {
        hours >= self.start_hours && hours <= self.end_hours
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n − 1); zero for fewer than two values
fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Sigma-clipped mean skeleton inside the window; `None` without samples
#[must_use]
pub fn window_intensity(samples: &[SkeletonSample], window: ComparisonWindow) -> Option<f64> {
    let values: Vec<f64> = samples
        .iter()
        .filter(|s| window.contains(s.hours_elapsed) && s.skeleton.is_finite())
        .map(|s| s.skeleton)
        .collect();
    let center = mean(&values)?;
    let std = sample_std(&values, center);
    if std > SIGMA_CLIP_MIN_STD {
        let kept: Vec<f64> = values
            .iter()
            .copied()
            .filter(|v| (v - center).abs() < SIGMA_CLIP * std)
            .collect();
        if let Some(clipped) = mean(&kept) {
            return Some(clipped);
        }
    }
    Some(center)
}

/// Plain mean normalized speed inside the window; `None` without samples
#[must_use]
pub fn raw_window_mean(samples: &[SkeletonSample], window: ComparisonWindow) -> Option<f64> {
    let values: Vec<f64> = samples
        .iter()
        .filter(|s| window.contains(s.hours_elapsed) && s.normalized_speed.is_finite())
        .map(|s| s.normalized_speed)
        .collect();
    mean(&values)
}

/// Weight of the norm ratio after `now_hours` of observation
#[must_use]
pub fn norm_weight(now_hours: f64, t_end_cap: f64) -> f64 {
    let s = if t_end_cap > 0.0 {
        (now_hours / t_end_cap).clamp(0.0, 1.0)
    } else {
        0.0
    };
    0.6f64.mul_add((s * PI - PI).cos(), 0.2).clamp(0.0, 1.0)
}

/// Target-side window statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetWindow {
    /// Clipped skeleton mean
    pub intensity: Option<f64>,
    /// Raw normalized mean
    pub raw_mean: Option<f64>,
}

/// Ratio with its derivation and any warnings raised
#[derive(Debug, Clone, PartialEq)]
pub struct RatioOutcome {
    /// Derivation
    pub breakdown: RatioBreakdown,
    /// `NoHistoricalMatches` / `RatioClipped`
    pub warnings: Vec<ForecastWarning>,
}

fn positive_ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (num, den) = (numerator?, denominator?);
    let ratio = num / den;
    (den > 0.0 && ratio.is_finite()).then_some(ratio)
}

/// Blend, clip and report the intensity ratio.
///
/// `candidates` must already carry their analysis results.
#[must_use]
pub fn intensity_ratio(
    target: TargetWindow,
    candidates: &[HistoricalCandidate],
    now_hours: f64,
    config: &ForecastConfig,
) -> RatioOutcome {
    let mut warnings = Vec::new();

    let usable: Vec<f64> = candidates
        .iter()
        .filter(|c| c.is_usable())
        .filter_map(|c| c.window_intensity)
        .collect();
    let raw_means: Vec<f64> = candidates.iter().filter_map(|c| c.raw_window_mean).collect();

    let skeleton_ratio = positive_ratio(target.intensity, mean(&usable));
    let norm_ratio = positive_ratio(target.raw_mean, mean(&raw_means));
    let w_norm = norm_weight(now_hours, config.t_end_cap);

    let chosen = match (skeleton_ratio, norm_ratio) {
        (Some(skeleton), Some(norm)) => skeleton.mul_add(1.0 - w_norm, norm * w_norm),
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => {
            warn!(
                candidates = candidates.len(),
                "No historical matches in the comparison window, ratio reset to 1.0"
            );
            warnings.push(ForecastWarning::NoHistoricalMatches);
            1.0
        }
    };

    let ratio = chosen.clamp(config.ratio_min, config.ratio_max);
    if (ratio - chosen).abs() > f64::EPSILON {
        warn!(raw = chosen, clipped = ratio, "Intensity ratio clipped");
        warnings.push(ForecastWarning::RatioClipped {
            raw: chosen,
            clipped: ratio,
        });
    }

    info!(
        skeleton_ratio = ?skeleton_ratio,
        norm_ratio = ?norm_ratio,
        w_norm,
        ratio,
        "Intensity ratio computed"
    );

    RatioOutcome {
        breakdown: RatioBreakdown {
            skeleton_ratio,
            norm_ratio,
            w_norm,
            raw: chosen,
            ratio,
        },
        warnings,
    }
}

/// `(averaged, rescaled)` shape parameters.
///
/// Averages usable candidates; the initial guess stands in when none is usable.
#[must_use]
pub fn rescale_parameters(
    candidates: &[HistoricalCandidate],
    ratio: f64,
) -> (ShapeParameters, ShapeParameters) {
    let averaged = ShapeParameters::mean(
        candidates
            .iter()
            .filter(|c| c.is_usable())
            .filter_map(|c| c.fitted.as_ref()),
    )
    .unwrap_or(ShapeParameters::INITIAL_GUESS);
    (averaged, averaged.rescaled(ratio))
}
