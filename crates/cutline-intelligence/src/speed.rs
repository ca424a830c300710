// ABOUTME: Derives throughput (points per minute) from cumulative cutoff observations
// ABOUTME: Drops non-finite, non-positive and implausibly large speeds before normalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use cutline_core::constants::speed::{MAX_PLAUSIBLE_SPEED, MS_PER_HOUR, MS_PER_MINUTE};
use cutline_core::models::{ScorePoint, SpeedSample};

/// `(time_ms, Δscore / Δminutes)` between consecutive observations sorted by time.
///
/// Pairs with a zero time delta are skipped; the speed itself is unfiltered.
#[must_use]
pub fn raw_speeds(points: &[ScorePoint]) -> Vec<(i64, f64)> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.time_ms);
    sorted
        .windows(2)
        .filter_map(|pair| {
            let (prev, next) = (pair[0], pair[1]);
            let minutes = (next.time_ms - prev.time_ms) as f64 / MS_PER_MINUTE;
            (minutes > 0.0).then(|| (next.time_ms, (next.score - prev.score) / minutes))
        })
        .collect()
}

/// Whether a raw speed is usable for forecasting
#[must_use]
pub fn is_plausible_speed(speed: f64) -> bool {
    speed.is_finite() && speed > 0.0 && speed < MAX_PLAUSIBLE_SPEED
}

/// Speed samples relative to `start_ts`, normalized by `scale`
#[must_use]
pub fn speed_samples(points: &[ScorePoint], start_ts: i64, scale: f64) -> Vec<SpeedSample> {
    raw_speeds(points)
        .into_iter()
        .filter(|(_, speed)| is_plausible_speed(*speed))
        .map(|(time_ms, raw_speed)| SpeedSample {
            time_ms,
            hours_elapsed: (time_ms - start_ts) as f64 / MS_PER_HOUR,
            raw_speed,
            normalized_speed: raw_speed / scale,
        })
        .collect()
}
