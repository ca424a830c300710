// ABOUTME: Peak-speed scale estimation from per-player top-ranking point histories
// ABOUTME: Mean of the three fastest plausible per-player speeds in points per minute
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use std::collections::BTreeMap;

use cutline_core::constants::speed::{MAX_PLAUSIBLE_SPEED, MS_PER_MINUTE, PEAK_SPEED_TOP_N};

use crate::source::PeakSpeedWindow;
use crate::wire::TopPoint;

/// Peak-speed scale of an event; `None` when no plausible speed exists
#[must_use]
pub fn estimate_peak_speed(points: &[TopPoint], window: PeakSpeedWindow) -> Option<f64> {
    let considered = window
        .max_points
        .map_or(points, |limit| &points[..limit.min(points.len())]);

    let mut by_player: BTreeMap<u64, Vec<(i64, f64)>> = BTreeMap::new();
    for point in considered {
        if window.until_ms.is_some_and(|until| point.time > until) {
            continue;
        }
        by_player
            .entry(point.uid)
            .or_default()
            .push((point.time, point.value));
    }

    let mut speeds: Vec<f64> = Vec::new();
    for history in by_player.values_mut() {
        history.sort_by_key(|(time, _)| *time);
        speeds.extend(history.windows(2).filter_map(|pair| {
            let minutes = (pair[1].0 - pair[0].0) as f64 / MS_PER_MINUTE;
            let speed = (pair[1].1 - pair[0].1) / minutes;
            (speed.is_finite() && speed > 0.0 && speed < MAX_PLAUSIBLE_SPEED).then_some(speed)
        }));
    }

    speeds.sort_by(|a, b| b.total_cmp(a));
    let top = &speeds[..PEAK_SPEED_TOP_N.min(speeds.len())];
    (!top.is_empty()).then(|| top.iter().sum::<f64>() / top.len() as f64)
}
