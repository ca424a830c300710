// ABOUTME: Integrates the smoothed normalized speed into a cumulative score trajectory
// ABOUTME: Predicted points start at the current time and are anchored at the last observed score
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use cutline_core::models::ScorePoint;

use crate::calibration::TimeGrid;
use crate::clock::offset_ms;

/// Predicted cumulative scores for grid points at or after `now_hours`.
///
/// Each step adds `smoothed · target_scale · step_minutes` to `anchor_score`.
#[must_use]
pub fn integrate_future(
    grid: &TimeGrid,
    smoothed: &[f64],
    target_scale: f64,
    start_ts: i64,
    now_hours: f64,
    anchor_score: f64,
) -> Vec<ScorePoint> {
    let dt_min = grid.step_minutes();
    let mut score = anchor_score;
    grid.hours()
        .iter()
        .zip(smoothed)
        .filter(|(&h, _)| h >= now_hours)
        .map(|(&h, &speed)| {
            score = (speed * target_scale).mul_add(dt_min, score);
            ScorePoint {
                time_ms: offset_ms(start_ts, h),
                score,
            }
        })
        .collect()
}

/// Observed points followed by predicted points, sorted by time
#[must_use]
pub fn assemble_curve(observed: &[ScorePoint], predicted: Vec<ScorePoint>) -> Vec<ScorePoint> {
    let mut curve = observed.to_vec();
    curve.sort_by_key(|p| p.time_ms);
    curve.extend(predicted);
    curve.sort_by_key(|p| p.time_ms);
    curve
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_future_only_and_anchored() {
        let grid = TimeGrid::uniform(10.0, 11);
        let smoothed = vec![0.5; 11];
        let points = integrate_future(&grid, &smoothed, 2.0, 0, 7.5, 1000.0);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].time_ms, 8 * 3_600_000);
        // 0.5 * 2 points/min * 60 min
        assert!((points[0].score - 1060.0).abs() < 1e-9);
        assert!((points[2].score - 1180.0).abs() < 1e-9);
    }

    #[test]
    fn test_curve_is_non_decreasing_for_non_negative_speed() {
        let grid = TimeGrid::uniform(48.0, 97);
        let smoothed: Vec<f64> = (0..97).map(|i| f64::from(i % 5) * 0.1).collect();
        let points = integrate_future(&grid, &smoothed, 300.0, 0, 0.0, 0.0);
        assert!(points.windows(2).all(|w| w[1].score >= w[0].score));
    }

    #[test]
    fn test_assembled_curve_is_sorted() {
        let observed = vec![
            ScorePoint {
                time_ms: 2_000,
                score: 20.0,
            },
            ScorePoint {
                time_ms: 1_000,
                score: 10.0,
            },
        ];
        let predicted = vec![ScorePoint {
            time_ms: 3_000,
            score: 30.0,
        }];
        let curve = assemble_curve(&observed, predicted);
        let times: Vec<i64> = curve.iter().map(|p| p.time_ms).collect();
        assert_eq!(times, vec![1_000, 2_000, 3_000]);
    }
}
