// ABOUTME: Loads the target event (metadata, tier series, peak-speed scale) and applies the freeze split
// ABOUTME: Missing or failed target data becomes ForecastError::DataUnavailable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use cutline_core::constants::speed::MS_PER_HOUR;
use cutline_core::errors::{ForecastError, ForecastResult};
use cutline_core::models::{EventMeta, ScorePoint};
use cutline_providers::{EventSource, PeakSpeedWindow, SourceResult};
use tracing::{info, warn};

/// Target observations split at the freeze limit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrozenSeries {
    /// Points visible to the forecast (at or before the limit)
    pub observed: Vec<ScorePoint>,
    /// Points after the limit, kept only for evaluation
    pub withheld: Vec<ScorePoint>,
}

/// Epoch milliseconds `hours` after `start_ts`
#[must_use]
pub fn freeze_limit_ms(start_ts: i64, hours: f64) -> i64 {
    start_ts + (hours * MS_PER_HOUR) as i64
}

/// Split `points` at `limit_ms`; everything is observed when there is no limit
#[must_use]
pub fn freeze_split(points: &[ScorePoint], limit_ms: Option<i64>) -> FrozenSeries {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.time_ms);
    match limit_ms {
        None => FrozenSeries {
            observed: sorted,
            withheld: Vec::new(),
        },
        Some(limit) => {
            let (observed, withheld) = sorted.into_iter().partition(|p| p.time_ms <= limit);
            FrozenSeries { observed, withheld }
        }
    }
}

/// Target data ready for the engine
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTarget {
    /// Nominal metadata
    pub meta: EventMeta,
    /// Split tier series
    pub series: FrozenSeries,
    /// Peak-speed scale, honouring the freeze limit
    pub scale: f64,
}

/// Fetch everything the forecast needs about the target.
///
/// `freeze_hours` is measured from the nominal start.
///
/// # Errors
///
/// Returns [`ForecastError::DataUnavailable`] when the metadata, the tier
/// series (after the freeze split) or the peak-speed scale is missing or
/// could not be fetched.
pub async fn load_target(
    source: &dyn EventSource,
    event_id: u32,
    tier: u32,
    freeze_hours: Option<f64>,
) -> ForecastResult<LoadedTarget> {
    let meta = required(source.event_meta(event_id).await, "event metadata", event_id)?;
    let limit_ms = freeze_hours.map(|hours| freeze_limit_ms(meta.start_ts, hours));
    if let Some(limit) = limit_ms {
        info!(event_id, freeze_hours, limit_ms = limit, "Freeze mode: later observations withheld");
    }

    let points = required(source.score_series(event_id, tier).await, "score series", event_id)?;
    let series = freeze_split(&points, limit_ms);
    if series.observed.is_empty() {
        return Err(ForecastError::unavailable("score series", event_id));
    }

    let scale = required(
        source
            .peak_speed(event_id, PeakSpeedWindow::target(limit_ms))
            .await,
        "peak speed scale",
        event_id,
    )?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ForecastError::unavailable("peak speed scale", event_id));
    }

    info!(
        event_id,
        tier,
        observed = series.observed.len(),
        withheld = series.withheld.len(),
        scale,
        "Target loaded"
    );
    Ok(LoadedTarget {
        meta,
        series,
        scale,
    })
}

fn required<T>(outcome: SourceResult<T>, what: &'static str, event_id: u32) -> ForecastResult<T> {
    match outcome {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(ForecastError::unavailable(what, event_id)),
        Err(e) => {
            warn!(event_id, what, error = %e, "Target fetch failed");
            Err(ForecastError::unavailable(what, event_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time_ms: i64, score: f64) -> ScorePoint {
        ScorePoint { time_ms, score }
    }

    #[test]
    fn test_freeze_split_is_inclusive_and_sorted() {
        let points = vec![point(300, 3.0), point(100, 1.0), point(200, 2.0)];
        let split = freeze_split(&points, Some(200));
        assert_eq!(split.observed, vec![point(100, 1.0), point(200, 2.0)]);
        assert_eq!(split.withheld, vec![point(300, 3.0)]);
        // source untouched
        assert_eq!(points[0], point(300, 3.0));
    }

    #[test]
    fn test_no_limit_keeps_everything() {
        let split = freeze_split(&[point(5, 1.0)], None);
        assert_eq!(split.observed.len(), 1);
        assert!(split.withheld.is_empty());
    }

    #[test]
    fn test_freeze_limit_hours() {
        assert_eq!(freeze_limit_ms(1_000, 2.5), 1_000 + 9_000_000);
    }
}
