// ABOUTME: Builds the seasonality profile from a range of past events fetched through an EventSource
// ABOUTME: Events with missing data or a broken peak-speed scale are skipped, never fatal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use cutline_core::models::SeasonalityProfile;
use cutline_intelligence::calendar::WorkdayCalendar;
use cutline_intelligence::profile_builder::ProfileBuilder;
use cutline_providers::{EventSource, PeakSpeedWindow};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Summary of a profile build
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileBuildOutcome {
    /// Aggregated profile
    pub profile: SeasonalityProfile,
    /// Events that contributed samples
    pub events_used: usize,
    /// Events looked at
    pub events_scanned: usize,
}

/// Fetch every event in `event_ids` and aggregate the usable ones.
///
/// `pause` is slept between events to stay polite to the API.
pub async fn build_profile(
    source: &dyn EventSource,
    event_ids: RangeInclusive<u32>,
    tier: u32,
    calendar: Arc<dyn WorkdayCalendar>,
    pause: Duration,
) -> ProfileBuildOutcome {
    let mut builder = ProfileBuilder::new(calendar);
    let mut events_scanned = 0;

    for event_id in event_ids {
        events_scanned += 1;
        let meta = match source.event_meta(event_id).await {
            Ok(Some(meta)) => meta,
            Ok(None) => continue,
            Err(e) => {
                warn!(event_id, error = %e, "Skipping event, metadata fetch failed");
                continue;
            }
        };
        let points = match source.score_series(event_id, tier).await {
            Ok(Some(points)) => points,
            Ok(None) => continue,
            Err(e) => {
                warn!(event_id, error = %e, "Skipping event, series fetch failed");
                continue;
            }
        };
        let scale = match source.peak_speed(event_id, PeakSpeedWindow::candidate()).await {
            Ok(Some(scale)) => scale,
            Ok(None) => {
                debug!(event_id, "Skipping event without peak speed");
                continue;
            }
            Err(e) => {
                warn!(event_id, error = %e, "Skipping event, peak speed fetch failed");
                continue;
            }
        };

        match builder.add_event(&meta, scale, &points) {
            Ok(samples) => info!(event_id, scale, samples, "Event archived"),
            Err(reason) => debug!(event_id, ?reason, "Event skipped"),
        }
        if !pause.is_zero() {
            sleep(pause).await;
        }
    }

    let events_used = builder.events_used();
    ProfileBuildOutcome {
        profile: builder.finish(),
        events_used,
        events_scanned,
    }
}
