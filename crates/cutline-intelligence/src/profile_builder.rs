// ABOUTME: Aggregates past events into a day-type x hour seasonality profile
// ABOUTME: Skips each event's first day and last two days and broken low-scale events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Timelike;
use cutline_core::constants::profile::{
    LOCAL_OFFSET_HOURS, MAX_NORMALIZED_SPEED, MIN_SCALE, SKIP_LEADING_HOURS, SKIP_TRAILING_HOURS,
};
use cutline_core::constants::speed::MS_PER_HOUR;
use cutline_core::models::{DayType, EventMeta, HourlyStats, ScorePoint, SeasonalityProfile};
use tracing::{debug, info};

use crate::calendar::{WeekendRule, WorkdayCalendar};
use crate::clock::local_datetime;
use crate::seasonality::classify_day;
use crate::speed::raw_speeds;

const HOURS: u32 = 24;

/// Why an event was left out of the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Peak-speed scale below the sanity threshold
    ScaleTooSmall,
    /// No usable speed inside the stable middle of the event
    NoStableSamples,
}

/// Accumulates normalized speeds per (day type, local hour)
pub struct ProfileBuilder {
    calendar: Arc<dyn WorkdayCalendar>,
    buckets: HashMap<(DayType, u32), Vec<f64>>,
    events_used: usize,
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self::new(Arc::new(WeekendRule))
    }
}

impl ProfileBuilder {
    /// Builder classifying days with `calendar`
    #[must_use]
    pub fn new(calendar: Arc<dyn WorkdayCalendar>) -> Self {
        Self {
            calendar,
            buckets: HashMap::new(),
            events_used: 0,
        }
    }

    /// Events that contributed at least one sample
    #[must_use]
    pub const fn events_used(&self) -> usize {
        self.events_used
    }

    /// Add one event's tracker series.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] when the event contributes nothing.
    pub fn add_event(
        &mut self,
        meta: &EventMeta,
        scale: f64,
        points: &[ScorePoint],
    ) -> Result<usize, SkipReason> {
        if !scale.is_finite() || scale < MIN_SCALE {
            debug!(event_id = meta.event_id, scale, "Skipping event with broken scale");
            return Err(SkipReason::ScaleTooSmall);
        }
        let valid_start = meta.start_ts + SKIP_LEADING_HOURS * MS_PER_HOUR as i64;
        let valid_end = meta.end_ts - SKIP_TRAILING_HOURS * MS_PER_HOUR as i64;

        let mut added = 0;
        for (time_ms, speed) in raw_speeds(points) {
            if !speed.is_finite() || speed < 0.0 || time_ms < valid_start || time_ms > valid_end {
                continue;
            }
            let normalized = speed / scale;
            if normalized > MAX_NORMALIZED_SPEED {
                continue;
            }
            let Some(local) = local_datetime(time_ms, LOCAL_OFFSET_HOURS) else {
                continue;
            };
            let day_type = classify_day(local, self.calendar.as_ref());
            self.buckets
                .entry((day_type, local.hour()))
                .or_default()
                .push(normalized);
            added += 1;
        }

        if added == 0 {
            return Err(SkipReason::NoStableSamples);
        }
        self.events_used += 1;
        debug!(event_id = meta.event_id, scale, samples = added, "Event archived into profile");
        Ok(added)
    }

    /// Aggregate every bucket into a profile
    #[must_use]
    pub fn finish(self) -> SeasonalityProfile {
        let mut profile = SeasonalityProfile::empty();
        for day_type in [DayType::Weekday, DayType::Weekend] {
            for hour in 0..HOURS {
                let stats = self
                    .buckets
                    .get(&(day_type, hour))
                    .and_then(|values| summarize(values));
                profile.set_bucket(day_type, hour, stats);
            }
        }
        info!(events = self.events_used, "Seasonality profile built");
        profile
    }
}

/// Mean, median, population std and count; `None` for an empty slice
#[must_use]
pub fn summarize(values: &[f64]) -> Option<HourlyStats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    Some(HourlyStats {
        mean,
        median,
        std: variance.sqrt(),
        count: values.len() as u64,
    })
}
