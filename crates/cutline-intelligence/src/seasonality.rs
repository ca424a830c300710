// ABOUTME: Seasonality model: hour-of-day x day-type factors, deseasonalization and re-modulation
// ABOUTME: Adds the end-of-event panic blend when re-applying factors to a forecast skeleton
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! # Seasonality Model
//!
//! Throughput follows a daily rhythm that differs between working days and
//! days off. The model divides that rhythm out of observed speeds (giving a
//! "skeleton") and multiplies it back onto forecast skeletons.
//!
//! ## Day type rules
//!
//! 1. Friday from 17:00 local behaves like a weekend
//! 2. Sunday from 23:00 local behaves like a weekday
//! 3. Otherwise the [`WorkdayCalendar`] decides when it has an answer
//! 4. Otherwise Saturday and Sunday are weekend days
//!
//! ## Factor
//!
//! `factor = bucket.mean / weighted_global_mean` for a positive bucket mean,
//! `1.0` for missing or non-positive buckets.

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

use cutline_core::constants::seasonality::{
    EARLY_SUPPRESSION_HOURS, FALLBACK_TZ_OFFSET_HOURS, FRIDAY_WEEKEND_START_HOUR,
    SUNDAY_WEEKDAY_START_HOUR,
};
use cutline_core::models::{DayType, SeasonalityProfile, SkeletonSample, SpeedSample};

use crate::calendar::{WeekendRule, WorkdayCalendar};
use crate::clock::{local_datetime, offset_ms};

/// Day type of a local datetime under the shift rules and `calendar`
#[must_use]
pub fn classify_day(local: NaiveDateTime, calendar: &dyn WorkdayCalendar) -> DayType {
    let weekday = local.weekday();
    let hour = local.hour();
    if weekday == Weekday::Fri && hour >= FRIDAY_WEEKEND_START_HOUR {
        return DayType::Weekend;
    }
    if weekday == Weekday::Sun && hour >= SUNDAY_WEEKDAY_START_HOUR {
        return DayType::Weekday;
    }
    match calendar.is_workday(local.date()) {
        Some(true) => DayType::Weekday,
        Some(false) => DayType::Weekend,
        None if weekday.num_days_from_monday() >= 5 => DayType::Weekend,
        None => DayType::Weekday,
    }
}

/// Seasonal factors derived from a profile
#[derive(Clone)]
pub struct SeasonalityModel {
    profile: SeasonalityProfile,
    global_mean: f64,
    calendar: Arc<dyn WorkdayCalendar>,
    tz_offset_hours: i32,
    panic_scaler: f64,
    panic_ease_power: f64,
}

impl fmt::Debug for SeasonalityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeasonalityModel")
            .field("global_mean", &self.global_mean)
            .field("tz_offset_hours", &self.tz_offset_hours)
            .field("panic_scaler", &self.panic_scaler)
            .field("panic_ease_power", &self.panic_ease_power)
            .field("empty_profile", &self.profile.is_empty())
            .finish_non_exhaustive()
    }
}

impl SeasonalityModel {
    /// Build from a profile copy, scaling weekend buckets by `weekend_multiplier`
    #[must_use]
    pub fn build(
        profile: &SeasonalityProfile,
        weekend_multiplier: f64,
        calendar: Arc<dyn WorkdayCalendar>,
    ) -> Self {
        #[allow(clippy::float_cmp)]
        let profile = if weekend_multiplier == 1.0 {
            profile.clone()
        } else {
            profile.with_weekend_multiplier(weekend_multiplier)
        };
        let global_mean = profile.weighted_global_mean();
        Self {
            profile,
            global_mean,
            calendar,
            tz_offset_hours: FALLBACK_TZ_OFFSET_HOURS,
            panic_scaler: 1.0,
            panic_ease_power: 1.0,
        }
    }

    /// Neutral model: empty profile, plain weekend rule
    #[must_use]
    pub fn neutral() -> Self {
        Self::build(&SeasonalityProfile::empty(), 1.0, Arc::new(WeekendRule))
    }

    /// Set the local timezone offset (hours east of UTC)
    #[must_use]
    pub const fn with_tz_offset(mut self, tz_offset_hours: i32) -> Self {
        self.tz_offset_hours = tz_offset_hours;
        self
    }

    /// Set the panic blend target and easing exponent
    #[must_use]
    pub const fn with_panic(mut self, panic_scaler: f64, panic_ease_power: f64) -> Self {
        self.panic_scaler = panic_scaler;
        self.panic_ease_power = panic_ease_power;
        self
    }

    /// `(weekday_mean * 5 + weekend_mean * 2) / 7` of the (scaled) profile
    #[must_use]
    pub const fn weighted_global_mean(&self) -> f64 {
        self.global_mean
    }

    /// Offset used for local time
    #[must_use]
    pub const fn tz_offset_hours(&self) -> i32 {
        self.tz_offset_hours
    }

    /// Day type of a local datetime
    #[must_use]
    pub fn day_type(&self, local: NaiveDateTime) -> DayType {
        classify_day(local, self.calendar.as_ref())
    }

    /// Seasonal factor at a local datetime
    #[must_use]
    pub fn factor(&self, local: NaiveDateTime) -> f64 {
        self.profile
            .bucket(self.day_type(local), local.hour())
            .map(|stats| stats.mean)
            .filter(|mean| mean.is_finite() && *mean > 0.0)
            .map_or(1.0, |mean| mean / self.global_mean)
    }

    /// Seasonal factor at an epoch-millisecond instant
    #[must_use]
    pub fn factor_at(&self, ts_ms: i64) -> f64 {
        local_datetime(ts_ms, self.tz_offset_hours).map_or(1.0, |local| self.factor(local))
    }

    /// Divide the seasonal factor out of each sample.
    ///
    /// During the first 12 hours a factor below 1.0 is raised to 1.0.
    #[must_use]
    pub fn remove_seasonality(&self, samples: &[SpeedSample]) -> Vec<SkeletonSample> {
        samples
            .iter()
            .map(|sample| {
                let mut factor = self.factor_at(sample.time_ms);
                if sample.hours_elapsed < EARLY_SUPPRESSION_HOURS && factor < 1.0 {
                    factor = 1.0;
                }
                SkeletonSample {
                    time_ms: sample.time_ms,
                    hours_elapsed: sample.hours_elapsed,
                    normalized_speed: sample.normalized_speed,
                    skeleton: sample.normalized_speed / factor,
                }
            })
            .collect()
    }

    /// Multiply seasonal factors back onto a skeleton sampled at `t_hours`.
    ///
    /// Within the last `t_panic` hours the factor is blended toward
    /// `max(raw_factor, panic_scaler)`.
    #[must_use]
    pub fn apply_seasonality(
        &self,
        t_hours: &[f64],
        skeleton: &[f64],
        start_ts: i64,
        total_hours: f64,
        t_panic: f64,
    ) -> Vec<f64> {
        t_hours
            .iter()
            .zip(skeleton)
            .map(|(&h, &value)| {
                let raw = self.factor_at(offset_ms(start_ts, h));
                value * self.panic_factor(raw, total_hours - h, t_panic)
            })
            .collect()
    }

    fn panic_factor(&self, raw: f64, time_left: f64, t_panic: f64) -> f64 {
        if t_panic <= 0.0 || time_left >= t_panic {
            return raw;
        }
        let progress = 1.0 - time_left.max(0.0) / t_panic;
        let eased = if progress > 0.0 {
            progress.powf(self.panic_ease_power)
        } else {
            0.0
        };
        let target = raw.max(self.panic_scaler);
        raw.mul_add(1.0 - eased, target * eased)
    }
}
