// ABOUTME: Seasonality profile model: day type x hour-of-day throughput statistics
// ABOUTME: JSON form is {"weekday"|"weekend": {"0".."23": stats | null}}
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::seasonality::{WEEKDAY_WEIGHT, WEEKEND_WEIGHT};

/// Hours per day
pub const HOURS_PER_DAY: usize = 24;

/// Day classification used for bucketing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    /// Working day pattern
    Weekday,
    /// Leisure day pattern
    Weekend,
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekday => write!(f, "weekday"),
            Self::Weekend => write!(f, "weekend"),
        }
    }
}

/// Aggregate statistics for one (day type, hour) bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyStats {
    /// Mean normalized speed
    pub mean: f64,
    /// Median normalized speed
    #[serde(default)]
    pub median: f64,
    /// Population standard deviation
    #[serde(default)]
    pub std: f64,
    /// Number of samples aggregated
    #[serde(default)]
    pub count: u64,
}

type Buckets = [Option<HourlyStats>; HOURS_PER_DAY];

/// Hour-of-day x day-type profile of normalized throughput.
///
/// Missing buckets are legal and mean "no information" (factor 1.0).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "ProfileJson", into = "ProfileJson")]
pub struct SeasonalityProfile {
    weekday: Buckets,
    weekend: Buckets,
}

impl SeasonalityProfile {
    /// Profile without any bucket
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether no bucket carries statistics
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weekday.iter().chain(&self.weekend).all(Option::is_none)
    }

    /// Statistics of one bucket
    #[must_use]
    pub fn bucket(&self, day_type: DayType, hour: u32) -> Option<&HourlyStats> {
        self.buckets(day_type).get(hour as usize)?.as_ref()
    }

    /// Replace one bucket; hours outside 0..24 are ignored
    pub fn set_bucket(&mut self, day_type: DayType, hour: u32, stats: Option<HourlyStats>) {
        let buckets = match day_type {
            DayType::Weekday => &mut self.weekday,
            DayType::Weekend => &mut self.weekend,
        };
        if let Some(slot) = buckets.get_mut(hour as usize) {
            *slot = stats;
        }
    }

    /// Copy with every weekend mean multiplied by `multiplier`
    #[must_use]
    pub fn with_weekend_multiplier(&self, multiplier: f64) -> Self {
        let mut copy = self.clone();
        for stats in copy.weekend.iter_mut().flatten() {
            stats.mean *= multiplier;
        }
        copy
    }

    /// Mean of the positive per-hour means of a day type; 1.0 when there are none
    #[must_use]
    pub fn day_mean(&self, day_type: DayType) -> f64 {
        let positives: Vec<f64> = self
            .buckets(day_type)
            .iter()
            .flatten()
            .map(|s| s.mean)
            .filter(|m| m.is_finite() && *m > 0.0)
            .collect();
        if positives.is_empty() {
            1.0
        } else {
            positives.iter().sum::<f64>() / positives.len() as f64
        }
    }

    /// `(weekday_mean * 5 + weekend_mean * 2) / 7`; always positive
    #[must_use]
    pub fn weighted_global_mean(&self) -> f64 {
        let weekday = self.day_mean(DayType::Weekday);
        let weekend = self.day_mean(DayType::Weekend);
        weekday.mul_add(WEEKDAY_WEIGHT, weekend * WEEKEND_WEIGHT) / (WEEKDAY_WEIGHT + WEEKEND_WEIGHT)
    }

    const fn buckets(&self, day_type: DayType) -> &Buckets {
        match day_type {
            DayType::Weekday => &self.weekday,
            DayType::Weekend => &self.weekend,
        }
    }
}

/// Wire form with string hour keys
#[derive(Serialize, Deserialize, Default)]
struct ProfileJson {
    #[serde(default)]
    weekday: BTreeMap<String, Option<HourlyStats>>,
    #[serde(default)]
    weekend: BTreeMap<String, Option<HourlyStats>>,
}

fn buckets_from_map(map: &BTreeMap<String, Option<HourlyStats>>) -> Buckets {
    let mut buckets: Buckets = [None; HOURS_PER_DAY];
    for (key, stats) in map {
        if let Ok(hour) = key.trim().parse::<usize>() {
            if let Some(slot) = buckets.get_mut(hour) {
                *slot = *stats;
            }
        }
    }
    buckets
}

fn map_from_buckets(buckets: &Buckets) -> BTreeMap<String, Option<HourlyStats>> {
    buckets
        .iter()
        .enumerate()
        .map(|(hour, stats)| (hour.to_string(), *stats))
        .collect()
}

impl From<ProfileJson> for SeasonalityProfile {
    fn from(json: ProfileJson) -> Self {
        Self {
            weekday: buckets_from_map(&json.weekday),
            weekend: buckets_from_map(&json.weekend),
        }
    }
}

impl From<SeasonalityProfile> for ProfileJson {
    fn from(profile: SeasonalityProfile) -> Self {
        Self {
            weekday: map_from_buckets(&profile.weekday),
            weekend: map_from_buckets(&profile.weekend),
        }
    }
}
