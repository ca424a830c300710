// ABOUTME: Event metadata model and maintenance-delay start correction
// ABOUTME: EventMeta is immutable; a corrected start produces a new value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ScorePoint;
use crate::constants::forecast::MAX_START_CORRECTION_HOURS;
use crate::constants::speed::MS_PER_HOUR;

const MS_PER_HOUR_I64: i64 = 3_600_000;

/// Identity and nominal time window of a ranking event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    /// Numeric event id
    pub event_id: u32,
    /// Nominal start (epoch milliseconds)
    pub start_ts: i64,
    /// End (epoch milliseconds)
    pub end_ts: i64,
    /// Event category used for analogue matching (e.g. "story", "versus")
    pub event_type: String,
}

impl EventMeta {
    /// Event length in hours
    #[must_use]
    pub fn total_hours(&self) -> f64 {
        (self.end_ts - self.start_ts) as f64 / MS_PER_HOUR
    }

    /// Start as a UTC datetime, if representable
    #[must_use]
    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.start_ts)
    }

    /// Whether two events belong to the same category (case-insensitive)
    #[must_use]
    pub fn same_type_as(&self, event_type: &str) -> bool {
        self.event_type.eq_ignore_ascii_case(event_type)
    }

    /// Copy of this metadata with the maintenance-delay correction applied.
    ///
    /// Returns an identical copy when no correction applies.
    #[must_use]
    pub fn with_corrected_start(&self, series: &[ScorePoint]) -> Self {
        let start_ts = corrected_start(self.start_ts, series).unwrap_or(self.start_ts);
        Self {
            start_ts,
            ..self.clone()
        }
    }
}

/// Maintenance-delay correction of an event start.
///
/// The anchor is the first sample with a positive score (or the first sample
/// when none is positive), floored to the hour. Returns `Some` only when the
/// anchor is strictly later than `start_ts` and less than 24 hours later.
#[must_use]
pub fn corrected_start(start_ts: i64, series: &[ScorePoint]) -> Option<i64> {
    let anchor = series
        .iter()
        .find(|p| p.score > 0.0)
        .or_else(|| series.first())?;

    let floored = anchor.time_ms.div_euclid(MS_PER_HOUR_I64) * MS_PER_HOUR_I64;
    let delay = floored - start_ts;
    (delay > 0 && delay < MAX_START_CORRECTION_HOURS * MS_PER_HOUR_I64).then_some(floored)
}
