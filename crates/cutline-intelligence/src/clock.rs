// ABOUTME: Local-time helpers: server timezone detection, UTC-to-local conversion, evening cutoffs
// ABOUTME: Local time is always UTC plus a fixed whole-hour offset
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use chrono::{DateTime, Days, FixedOffset, NaiveDateTime, NaiveTime, Timelike};

use cutline_core::constants::seasonality::{EVENING_CUTOFF_HOUR, FALLBACK_TZ_OFFSET_HOURS};
use cutline_core::constants::speed::MS_PER_HOUR;

/// Offsets tried, in order, when guessing the server timezone from an event start
const CANDIDATE_OFFSETS: [i32; 3] = [0, 8, 9];

/// Events open during local daytime; pick the first offset that puts the start in 10:00..=19:59.
#[must_use]
pub fn detect_tz_offset(start_ts: i64) -> i32 {
    let Some(start) = DateTime::from_timestamp_millis(start_ts) else {
        return FALLBACK_TZ_OFFSET_HOURS;
    };
    let utc_hour = i32::try_from(start.hour()).unwrap_or(0);
    CANDIDATE_OFFSETS
        .into_iter()
        .find(|offset| (10..=19).contains(&(utc_hour + offset).rem_euclid(24)))
        .unwrap_or(FALLBACK_TZ_OFFSET_HOURS)
}

fn fixed_offset(offset_hours: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(offset_hours.checked_mul(3600)?)
}

/// Wall-clock time at `ts_ms` for a fixed offset
#[must_use]
pub fn local_datetime(ts_ms: i64, offset_hours: i32) -> Option<NaiveDateTime> {
    let utc = DateTime::from_timestamp_millis(ts_ms)?;
    Some(utc.with_timezone(&fixed_offset(offset_hours)?).naive_local())
}

/// Epoch milliseconds of the first local 18:00 at or after `start_ts`
#[must_use]
pub fn first_evening_cutoff(start_ts: i64, offset_hours: i32) -> Option<i64> {
    let offset = fixed_offset(offset_hours)?;
    let local = local_datetime(start_ts, offset_hours)?;
    let evening = NaiveTime::from_hms_opt(EVENING_CUTOFF_HOUR, 0, 0)?;
    let mut cutoff = local.date().and_time(evening);
    if cutoff < local {
        cutoff = cutoff.checked_add_days(Days::new(1))?;
    }
    let cutoff = cutoff.and_local_timezone(offset).single()?;
    Some(cutoff.timestamp_millis())
}

/// Epoch milliseconds of local 18:00 on the calendar day of `start_ts`.
///
/// May precede `start_ts` when the event opens in the evening.
#[must_use]
pub fn same_day_evening(start_ts: i64, offset_hours: i32) -> Option<i64> {
    let offset = fixed_offset(offset_hours)?;
    let local = local_datetime(start_ts, offset_hours)?;
    let evening = local
        .date()
        .and_time(NaiveTime::from_hms_opt(EVENING_CUTOFF_HOUR, 0, 0)?);
    Some(evening.and_local_timezone(offset).single()?.timestamp_millis())
}

/// Hours from `from_ms` to `to_ms`
#[must_use]
pub fn hours_between(from_ms: i64, to_ms: i64) -> f64 {
    (to_ms - from_ms) as f64 / MS_PER_HOUR
}

/// Epoch milliseconds `hours` after `start_ts`, rounded to the millisecond
#[must_use]
pub fn offset_ms(start_ts: i64, hours: f64) -> i64 {
    start_ts + (hours * MS_PER_HOUR).round() as i64
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn utc_ms(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_detects_common_offsets() {
        // 15:00 UTC -> already daytime in UTC
        assert_eq!(detect_tz_offset(utc_ms(2024, 5, 1, 15, 0)), 0);
        // 07:00 UTC -> 15:00 at +8
        assert_eq!(detect_tz_offset(utc_ms(2024, 5, 1, 7, 0)), 8);
        // 01:00 UTC -> 09:00 at +8, 10:00 at +9
        assert_eq!(detect_tz_offset(utc_ms(2024, 5, 1, 1, 0)), 9);
        // 22:00 UTC -> nothing matches
        assert_eq!(detect_tz_offset(utc_ms(2024, 5, 1, 22, 0)), 8);
    }

    #[test]
    fn test_local_datetime_applies_offset() {
        let local = local_datetime(utc_ms(2024, 5, 1, 20, 30), 8).unwrap();
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(local.hour(), 4);
        assert_eq!(local.minute(), 30);
    }

    #[test]
    fn test_first_evening_cutoff_same_day_and_next_day() {
        // 07:00 UTC = 15:00 local (+8) -> 18:00 local = 10:00 UTC same day
        assert_eq!(
            first_evening_cutoff(utc_ms(2024, 5, 1, 7, 0), 8),
            Some(utc_ms(2024, 5, 1, 10, 0))
        );
        // 12:00 UTC = 20:00 local -> next day's 18:00 local
        assert_eq!(
            first_evening_cutoff(utc_ms(2024, 5, 1, 12, 0), 8),
            Some(utc_ms(2024, 5, 2, 10, 0))
        );
        // exactly 18:00 local stays
        assert_eq!(
            first_evening_cutoff(utc_ms(2024, 5, 1, 10, 0), 8),
            Some(utc_ms(2024, 5, 1, 10, 0))
        );
    }

    #[test]
    fn test_same_day_evening_may_precede_start() {
        assert_eq!(
            same_day_evening(utc_ms(2024, 5, 1, 12, 0), 8),
            Some(utc_ms(2024, 5, 1, 10, 0))
        );
    }

    #[test]
    fn test_hours_round_trip() {
        let start = utc_ms(2024, 5, 1, 0, 0);
        assert!((hours_between(start, offset_ms(start, 12.5)) - 12.5).abs() < 1e-9);
    }
}
