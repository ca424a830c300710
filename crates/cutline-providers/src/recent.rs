// ABOUTME: Current-event detection from the recently scheduled events of one server
// ABOUTME: Prefers the active event with the latest start, else the event nearest to now
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use crate::source::EventWindow;

/// Event id to forecast at `now_ms`, if any schedule is usable
#[must_use]
pub fn select_current_event(windows: &[EventWindow], now_ms: i64) -> Option<u32> {
    let active = windows
        .iter()
        .filter_map(|w| match (w.start_ts, w.end_ts) {
            (Some(start), Some(end)) if start <= now_ms && now_ms <= end => Some((start, w.event_id)),
            _ => None,
        })
        .max();
    if let Some((_, event_id)) = active {
        return Some(event_id);
    }

    windows
        .iter()
        .filter_map(|w| {
            let distance = [w.start_ts, w.end_ts]
                .into_iter()
                .flatten()
                .map(|ts| ts.abs_diff(now_ms))
                .min()?;
            Some((distance, w.event_id))
        })
        .min()
        .map(|(_, event_id)| event_id)
}
