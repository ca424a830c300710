// ABOUTME: Wire formats of the Bestdori-compatible tracker API and their conversion to domain types
// ABOUTME: Per-server timestamp arrays may hold numbers, numeric strings or null
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use std::collections::BTreeMap;

use cutline_core::models::{EventMeta, ScorePoint};
use serde::Deserialize;
use serde_json::Value;

use crate::source::{CatalogEntry, EventWindow};

/// `events/{id}.json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    /// Start per server
    #[serde(default, alias = "start_at")]
    pub start_at: Vec<Value>,
    /// End per server
    #[serde(default, alias = "end_at")]
    pub end_at: Vec<Value>,
    /// Category
    #[serde(default, alias = "event_type")]
    pub event_type: Option<String>,
}

impl EventPayload {
    /// Metadata for `server_index`; `None` when the event is not scheduled there
    #[must_use]
    pub fn into_meta(self, event_id: u32, server_index: usize) -> Option<EventMeta> {
        let start_ts = self.start_at.get(server_index).and_then(timestamp)?;
        let end_ts = self.end_at.get(server_index).and_then(timestamp)?;
        Some(EventMeta {
            event_id,
            start_ts,
            end_ts,
            event_type: self.event_type.unwrap_or_else(|| "unknown".to_owned()),
        })
    }
}

/// `tracker/data`
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerPayload {
    /// False when the tracker has nothing for this event/tier
    #[serde(default)]
    pub result: bool,
    /// Observations
    #[serde(default)]
    pub cutoffs: Vec<CutoffPayload>,
}

/// One tracker observation
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CutoffPayload {
    /// Epoch milliseconds
    pub time: i64,
    /// Cumulative score
    pub ep: f64,
}

impl TrackerPayload {
    /// Observations sorted by time; `None` when the tracker reports no result
    #[must_use]
    pub fn into_points(self) -> Option<Vec<ScorePoint>> {
        if !self.result {
            return None;
        }
        let mut points: Vec<ScorePoint> = self
            .cutoffs
            .into_iter()
            .filter(|c| c.ep.is_finite())
            .map(|c| ScorePoint {
                time_ms: c.time,
                score: c.ep,
            })
            .collect();
        points.sort_by_key(|p| p.time_ms);
        Some(points)
    }
}

/// `eventtop/data`
#[derive(Debug, Clone, Deserialize)]
pub struct TopPointsPayload {
    /// Per-player cumulative points, in response order
    #[serde(default)]
    pub points: Vec<TopPoint>,
}

/// One top-player observation
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TopPoint {
    /// Epoch milliseconds
    pub time: i64,
    /// Player id
    pub uid: u64,
    /// Cumulative points
    pub value: f64,
}

/// `events/all.{server}.json`: id → summary
#[must_use]
pub fn catalog_entries(payload: BTreeMap<String, Value>) -> Vec<CatalogEntry> {
    payload
        .into_iter()
        .filter_map(|(id, summary)| {
            let event_id = id.trim().parse().ok()?;
            let event_type = ["eventType", "event_type"]
                .iter()
                .find_map(|key| summary.get(key).and_then(Value::as_str))
                .map(str::to_owned);
            Some(CatalogEntry {
                event_id,
                event_type,
            })
        })
        .collect()
}

/// `news/dynamic/recent.json`: the `events` node, or the document itself when
/// it already is an id → schedule map
#[must_use]
pub fn recent_windows(payload: &Value, server_index: usize) -> Vec<EventWindow> {
    let Some(node) = events_node(payload) else {
        return Vec::new();
    };
    node.iter()
        .filter_map(|(id, schedule)| {
            let event_id = id.trim().parse().ok()?;
            let starts = array_field(schedule, "startAt", "start_at")?;
            let ends = array_field(schedule, "endAt", "end_at")?;
            Some(EventWindow {
                event_id,
                start_ts: starts.get(server_index).and_then(timestamp),
                end_ts: ends.get(server_index).and_then(timestamp),
            })
        })
        .collect()
}

fn events_node(payload: &Value) -> Option<&serde_json::Map<String, Value>> {
    if let Some(events) = payload.get("events").and_then(Value::as_object) {
        return Some(events);
    }
    let map = payload.as_object()?;
    let looks_like_schedule = !map.is_empty()
        && map
            .values()
            .all(|v| v.get("startAt").is_some() || v.get("start_at").is_some());
    looks_like_schedule.then_some(map)
}

fn array_field<'a>(value: &'a Value, camel: &str, snake: &str) -> Option<&'a Vec<Value>> {
    value
        .get(camel)
        .or_else(|| value.get(snake))
        .and_then(Value::as_array)
}

/// Timestamp from a number or numeric string; null and blanks are absent
#[must_use]
pub fn timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                None
            } else {
                trimmed.parse().ok()
            }
        }
        _ => None,
    }
}
