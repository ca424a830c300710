// ABOUTME: Shared test utilities for integration tests
// ABOUTME: In-memory EventSource and synthetic event/series generators
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::cast_precision_loss
)]
//! Shared test utilities for `cutline`

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use cutline_core::errors::ProviderError;
use cutline_core::models::{EventMeta, ScorePoint};
use cutline_providers::{CatalogEntry, EventSource, EventWindow, PeakSpeedWindow, SourceResult};

pub const HOUR_MS: i64 = 3_600_000;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_test_writer()
            .try_init();
    });
}

/// 15:00 at UTC+8 on a Monday
pub fn base_start() -> i64 {
    Utc.with_ymd_and_hms(2024, 5, 6, 7, 0, 0)
        .unwrap()
        .timestamp_millis()
}

/// Metadata of an event lasting `hours`, starting `weeks_back` weeks before [`base_start`]
pub fn meta(event_id: u32, event_type: &str, weeks_back: i64, hours: i64) -> EventMeta {
    let start_ts = base_start() - weeks_back * 7 * 24 * HOUR_MS;
    EventMeta {
        event_id,
        start_ts,
        end_ts: start_ts + hours * HOUR_MS,
        event_type: event_type.to_owned(),
    }
}

/// Hourly cumulative score with a slowly accelerating speed (points per minute).
///
/// The first point already carries one minute of progress so no start
/// correction applies.
pub fn hourly_series(start_ts: i64, hours: i64, per_minute: f64) -> Vec<ScorePoint> {
    (0..=hours)
        .map(|h| {
            let hf = h as f64;
            ScorePoint {
                time_ms: start_ts + h * HOUR_MS,
                score: per_minute * (1.0 + 60.0 * hf * (1.0 + hf / 400.0)),
            }
        })
        .collect()
}

/// Programmable in-memory event source
#[derive(Default)]
pub struct FakeSource {
    metas: HashMap<u32, EventMeta>,
    series: HashMap<u32, Vec<ScorePoint>>,
    scales: HashMap<u32, f64>,
    catalog: Option<Vec<CatalogEntry>>,
    catalog_fails: bool,
    recent: Option<Vec<EventWindow>>,
    failing: HashSet<u32>,
    meta_calls: Mutex<Vec<u32>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete event: metadata, hourly series over its whole length, scale
    pub fn with_event(mut self, meta: EventMeta, per_minute: f64, scale: f64) -> Self {
        let hours = (meta.end_ts - meta.start_ts) / HOUR_MS;
        self.series
            .insert(meta.event_id, hourly_series(meta.start_ts, hours, per_minute));
        self.scales.insert(meta.event_id, scale);
        self.metas.insert(meta.event_id, meta);
        self
    }

    pub fn with_meta(mut self, meta: EventMeta) -> Self {
        self.metas.insert(meta.event_id, meta);
        self
    }

    pub fn with_series(mut self, event_id: u32, points: Vec<ScorePoint>) -> Self {
        self.series.insert(event_id, points);
        self
    }

    pub fn with_scale(mut self, event_id: u32, scale: f64) -> Self {
        self.scales.insert(event_id, scale);
        self
    }

    pub fn without_scale(mut self, event_id: u32) -> Self {
        self.scales.remove(&event_id);
        self
    }

    pub fn with_catalog(mut self, entries: &[(u32, &str)]) -> Self {
        self.catalog = Some(
            entries
                .iter()
                .map(|(event_id, event_type)| CatalogEntry {
                    event_id: *event_id,
                    event_type: Some((*event_type).to_owned()),
                })
                .collect(),
        );
        self
    }

    pub fn with_failing_catalog(mut self) -> Self {
        self.catalog_fails = true;
        self
    }

    pub fn with_recent(mut self, windows: Vec<EventWindow>) -> Self {
        self.recent = Some(windows);
        self
    }

    /// Every call about `event_id` fails with a network error
    pub fn failing(mut self, event_id: u32) -> Self {
        self.failing.insert(event_id);
        self
    }

    /// Ids whose metadata was requested, in call order
    pub fn meta_calls(&self) -> Vec<u32> {
        self.meta_calls.lock().unwrap().clone()
    }

    fn check(&self, event_id: u32) -> Result<(), ProviderError> {
        if self.failing.contains(&event_id) {
            Err(ProviderError::NetworkError(format!(
                "connection reset for {event_id}"
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EventSource for FakeSource {
    async fn event_meta(&self, event_id: u32) -> SourceResult<EventMeta> {
        self.meta_calls.lock().unwrap().push(event_id);
        self.check(event_id)?;
        Ok(self.metas.get(&event_id).cloned())
    }

    async fn score_series(&self, event_id: u32, _tier: u32) -> SourceResult<Vec<ScorePoint>> {
        self.check(event_id)?;
        Ok(self.series.get(&event_id).cloned())
    }

    async fn peak_speed(&self, event_id: u32, _window: PeakSpeedWindow) -> SourceResult<f64> {
        self.check(event_id)?;
        Ok(self.scales.get(&event_id).copied())
    }

    async fn catalog(&self) -> SourceResult<Vec<CatalogEntry>> {
        if self.catalog_fails {
            return Err(ProviderError::api("tracker", 503, "unavailable"));
        }
        Ok(self.catalog.clone())
    }

    async fn recent_events(&self) -> SourceResult<Vec<EventWindow>> {
        Ok(self.recent.clone())
    }
}
