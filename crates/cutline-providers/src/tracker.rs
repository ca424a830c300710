// ABOUTME: EventSource implementation over the Bestdori-compatible HTTP tracker API
// ABOUTME: Shares one injected TrackerClient; all endpoints are scoped to one server index
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use cutline_core::constants::api::{RECENT_FEED_PATH, TOP_POINTS_INTERVAL_MS};
use cutline_core::models::{EventMeta, ScorePoint};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::http_client::TrackerClient;
use crate::peak_speed::estimate_peak_speed;
use crate::source::{CatalogEntry, EventSource, EventWindow, PeakSpeedWindow, SourceResult};
use crate::wire::{catalog_entries, recent_windows, EventPayload, TopPointsPayload, TrackerPayload};

/// Remote source for one game server
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: Arc<TrackerClient>,
    server_index: usize,
}

impl HttpEventSource {
    /// Source reading `server_index` columns through `client`
    #[must_use]
    pub const fn new(client: Arc<TrackerClient>, server_index: usize) -> Self {
        Self {
            client,
            server_index,
        }
    }

    /// Configured server index
    #[must_use]
    pub const fn server_index(&self) -> usize {
        self.server_index
    }

    fn server(&self) -> (&'static str, String) {
        ("server", self.server_index.to_string())
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    #[instrument(skip(self))]
    async fn event_meta(&self, event_id: u32) -> SourceResult<EventMeta> {
        let payload: Option<EventPayload> = self
            .client
            .get_json(&format!("events/{event_id}.json"), &[], "event metadata")
            .await?;
        let meta = payload.and_then(|p| p.into_meta(event_id, self.server_index));
        if meta.is_none() {
            debug!(event_id, server = self.server_index, "Event not scheduled on server");
        }
        Ok(meta)
    }

    #[instrument(skip(self))]
    async fn score_series(&self, event_id: u32, tier: u32) -> SourceResult<Vec<ScorePoint>> {
        let payload: Option<TrackerPayload> = self
            .client
            .get_json(
                "tracker/data",
                &[
                    self.server(),
                    ("event", event_id.to_string()),
                    ("tier", tier.to_string()),
                ],
                "tracker data",
            )
            .await?;
        Ok(payload
            .and_then(TrackerPayload::into_points)
            .filter(|points| !points.is_empty()))
    }

    #[instrument(skip(self))]
    async fn peak_speed(&self, event_id: u32, window: PeakSpeedWindow) -> SourceResult<f64> {
        let payload: Option<TopPointsPayload> = self
            .client
            .get_json(
                "eventtop/data",
                &[
                    self.server(),
                    ("event", event_id.to_string()),
                    ("mid", "0".to_owned()),
                    ("interval", TOP_POINTS_INTERVAL_MS.to_string()),
                ],
                "top-ranking points",
            )
            .await?;
        Ok(payload.and_then(|p| estimate_peak_speed(&p.points, window)))
    }

    async fn catalog(&self) -> SourceResult<Vec<CatalogEntry>> {
        let payload: Option<BTreeMap<String, Value>> = self
            .client
            .get_json(
                &format!("events/all.{}.json", self.server_index),
                &[],
                "event catalog",
            )
            .await?;
        Ok(payload.map(catalog_entries))
    }

    async fn recent_events(&self) -> SourceResult<Vec<EventWindow>> {
        let payload: Option<Value> = self
            .client
            .get_json(RECENT_FEED_PATH, &[], "recent feed")
            .await?;
        Ok(payload.map(|doc| recent_windows(&doc, self.server_index)))
    }
}
