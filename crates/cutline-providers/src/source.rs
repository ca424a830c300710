// ABOUTME: EventSource trait abstracting where event metadata, series and peak speeds come from
// ABOUTME: Ok(None) means absent data; Err means the source failed after its own retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use async_trait::async_trait;
use cutline_core::constants::api::CANDIDATE_TOP_POINTS_LIMIT;
use cutline_core::errors::ProviderError;
use cutline_core::models::{EventMeta, ScorePoint};
use serde::{Deserialize, Serialize};

/// Outcome of a source call
pub type SourceResult<T> = Result<Option<T>, ProviderError>;

/// Which top-ranking points feed a peak-speed estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeakSpeedWindow {
    /// Only the first `n` points in response order
    pub max_points: Option<usize>,
    /// Only points at or before this instant (epoch milliseconds)
    pub until_ms: Option<i64>,
}

impl PeakSpeedWindow {
    /// Historical candidate: the first points cover the opening burst
    #[must_use]
    pub const fn candidate() -> Self {
        Self {
            max_points: Some(CANDIDATE_TOP_POINTS_LIMIT),
            until_ms: None,
        }
    }

    /// Target event, optionally frozen at `until_ms`
    #[must_use]
    pub const fn target(until_ms: Option<i64>) -> Self {
        Self {
            max_points: None,
            until_ms,
        }
    }
}

/// One entry of the event catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Event id
    pub event_id: u32,
    /// Category, when the catalog carries one
    pub event_type: Option<String>,
}

/// Schedule of one event on the configured server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    /// Event id
    pub event_id: u32,
    /// Start (epoch milliseconds), if scheduled
    pub start_ts: Option<i64>,
    /// End (epoch milliseconds), if scheduled
    pub end_ts: Option<i64>,
}

/// Read-only access to ranking-event data
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Event metadata for the configured server
    async fn event_meta(&self, event_id: u32) -> SourceResult<EventMeta>;

    /// Cumulative cutoff observations of `tier`
    async fn score_series(&self, event_id: u32, tier: u32) -> SourceResult<Vec<ScorePoint>>;

    /// Peak-speed scale (points per minute) from top-ranking players
    async fn peak_speed(&self, event_id: u32, window: PeakSpeedWindow) -> SourceResult<f64>;

    /// All known events with their categories
    async fn catalog(&self) -> SourceResult<Vec<CatalogEntry>>;

    /// Recently scheduled events
    async fn recent_events(&self) -> SourceResult<Vec<EventWindow>>;
}
