// ABOUTME: Async forecast runner wiring the event source, candidate selector and forecast engine
// ABOUTME: Resolves the current event when none is given and maps missing target data to ForecastError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! # Forecast Runner
//!
//! The only async part of a forecast: resolve the event, load the target and
//! the candidates, then hand everything to the pure [`ForecastEngine`].

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use cutline_core::config::ForecastConfig;
use cutline_core::errors::{ForecastError, ForecastResult};
use cutline_core::models::{CutoffArtifact, ForecastReport};
use cutline_intelligence::calendar::{WeekendRule, WorkdayCalendar};
use cutline_intelligence::{ForecastEngine, ForecastInput};
use cutline_providers::{select_current_event, EventSource, HttpEventSource, TrackerClient};
use tracing::{info, instrument, warn};

use crate::candidates::CandidateSelector;
use crate::config::RuntimeConfig;
use crate::storage;
use crate::target::load_target;

/// What to forecast
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    /// Target event; the current event is detected when absent
    pub event_id: Option<u32>,
    /// Tier to forecast
    pub tier: u32,
    /// Withhold observations later than this many hours after the nominal start
    pub freeze_hours: Option<f64>,
    /// Local offset override
    pub tz_offset_hours: Option<i32>,
}

/// Result of a forecast run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    /// Full diagnostics
    pub report: ForecastReport,
    /// JSON artifact derived from the curve
    pub artifact: CutoffArtifact,
}

/// Async front of the forecast engine
pub struct ForecastRunner {
    source: Arc<dyn EventSource>,
    engine: ForecastEngine,
    concurrency: usize,
}

impl ForecastRunner {
    /// Runner over an event source and a configured engine
    #[must_use]
    pub fn new(source: Arc<dyn EventSource>, engine: ForecastEngine, concurrency: usize) -> Self {
        Self {
            source,
            engine,
            concurrency,
        }
    }

    /// Engine used by this runner
    #[must_use]
    pub const fn engine(&self) -> &ForecastEngine {
        &self.engine
    }

    /// Event id to forecast: the requested one, or the current one at `now_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::EventNotIdentified`] when the recent-events
    /// feed is unavailable or names no usable event.
    pub async fn resolve_event(&self, requested: Option<u32>, now_ms: i64) -> ForecastResult<u32> {
        if let Some(event_id) = requested {
            return Ok(event_id);
        }
        let windows = match self.source.recent_events().await {
            Ok(Some(windows)) => windows,
            Ok(None) => return Err(ForecastError::EventNotIdentified),
            Err(e) => {
                warn!(error = %e, "Recent events feed unavailable");
                return Err(ForecastError::EventNotIdentified);
            }
        };
        let event_id =
            select_current_event(&windows, now_ms).ok_or(ForecastError::EventNotIdentified)?;
        info!(event_id, "Current event detected");
        Ok(event_id)
    }

    /// Load data and run the forecast.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::EventNotIdentified`] when no event is given
    /// and none can be detected, and [`ForecastError::DataUnavailable`] when
    /// target data is missing.
    #[instrument(skip(self), fields(tier = request.tier))]
    pub async fn run(&self, request: &ForecastRequest) -> ForecastResult<ForecastOutcome> {
        let event_id = self
            .resolve_event(request.event_id, Utc::now().timestamp_millis())
            .await?;
        let target =
            load_target(self.source.as_ref(), event_id, request.tier, request.freeze_hours).await?;

        let selector = CandidateSelector::new(
            Arc::clone(&self.source),
            request.tier,
            self.concurrency,
            self.engine.config().similar_count,
        );
        let candidates = selector.select(&target.meta).await;

        let input = ForecastInput {
            tier: request.tier,
            target: target.meta,
            observed: target.series.observed,
            withheld: target.series.withheld,
            target_scale: target.scale,
            candidates,
            tz_offset_hours: request.tz_offset_hours,
        };
        let report = self.engine.run(&input)?;
        let artifact = CutoffArtifact::from_curve(&report.curve);
        Ok(ForecastOutcome { report, artifact })
    }
}

/// HTTP event source from runtime settings
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed
pub fn http_source(runtime: &RuntimeConfig) -> Result<Arc<dyn EventSource>> {
    let client = TrackerClient::new(runtime.base_url.clone(), runtime.http.client_config())?;
    Ok(Arc::new(HttpEventSource::new(
        Arc::new(client),
        runtime.server_index,
    )))
}

/// Workday calendar from runtime settings; the plain weekend rule when none is configured
///
/// # Errors
///
/// Returns an error if the configured calendar cannot be loaded
pub async fn workday_calendar(runtime: &RuntimeConfig) -> Result<Arc<dyn WorkdayCalendar>> {
    match &runtime.calendar_path {
        Some(path) => Ok(Arc::new(storage::load_calendar(path).await?)),
        None => Ok(Arc::new(WeekendRule)),
    }
}

/// Runner over the HTTP source with the stored profile and calendar
///
/// # Errors
///
/// Returns an error if the client, profile or calendar cannot be set up
pub async fn build_runner(runtime: &RuntimeConfig, config: ForecastConfig) -> Result<ForecastRunner> {
    let source = http_source(runtime)?;
    let profile = storage::load_profile(&runtime.profile_path).await?;
    let calendar = workday_calendar(runtime).await?;
    let engine = ForecastEngine::new(config, &profile, calendar);
    Ok(ForecastRunner::new(source, engine, runtime.concurrency))
}
