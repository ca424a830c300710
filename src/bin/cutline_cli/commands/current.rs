// ABOUTME: `current` subcommand: detects the running event from the recent-events feed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use anyhow::{Context, Result};
use chrono::Utc;
use cutline::config::RuntimeConfig;
use cutline::pipeline::http_source;
use cutline::ForecastError;
use cutline_providers::select_current_event;

pub async fn show(runtime: &RuntimeConfig) -> Result<()> {
    let source = http_source(runtime)?;
    let windows = source
        .recent_events()
        .await
        .context("Recent events feed unavailable")?
        .ok_or(ForecastError::EventNotIdentified)?;
    let event_id = select_current_event(&windows, Utc::now().timestamp_millis())
        .ok_or(ForecastError::EventNotIdentified)?;
    println!("{event_id}");
    Ok(())
}
