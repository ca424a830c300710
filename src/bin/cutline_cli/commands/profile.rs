// ABOUTME: `profile build` subcommand: aggregates past events into the seasonality profile
// ABOUTME: Writes to --out or the configured profile path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use cutline::config::RuntimeConfig;
use cutline::pipeline::{http_source, workday_calendar};
use cutline::profile::build_profile;
use cutline::storage;

pub async fn build(
    runtime: &RuntimeConfig,
    event_ids: RangeInclusive<u32>,
    tier: u32,
    pause_ms: u64,
    out: Option<PathBuf>,
) -> Result<()> {
    if event_ids.is_empty() {
        bail!(
            "Empty event range {}..={}",
            event_ids.start(),
            event_ids.end()
        );
    }
    let source = http_source(runtime)?;
    let calendar = workday_calendar(runtime).await?;

    println!(
        "Building seasonality profile from events {}..={} (T{tier})",
        event_ids.start(),
        event_ids.end()
    );
    let outcome = build_profile(
        source.as_ref(),
        event_ids,
        tier,
        calendar,
        Duration::from_millis(pause_ms),
    )
    .await;

    if outcome.events_used == 0 {
        bail!(
            "No usable events among {} scanned, profile not written",
            outcome.events_scanned
        );
    }

    let path = out.unwrap_or_else(|| runtime.profile_path.clone());
    storage::save_profile(&path, &outcome.profile).await?;
    println!(
        "Profile written to {} ({} of {} events used)",
        path.display(),
        outcome.events_used,
        outcome.events_scanned
    );
    Ok(())
}
