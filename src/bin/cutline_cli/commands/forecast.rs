// ABOUTME: `forecast` subcommand: runs the forecast for an event and tier
// ABOUTME: Prints a summary or the JSON report and writes the cutoff artifact
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use anyhow::Result;
use cutline::config::RuntimeConfig;
use cutline::pipeline::build_runner;
use cutline::storage;
use cutline::ForecastRequest;
use tracing::info;

use crate::helpers::display::display_forecast;
use crate::helpers::overrides::model_config;

/// Flags of the `forecast` subcommand
pub struct ForecastOptions {
    pub event: Option<u32>,
    pub tier: u32,
    pub freeze_hours: Option<f64>,
    pub overrides: Vec<String>,
    pub strict: bool,
    pub json: bool,
    pub write_artifact: bool,
}

pub async fn run(runtime: &RuntimeConfig, options: &ForecastOptions) -> Result<()> {
    let config = model_config(runtime, &options.overrides, options.strict)?;
    let runner = build_runner(runtime, config).await?;

    let request = ForecastRequest {
        event_id: options.event,
        tier: options.tier,
        freeze_hours: options.freeze_hours,
        tz_offset_hours: runtime.tz_offset_hours,
    };
    let outcome = runner.run(&request).await?;

    info!(
        event_id = outcome.report.event_id,
        tier = outcome.report.tier,
        predicted_final = outcome.report.predicted_final,
        "Forecast complete"
    );

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    } else {
        display_forecast(&outcome);
    }

    if options.write_artifact {
        let path = storage::write_artifact(
            &runtime.output_dir,
            outcome.report.event_id,
            outcome.report.tier,
            &outcome.artifact,
        )
        .await?;
        if !options.json {
            println!("\nArtifact written to {}", path.display());
        }
    }
    Ok(())
}
