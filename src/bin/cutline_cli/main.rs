// ABOUTME: Cutline CLI - forecasts tier cutoffs and maintains the seasonality profile
// ABOUTME: Parses arguments, initializes logging and runtime configuration, dispatches subcommands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting
//!
//! Usage:
//! ```bash
//! # Forecast the current event's T1000 line
//! cutline-cli forecast
//!
//! # Forecast a given event and tier, overriding model knobs
//! cutline-cli forecast --event 231 --tier 2000 --set ratio_max=3.0 --set similar_count=8
//!
//! # Backtest: pretend only the first 96 hours were observed
//! cutline-cli forecast --event 220 --freeze-hours 96
//!
//! # Rebuild the seasonality profile from events 200..=299
//! cutline-cli profile build --from 200 --to 299
//!
//! # Show which event is running right now
//! cutline-cli current
//!
//! # Print the effective configuration
//! cutline-cli config
//! ```

mod commands;
mod helpers;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use cutline::config::RuntimeConfig;
use cutline::logging::LoggingConfig;

#[derive(Parser)]
#[command(
    name = "cutline-cli",
    version,
    about = "Tier-cutoff score forecaster for ranking events",
    long_about = "Forecasts the final score of a ranking tier cutoff from the event's partial progress and comparable past events."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

/// Flags overriding `CUTLINE_*` environment settings
#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// API base URL override
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Server index override
    #[arg(long, global = true)]
    server: Option<usize>,

    /// Concurrent candidate loads (1-8)
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Seasonality profile path
    #[arg(long, global = true)]
    profile_path: Option<PathBuf>,

    /// Holiday calendar path
    #[arg(long, global = true)]
    calendar: Option<PathBuf>,

    /// Output directory for artifacts
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Local timezone offset in hours (detected per event when omitted)
    #[arg(long, global = true, allow_negative_numbers = true)]
    tz_offset: Option<i32>,
}

impl GlobalArgs {
    fn apply(self, runtime: &mut RuntimeConfig) {
        if let Some(base_url) = self.base_url {
            runtime.base_url = base_url;
        }
        if let Some(server) = self.server {
            runtime.server_index = server;
        }
        if let Some(concurrency) = self.concurrency {
            runtime.concurrency = concurrency;
        }
        if let Some(profile_path) = self.profile_path {
            runtime.profile_path = profile_path;
        }
        if self.calendar.is_some() {
            runtime.calendar_path = self.calendar;
        }
        if let Some(output_dir) = self.output_dir {
            runtime.output_dir = output_dir;
        }
        if self.tz_offset.is_some() {
            runtime.tz_offset_hours = self.tz_offset;
        }
    }
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Forecast the final cutoff score of an event
    Forecast {
        /// Event id (defaults to the currently running event)
        #[arg(long)]
        event: Option<u32>,

        /// Tier to forecast (defaults to CUTLINE_TIER or 1000)
        #[arg(long)]
        tier: Option<u32>,

        /// Withhold observations after this many hours from the nominal start
        #[arg(long)]
        freeze_hours: Option<f64>,

        /// Model override as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,

        /// Reject unknown override keys instead of ignoring them
        #[arg(long)]
        strict: bool,

        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Do not write the artifact file
        #[arg(long)]
        no_artifact: bool,
    },

    /// Seasonality profile maintenance
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },

    /// Show the currently running event
    Current,

    /// Print the effective runtime and model configuration
    Config {
        /// Model override as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum ProfileCommand {
    /// Build the profile from a range of past events
    Build {
        /// First event id
        #[arg(long)]
        from: u32,

        /// Last event id (inclusive)
        #[arg(long)]
        to: u32,

        /// Tier whose series feeds the profile
        #[arg(long)]
        tier: Option<u32>,

        /// Pause between events in milliseconds
        #[arg(long, default_value = "500")]
        pause_ms: u64,

        /// Output path (defaults to the configured profile path)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env();
    let logging = if cli.verbose { logging.verbose() } else { logging };
    logging.init()?;

    let mut runtime = RuntimeConfig::from_env()?;
    cli.global.apply(&mut runtime);
    runtime.validate()?;
    runtime.log_summary();

    match cli.command {
        Command::Forecast {
            event,
            tier,
            freeze_hours,
            overrides,
            strict,
            json,
            no_artifact,
        } => {
            let options = commands::forecast::ForecastOptions {
                event,
                tier: tier.unwrap_or(runtime.tier),
                freeze_hours,
                overrides,
                strict,
                json,
                write_artifact: !no_artifact,
            };
            commands::forecast::run(&runtime, &options).await?;
        }
        Command::Profile { action } => match action {
            ProfileCommand::Build {
                from,
                to,
                tier,
                pause_ms,
                out,
            } => {
                commands::profile::build(
                    &runtime,
                    from..=to,
                    tier.unwrap_or(runtime.tier),
                    pause_ms,
                    out,
                )
                .await?;
            }
        },
        Command::Current => commands::current::show(&runtime).await?,
        Command::Config { overrides } => commands::config::show(&runtime, &overrides)?,
    }

    Ok(())
}
