// ABOUTME: `config` subcommand: prints the effective runtime and model configuration as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use anyhow::Result;
use cutline::config::RuntimeConfig;
use serde_json::json;

use crate::helpers::overrides::model_config;

pub fn show(runtime: &RuntimeConfig, overrides: &[String]) -> Result<()> {
    let model = model_config(runtime, overrides, false)?;
    let effective = json!({
        "runtime": runtime,
        "model": model,
    });
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}
