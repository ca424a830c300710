// ABOUTME: Builds the forecast model configuration from the environment plus --set overrides
// ABOUTME: --strict or CUTLINE_STRICT_OVERRIDES turns unknown keys into errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use std::collections::BTreeMap;

use anyhow::Result;
use cutline::config::{ForecastConfig, OverridePolicy, RuntimeConfig};

/// Model configuration for this invocation
pub fn model_config(
    runtime: &RuntimeConfig,
    pairs: &[String],
    strict: bool,
) -> Result<ForecastConfig> {
    let overrides = pairs
        .iter()
        .map(|pair| ForecastConfig::parse_override(pair))
        .collect::<Result<BTreeMap<String, f64>, _>>()?;
    let policy = if strict {
        OverridePolicy::Reject
    } else {
        runtime.override_policy
    };
    Ok(ForecastConfig::from_environment()?.with_overrides(&overrides, policy)?)
}
