// ABOUTME: Tests for environment-driven runtime and model configuration
// ABOUTME: Serialized because they mutate process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use cutline::config::{ConfigError, ForecastConfig, OverridePolicy, RuntimeConfig};
use serial_test::serial;

const RUNTIME_VARS: &[&str] = &[
    "CUTLINE_API_BASE_URL",
    "CUTLINE_SERVER",
    "CUTLINE_TIER",
    "CUTLINE_HTTP_MAX_RETRIES",
    "CUTLINE_CONCURRENCY",
    "CUTLINE_PROFILE_PATH",
    "CUTLINE_CALENDAR_PATH",
    "CUTLINE_TZ_OFFSET",
    "CUTLINE_STRICT_OVERRIDES",
];

const MODEL_VARS: &[&str] = &["CUTLINE_RATIO_MAX", "CUTLINE_SIMILAR_COUNT", "CUTLINE_SCALE_MIN"];

fn clear_env() {
    for var in RUNTIME_VARS.iter().chain(MODEL_VARS) {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_runtime_defaults_without_environment() {
    clear_env();
    let config = RuntimeConfig::from_env().unwrap();
    assert_eq!(config, RuntimeConfig::default());
    assert_eq!(config.override_policy, OverridePolicy::Warn);
}

#[test]
#[serial]
fn test_runtime_reads_environment() {
    clear_env();
    env::set_var("CUTLINE_API_BASE_URL", "http://localhost:9000/api");
    env::set_var("CUTLINE_SERVER", "0");
    env::set_var("CUTLINE_TIER", "2000");
    env::set_var("CUTLINE_HTTP_MAX_RETRIES", "1");
    env::set_var("CUTLINE_CONCURRENCY", "3");
    env::set_var("CUTLINE_PROFILE_PATH", "/tmp/profile.json");
    env::set_var("CUTLINE_CALENDAR_PATH", "  ");
    env::set_var("CUTLINE_TZ_OFFSET", "-5");
    env::set_var("CUTLINE_STRICT_OVERRIDES", "true");

    let config = RuntimeConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.base_url, "http://localhost:9000/api");
    assert_eq!(config.server_index, 0);
    assert_eq!(config.tier, 2000);
    assert_eq!(config.http.max_retries, 1);
    assert_eq!(config.concurrency, 3);
    assert_eq!(config.profile_path, PathBuf::from("/tmp/profile.json"));
    assert_eq!(config.calendar_path, None);
    assert_eq!(config.tz_offset_hours, Some(-5));
    assert_eq!(config.override_policy, OverridePolicy::Reject);
}

#[test]
#[serial]
fn test_runtime_rejects_bad_values() {
    clear_env();
    env::set_var("CUTLINE_CONCURRENCY", "twelve");
    let unparsable = RuntimeConfig::from_env();
    env::set_var("CUTLINE_CONCURRENCY", "12");
    let out_of_range = RuntimeConfig::from_env();
    clear_env();

    let message = unparsable.unwrap_err().to_string();
    assert!(message.contains("CUTLINE_CONCURRENCY"), "{message}");
    assert!(out_of_range.is_err());
}

#[test]
#[serial]
fn test_model_config_reads_prefixed_keys() {
    clear_env();
    env::set_var("CUTLINE_RATIO_MAX", "3.5");
    env::set_var("CUTLINE_SIMILAR_COUNT", "8");
    let config = ForecastConfig::from_environment();
    clear_env();

    let config = config.unwrap();
    assert!((config.ratio_max - 3.5).abs() < f64::EPSILON);
    assert_eq!(config.similar_count, 8);
}

#[test]
#[serial]
fn test_model_config_rejects_garbage() {
    clear_env();
    env::set_var("CUTLINE_SCALE_MIN", "lots");
    let config = ForecastConfig::from_environment();
    clear_env();

    assert!(matches!(config, Err(ConfigError::Parse { .. })));
}

#[test]
#[serial]
fn test_cli_overrides_layer_on_environment() {
    clear_env();
    env::set_var("CUTLINE_RATIO_MAX", "3.5");
    let base = ForecastConfig::from_environment().unwrap();
    clear_env();

    let overrides: BTreeMap<String, f64> = ["similar_count=2", "bogus_knob=1"]
        .iter()
        .map(|pair| ForecastConfig::parse_override(pair).unwrap())
        .collect();

    let lenient = base
        .clone()
        .with_overrides(&overrides, OverridePolicy::Warn)
        .unwrap();
    assert_eq!(lenient.similar_count, 2);
    assert!((lenient.ratio_max - 3.5).abs() < f64::EPSILON);

    let strict = base.with_overrides(&overrides, OverridePolicy::Reject);
    assert!(matches!(strict, Err(ConfigError::UnknownKey(key)) if key == "bogus_knob"));
}
