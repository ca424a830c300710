// ABOUTME: Forecast tuning configuration with defaults, validated overrides and environment loading
// ABOUTME: Unknown override keys are dropped with a warning or rejected according to OverridePolicy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! # Forecast Configuration
//!
//! [`ForecastConfig`] holds the fifteen numeric knobs of the forecasting
//! model. It is built from defaults, an override map (`key -> value`) or
//! `CUTLINE_<KEY>` environment variables, and is always validated before use.

use std::collections::BTreeMap;
use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Relationship between values violated (e.g. `ratio_min > ratio_max`)
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),

    /// Single value outside its domain
    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),

    /// Override key not recognized under `OverridePolicy::Reject`
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Value could not be parsed as a number
    #[error("Parse error for {key}: {value:?}")]
    Parse {
        /// Key being parsed
        key: String,
        /// Offending raw value
        value: String,
    },
}

/// Handling of override keys that do not name a configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverridePolicy {
    /// Drop unknown keys with a warning
    #[default]
    Warn,
    /// Fail construction on unknown keys
    Reject,
}

/// Every recognized override key
pub const CONFIG_KEYS: [&str; 15] = [
    "weekend_multiplier",
    "panic_scaler",
    "panic_ease_power",
    "similar_count",
    "ratio_min",
    "ratio_max",
    "scale_min",
    "scale_max",
    "t_start_cmp",
    "t_end_cap",
    "corr_min",
    "corr_max",
    "smooth_thresh1",
    "smooth_thresh2",
    "smooth_hard_cap",
];

const ENV_PREFIX: &str = "CUTLINE_";

/// Forecasting model knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Multiplier on every weekend bucket mean
    pub weekend_multiplier: f64,
    /// Minimum seasonal factor reached at the end of the panic window
    pub panic_scaler: f64,
    /// Exponent easing the panic blend
    pub panic_ease_power: f64,
    /// Number of analogue events to collect
    pub similar_count: usize,
    /// Lower clip of the intensity ratio
    pub ratio_min: f64,
    /// Upper clip of the intensity ratio
    pub ratio_max: f64,
    /// Lower clip of the cutoff-to-now scale
    pub scale_min: f64,
    /// Upper clip of the cutoff-to-now scale
    pub scale_max: f64,
    /// Comparison window start (hours)
    pub t_start_cmp: f64,
    /// Comparison window end cap (hours)
    pub t_end_cap: f64,
    /// Lower clip of the backtest correction
    pub corr_min: f64,
    /// Upper clip of the backtest correction
    pub corr_max: f64,
    /// Below this normalized speed the smoother is the identity
    pub smooth_thresh1: f64,
    /// Start of the strong smoothing stage
    pub smooth_thresh2: f64,
    /// Absolute ceiling of the smoothed speed
    pub smooth_hard_cap: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            weekend_multiplier: 1.1,
            panic_scaler: 1.1,
            panic_ease_power: 1.0,
            similar_count: 5,
            ratio_min: 0.25,
            ratio_max: 4.0,
            scale_min: 0.5,
            scale_max: 2.0,
            t_start_cmp: 6.0,
            t_end_cap: 72.0,
            corr_min: 0.6,
            corr_max: 1.6,
            smooth_thresh1: 0.5,
            smooth_thresh2: 0.65,
            smooth_hard_cap: 0.8,
        }
    }
}

impl ForecastConfig {
    /// Defaults with `overrides` applied, then validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for an unknown key under
    /// [`OverridePolicy::Reject`], and a range error when any resulting value
    /// is invalid.
    pub fn from_overrides(
        overrides: &BTreeMap<String, f64>,
        policy: OverridePolicy,
    ) -> Result<Self, ConfigError> {
        Self::default().with_overrides(overrides, policy)
    }

    /// This configuration with `overrides` applied, then validated.
    ///
    /// # Errors
    ///
    /// Same as [`ForecastConfig::from_overrides`].
    pub fn with_overrides(
        mut self,
        overrides: &BTreeMap<String, f64>,
        policy: OverridePolicy,
    ) -> Result<Self, ConfigError> {
        for (key, value) in overrides {
            if self.set(key, *value)? {
                continue;
            }
            match policy {
                OverridePolicy::Warn => {
                    warn!(key = %key, "Ignoring unknown forecast configuration key");
                }
                OverridePolicy::Reject => return Err(ConfigError::UnknownKey(key.clone())),
            }
        }
        self.validate()?;
        Ok(self)
    }

    /// Defaults overridden by `CUTLINE_<KEY>` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for a non-numeric variable and a range
    /// error when any resulting value is invalid.
    pub fn from_environment() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in CONFIG_KEYS {
            let var = format!("{ENV_PREFIX}{}", key.to_uppercase());
            let Ok(raw) = env::var(&var) else {
                continue;
            };
            let value: f64 = raw.trim().parse().map_err(|_| ConfigError::Parse {
                key: var.clone(),
                value: raw.clone(),
            })?;
            config.set(key, value)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a `key=value` override pair
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the pair has no `=` or the value is not numeric.
    pub fn parse_override(pair: &str) -> Result<(String, f64), ConfigError> {
        let parse_error = || ConfigError::Parse {
            key: pair.to_owned(),
            value: pair.to_owned(),
        };
        let (key, value) = pair.split_once('=').ok_or_else(parse_error)?;
        let value = value.trim().parse::<f64>().map_err(|_| parse_error())?;
        Ok((key.trim().to_owned(), value))
    }

    /// Assign a named field. Returns `false` when the key is unknown.
    fn set(&mut self, key: &str, value: f64) -> Result<bool, ConfigError> {
        let slot = match key {
            "weekend_multiplier" => &mut self.weekend_multiplier,
            "panic_scaler" => &mut self.panic_scaler,
            "panic_ease_power" => &mut self.panic_ease_power,
            "similar_count" => {
                if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
                    return Err(ConfigError::ValueOutOfRange(
                        "similar_count must be a positive integer",
                    ));
                }
                self.similar_count = value as usize;
                return Ok(true);
            }
            "ratio_min" => &mut self.ratio_min,
            "ratio_max" => &mut self.ratio_max,
            "scale_min" => &mut self.scale_min,
            "scale_max" => &mut self.scale_max,
            "t_start_cmp" => &mut self.t_start_cmp,
            "t_end_cap" => &mut self.t_end_cap,
            "corr_min" => &mut self.corr_min,
            "corr_max" => &mut self.corr_max,
            "smooth_thresh1" => &mut self.smooth_thresh1,
            "smooth_thresh2" => &mut self.smooth_thresh2,
            "smooth_hard_cap" => &mut self.smooth_hard_cap,
            _ => return Ok(false),
        };
        *slot = value;
        Ok(true)
    }

    /// Check every value and relationship.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            (self.weekend_multiplier, "weekend_multiplier must be positive"),
            (self.panic_scaler, "panic_scaler must be positive"),
            (self.panic_ease_power, "panic_ease_power must be positive"),
            (self.ratio_min, "ratio_min must be positive"),
            (self.scale_min, "scale_min must be positive"),
            (self.corr_min, "corr_min must be positive"),
            (self.t_end_cap, "t_end_cap must be positive"),
            (self.smooth_thresh1, "smooth_thresh1 must be positive"),
        ];
        for (value, message) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::ValueOutOfRange(message));
            }
        }
        if self.similar_count == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "similar_count must be at least 1",
            ));
        }
        if !self.t_start_cmp.is_finite() || self.t_start_cmp < 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "t_start_cmp must be non-negative",
            ));
        }

        let ordered = [
            (self.ratio_min, self.ratio_max, "ratio_min must be <= ratio_max"),
            (self.scale_min, self.scale_max, "scale_min must be <= scale_max"),
            (self.corr_min, self.corr_max, "corr_min must be <= corr_max"),
        ];
        for (low, high, message) in ordered {
            if !high.is_finite() || low > high {
                return Err(ConfigError::InvalidRange(message));
            }
        }
        if self.t_start_cmp >= self.t_end_cap {
            return Err(ConfigError::InvalidRange(
                "t_start_cmp must be < t_end_cap",
            ));
        }
        if !(self.smooth_thresh1 < self.smooth_thresh2
            && self.smooth_thresh2 < self.smooth_hard_cap
            && self.smooth_hard_cap <= 1.0)
        {
            return Err(ConfigError::InvalidRange(
                "smoothing requires thresh1 < thresh2 < hard_cap <= 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(ForecastConfig::default().validate().is_ok());
    }

    #[test]
    fn test_known_override_applied() {
        let config = ForecastConfig::from_overrides(
            &overrides(&[("ratio_max", 3.0), ("similar_count", 8.0)]),
            OverridePolicy::Reject,
        )
        .unwrap();
        assert!((config.ratio_max - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.similar_count, 8);
    }

    #[test]
    fn test_unknown_key_policy() {
        let map = overrides(&[("ratio_maxx", 3.0)]);
        let warned = ForecastConfig::from_overrides(&map, OverridePolicy::Warn).unwrap();
        assert_eq!(warned, ForecastConfig::default());

        let rejected = ForecastConfig::from_overrides(&map, OverridePolicy::Reject);
        assert_eq!(rejected, Err(ConfigError::UnknownKey("ratio_maxx".into())));
    }

    #[test]
    fn test_out_of_range_always_fails() {
        let map = overrides(&[("ratio_min", 5.0)]);
        assert!(ForecastConfig::from_overrides(&map, OverridePolicy::Warn).is_err());

        let map = overrides(&[("smooth_hard_cap", 1.2)]);
        assert!(ForecastConfig::from_overrides(&map, OverridePolicy::Warn).is_err());

        let map = overrides(&[("similar_count", 2.5)]);
        assert!(ForecastConfig::from_overrides(&map, OverridePolicy::Warn).is_err());
    }

    #[test]
    fn test_with_overrides_keeps_base_values() {
        let base = ForecastConfig {
            corr_max: 1.5,
            ..ForecastConfig::default()
        };
        let config = base
            .with_overrides(&overrides(&[("corr_min", 0.7)]), OverridePolicy::Reject)
            .unwrap();
        assert!((config.corr_max - 1.5).abs() < f64::EPSILON);
        assert!((config.corr_min - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_override_pair() {
        assert_eq!(
            ForecastConfig::parse_override("corr_max = 1.4").unwrap(),
            ("corr_max".to_owned(), 1.4)
        );
        assert!(ForecastConfig::parse_override("corr_max").is_err());
        assert!(ForecastConfig::parse_override("corr_max=high").is_err());
    }
}
