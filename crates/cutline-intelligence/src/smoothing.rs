// ABOUTME: Three-tier saturating ceiling applied to calibrated normalized speeds
// ABOUTME: Values below the first threshold pass through; a hard cap bounds the output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use cutline_core::config::ForecastConfig;
use cutline_core::constants::forecast::{SMOOTH_ALPHA, SMOOTH_BETA};

/// Soft ceiling on normalized speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CeilingSmoother {
    thresh1: f64,
    thresh2: f64,
    hard_cap: f64,
}

impl CeilingSmoother {
    /// Smoother with explicit thresholds (`0 < thresh1 < thresh2 < hard_cap`)
    #[must_use]
    pub const fn new(thresh1: f64, thresh2: f64, hard_cap: f64) -> Self {
        Self {
            thresh1,
            thresh2,
            hard_cap,
        }
    }

    /// Thresholds from a validated configuration
    #[must_use]
    pub const fn from_config(config: &ForecastConfig) -> Self {
        Self::new(
            config.smooth_thresh1,
            config.smooth_thresh2,
            config.smooth_hard_cap,
        )
    }

    /// Smooth a single value.
    ///
    /// The tier is chosen from the input value: `(t1, t2]` gets the mild
    /// stage, anything above `t2` the quadratic stage.
    ///
    /// Output is non-decreasing in the input only up to
    /// [`quadratic_peak_input`](Self::quadratic_peak_input) (about 0.7246
    /// with the default thresholds). Past that point the quadratic stage
    /// bends back down, so larger inputs can map to smaller outputs.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        let smoothed = if value > self.thresh2 {
            let excess = (value - self.thresh2) / (1.0 - self.thresh2);
            self.thresh2 + (value - self.thresh2) / (SMOOTH_BETA * excess).mul_add(excess, 1.0)
        } else if value > self.thresh1 {
            let excess = (value - self.thresh1) / (self.thresh2 - self.thresh1);
            self.thresh1 + (value - self.thresh1) / SMOOTH_ALPHA.mul_add(excess, 1.0)
        } else {
            value
        };
        smoothed.min(self.hard_cap)
    }

    /// Input above which the quadratic stage starts to bend back down
    #[must_use]
    pub fn quadratic_peak_input(&self) -> f64 {
        self.thresh2 + (1.0 - self.thresh2) / SMOOTH_BETA.sqrt()
    }

    /// Smooth every value
    #[must_use]
    pub fn apply_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.apply(v)).collect()
    }
}

impl Default for CeilingSmoother {
    fn default() -> Self {
        Self::from_config(&ForecastConfig::default())
    }
}
