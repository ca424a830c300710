// ABOUTME: Growth + panic-sprint shape model and its bounded least-squares fit
// ABOUTME: Fit failures fall back to the initial guess with a non-fatal failure marker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! # Shape Model
//!
//! `y(t) = max(0, Base + A·t + B·t² + rise(t)·blend(t))`
//!
//! - `rise(t) = B_end · sin(n·π/2)^2.5 · clip((n − 0.5)/0.5, 0, 1)^3` with
//!   `n = clip((t − t_sp)/T_panic, 0, 1)` and `t_sp = T_total − T_panic`;
//!   zero for `t ≤ t_sp`
//! - `blend(t)` ramps linearly from 0 at `t_sp − 4` to 1 at `t_sp + T_panic/2`

use std::f64::consts::FRAC_PI_2;

use cutline_core::constants::shape::{
    BLEND_LEAD_HOURS, FOCUS_POWER, LOWER_BOUNDS, MAX_PANIC_HOURS, RISE_POWER, UPPER_BOUNDS,
};
use cutline_core::models::ShapeParameters;
use tracing::debug;

use crate::optimizer::{BoundedLevenbergMarquardt, Bounds, SolverError, SolverSettings};

/// Evaluate the shape at one time (hours since start)
#[must_use]
pub fn shape_value(t: f64, params: &ShapeParameters, total_hours: f64) -> f64 {
    let t_panic = params.t_panic;
    let t_start_panic = total_hours - t_panic;

    let mut rise = 0.0;
    if t > t_start_panic && t_panic > 0.0 {
        let n = ((t - t_start_panic) / t_panic).clamp(0.0, 1.0);
        let base = (n * FRAC_PI_2).sin().powf(RISE_POWER);
        let focus = ((n - 0.5) / 0.5).clamp(0.0, 1.0).powf(FOCUS_POWER);
        rise = params.b_end * base * focus;
    }

    let blend_start = t_start_panic - BLEND_LEAD_HOURS;
    let blend_end = t_start_panic + t_panic / 2.0;
    let blend = ((t - blend_start) / (blend_end - blend_start).max(1e-6)).clamp(0.0, 1.0);

    let growth = params.b.mul_add(t * t, params.a.mul_add(t, params.base));
    rise.mul_add(blend, growth).max(0.0)
}

/// Evaluate the shape over a time grid
#[must_use]
pub fn shape_curve(t_hours: &[f64], params: &ShapeParameters, total_hours: f64) -> Vec<f64> {
    t_hours
        .iter()
        .map(|&t| shape_value(t, params, total_hours))
        .collect()
}

/// Parameter box for an event of `total_hours`
#[must_use]
pub fn fit_bounds(total_hours: f64) -> Bounds<5> {
    let max_panic = MAX_PANIC_HOURS.min(total_hours / 2.0);
    Bounds {
        lower: LOWER_BOUNDS,
        upper: [
            UPPER_BOUNDS[0],
            UPPER_BOUNDS[1],
            UPPER_BOUNDS[2],
            UPPER_BOUNDS[3],
            max_panic,
        ],
    }
}

/// Outcome of fitting one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeFit {
    /// Fitted parameters, or the (clamped) initial guess on failure
    pub params: ShapeParameters,
    /// Solver failure, if any
    pub failure: Option<SolverError>,
}

impl ShapeFit {
    /// Whether the solver converged
    #[must_use]
    pub const fn converged(&self) -> bool {
        self.failure.is_none()
    }
}

/// Fits [`ShapeParameters`] to skeleton samples
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeFitter {
    solver: BoundedLevenbergMarquardt,
}

impl ShapeFitter {
    /// Fitter with explicit solver settings
    #[must_use]
    pub const fn with_settings(settings: SolverSettings) -> Self {
        Self {
            solver: BoundedLevenbergMarquardt::new(settings),
        }
    }

    /// Bounded least-squares fit of `y` against `t` for an event of `total_hours`.
    ///
    /// Never fails: a non-converged fit returns the initial guess (clamped into
    /// the bounds when they are valid) with `failure` set.
    #[must_use]
    pub fn fit(&self, t: &[f64], y: &[f64], total_hours: f64) -> ShapeFit {
        let bounds = fit_bounds(total_hours);
        let x0 = ShapeParameters::INITIAL_GUESS.to_array();
        let residuals = |p: &[f64; 5]| -> Vec<f64> {
            let params = ShapeParameters::from_array(*p);
            t.iter()
                .zip(y)
                .map(|(&ti, &yi)| shape_value(ti, &params, total_hours) - yi)
                .collect()
        };

        match self.solver.solve(residuals, x0, &bounds) {
            Ok(solution) => {
                debug!(
                    iterations = solution.iterations,
                    cost = solution.cost,
                    samples = t.len(),
                    "Shape fit converged"
                );
                ShapeFit {
                    params: ShapeParameters::from_array(solution.x),
                    failure: None,
                }
            }
            Err(failure) => {
                let fallback = if bounds.validate().is_ok() {
                    bounds.clamp(x0)
                } else {
                    x0
                };
                ShapeFit {
                    params: ShapeParameters::from_array(fallback),
                    failure: Some(failure),
                }
            }
        }
    }
}
