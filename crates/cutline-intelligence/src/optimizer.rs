// ABOUTME: Bounded nonlinear least squares via projected Levenberg-Marquardt
// ABOUTME: Works in box-normalized coordinates with a forward-difference Jacobian and an iteration budget
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! # Bounded Levenberg-Marquardt
//!
//! Minimizes `0.5 * sum(r_i(x)^2)` subject to `lower <= x <= upper`.
//!
//! Parameters are mapped to the unit box `u = (x - lower) / (upper - lower)`
//! so every coordinate shares a common step scale. Each trial step solves
//! `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr` with `nalgebra` (Cholesky, LU fallback)
//! and is projected back onto `[0, 1]`.
//! Accepted steps shrink `λ` by 10, rejected steps grow it by 10.
//!
//! Termination:
//! - relative cost decrease below `ftol`, step below `xtol`, or projected
//!   gradient below `gtol`: converged
//! - `λ` exceeding [`SolverSettings::max_damping`]: no descent direction left,
//!   treated as converged at the current point
//! - iteration budget exhausted or non-finite initial cost: failure

use std::array;

use nalgebra::{DMatrix, DVector, SVector};
use thiserror::Error;

/// Why the solver gave up
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// Some lower bound is not strictly below its upper bound
    #[error("Infeasible bounds for parameter {index}: [{lower}, {upper}]")]
    InfeasibleBounds {
        /// Parameter index
        index: usize,
        /// Lower bound
        lower: f64,
        /// Upper bound
        upper: f64,
    },
    /// Residuals at the starting point are not finite
    #[error("Non-finite cost at the starting point")]
    NonFiniteCost,
    /// No convergence within the iteration budget
    #[error("No convergence after {iterations} iterations")]
    IterationBudgetExhausted {
        /// Iterations performed
        iterations: usize,
    },
    /// No residuals to fit
    #[error("Empty residual vector")]
    EmptyProblem,
}

/// Tolerances and limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Maximum number of outer iterations
    pub max_iterations: usize,
    /// Relative cost-decrease tolerance
    pub ftol: f64,
    /// Relative step tolerance (unit-box coordinates)
    pub xtol: f64,
    /// Projected-gradient tolerance
    pub gtol: f64,
    /// Initial damping
    pub initial_damping: f64,
    /// Damping above which the current point is accepted as final
    pub max_damping: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 2_000,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-12,
            initial_damping: 1e-3,
            max_damping: 1e10,
        }
    }
}

/// Converged solution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution<const N: usize> {
    /// Parameters within the bounds
    pub x: [f64; N],
    /// `0.5 * sum(r^2)` at `x`
    pub cost: f64,
    /// Outer iterations used
    pub iterations: usize,
}

/// Box constraints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<const N: usize> {
    /// Lower bounds
    pub lower: [f64; N],
    /// Upper bounds
    pub upper: [f64; N],
}

impl<const N: usize> Bounds<N> {
    /// Check that every interval is finite and non-empty
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InfeasibleBounds`] for the first bad interval.
    pub fn validate(&self) -> Result<(), SolverError> {
        for index in 0..N {
            let (lower, upper) = (self.lower[index], self.upper[index]);
            if !(lower.is_finite() && upper.is_finite() && lower < upper) {
                return Err(SolverError::InfeasibleBounds {
                    index,
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }

    /// Clamp a point into the box
    #[must_use]
    pub fn clamp(&self, x: [f64; N]) -> [f64; N] {
        array::from_fn(|i| x[i].clamp(self.lower[i], self.upper[i]))
    }

    fn to_unit(&self, x: &[f64; N]) -> [f64; N] {
        array::from_fn(|i| {
            ((x[i] - self.lower[i]) / (self.upper[i] - self.lower[i])).clamp(0.0, 1.0)
        })
    }

    fn from_unit(&self, u: &[f64; N]) -> [f64; N] {
        array::from_fn(|i| (self.upper[i] - self.lower[i]).mul_add(u[i], self.lower[i]))
    }
}

/// Projected Levenberg-Marquardt solver
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedLevenbergMarquardt {
    settings: SolverSettings,
}

impl BoundedLevenbergMarquardt {
    /// Solver with explicit settings
    #[must_use]
    pub const fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    /// Minimize the residuals returned by `residuals` within `bounds`, starting at `x0`.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] when the bounds are infeasible, the starting
    /// cost is not finite, or the iteration budget runs out.
    pub fn solve<const N: usize, F>(
        &self,
        residuals: F,
        x0: [f64; N],
        bounds: &Bounds<N>,
    ) -> Result<Solution<N>, SolverError>
    where
        F: Fn(&[f64; N]) -> Vec<f64>,
    {
        bounds.validate()?;
        let eval = |u: &[f64; N]| residuals(&bounds.from_unit(u));

        let mut u = bounds.to_unit(&bounds.clamp(x0));
        let mut r = DVector::from_vec(eval(&u));
        if r.is_empty() {
            return Err(SolverError::EmptyProblem);
        }
        let mut cost = 0.5 * r.norm_squared();
        if !cost.is_finite() {
            return Err(SolverError::NonFiniteCost);
        }

        let mut damping = self.settings.initial_damping;
        for iteration in 1..=self.settings.max_iterations {
            let jacobian = forward_jacobian(&eval, &u, &r);
            let normal = jacobian.tr_mul(&jacobian);
            let gradient = jacobian.tr_mul(&r);

            if projected_gradient_norm(&u, gradient.as_slice()) <= self.settings.gtol {
                return Ok(solution(bounds, &u, cost, iteration));
            }

            loop {
                let Some(step) = damped_step(&normal, &gradient, damping) else {
                    damping *= 10.0;
                    if damping > self.settings.max_damping {
                        return Ok(solution(bounds, &u, cost, iteration));
                    }
                    continue;
                };
                let trial: [f64; N] = array::from_fn(|i| (u[i] + step[i]).clamp(0.0, 1.0));
                let trial_r = DVector::from_vec(eval(&trial));
                let trial_cost = 0.5 * trial_r.norm_squared();

                if trial_cost.is_finite() && trial_cost < cost {
                    let decrease = cost - trial_cost;
                    let current = SVector::from(u);
                    let moved = (SVector::from(trial) - current).norm();
                    let size = current.norm();
                    u = trial;
                    r = trial_r;
                    cost = trial_cost;
                    damping = (damping / 10.0).max(1e-12);
                    if decrease <= self.settings.ftol * cost.max(f64::MIN_POSITIVE)
                        || moved <= self.settings.xtol * (self.settings.xtol + size)
                    {
                        return Ok(solution(bounds, &u, cost, iteration));
                    }
                    break;
                }

                damping *= 10.0;
                if damping > self.settings.max_damping {
                    return Ok(solution(bounds, &u, cost, iteration));
                }
            }
        }

        Err(SolverError::IterationBudgetExhausted {
            iterations: self.settings.max_iterations,
        })
    }
}

fn solution<const N: usize>(
    bounds: &Bounds<N>,
    u: &[f64; N],
    cost: f64,
    iterations: usize,
) -> Solution<N> {
    Solution {
        x: bounds.from_unit(u),
        cost,
        iterations,
    }
}

/// `m x N` Jacobian in unit coordinates; steps stay inside `[0, 1]`
fn forward_jacobian<const N: usize, E>(eval: &E, u: &[f64; N], r: &DVector<f64>) -> DMatrix<f64>
where
    E: Fn(&[f64; N]) -> Vec<f64>,
{
    let eps = f64::EPSILON.sqrt();
    let mut jacobian = DMatrix::zeros(r.len(), N);
    for (j, &uj) in u.iter().enumerate() {
        let h = eps * uj.abs().max(1.0);
        let signed_h = if uj + h > 1.0 { -h } else { h };
        let mut shifted = *u;
        shifted[j] += signed_h;
        let r_shift = eval(&shifted);
        for (i, base) in r.iter().enumerate() {
            let moved = r_shift.get(i).copied().unwrap_or(f64::NAN);
            let d = (moved - base) / signed_h;
            if d.is_finite() {
                jacobian[(i, j)] = d;
            }
        }
    }
    jacobian
}

/// Gradient norm ignoring components pushing against an active bound
fn projected_gradient_norm(u: &[f64], gradient: &[f64]) -> f64 {
    u.iter()
        .zip(gradient)
        .map(|(&ui, &g)| {
            let blocked = (ui <= 0.0 && g > 0.0) || (ui >= 1.0 && g < 0.0);
            if blocked {
                0.0
            } else {
                g.abs()
            }
        })
        .fold(0.0, f64::max)
}

/// Solve `(A + λ·diag(A)) δ = -g`, Cholesky first and LU when `A` is not positive definite
fn damped_step(
    normal: &DMatrix<f64>,
    gradient: &DVector<f64>,
    damping: f64,
) -> Option<DVector<f64>> {
    let mut system = normal.clone();
    for i in 0..system.nrows() {
        let diagonal = system[(i, i)];
        system[(i, i)] += damping * diagonal.max(1e-12);
    }
    let rhs = -gradient;
    let step = system.clone().cholesky().map_or_else(
        || system.lu().solve(&rhs),
        |factor| Some(factor.solve(&rhs)),
    )?;
    step.iter().all(|v| v.is_finite()).then_some(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_a_line_exactly() {
        let t: Vec<f64> = (0..20).map(f64::from).collect();
        let y: Vec<f64> = t.iter().map(|x| 2.0f64.mul_add(*x, 1.0)).collect();
        let residuals = |p: &[f64; 2]| -> Vec<f64> {
            t.iter()
                .zip(&y)
                .map(|(x, yi)| p[1].mul_add(*x, p[0]) - yi)
                .collect()
        };
        let bounds = Bounds {
            lower: [-10.0, -10.0],
            upper: [10.0, 10.0],
        };
        let solution = BoundedLevenbergMarquardt::default()
            .solve(residuals, [0.0, 0.0], &bounds)
            .unwrap();
        assert!((solution.x[0] - 1.0).abs() < 1e-5);
        assert!((solution.x[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_respects_active_bound() {
        // Unconstrained optimum at 5, upper bound at 3
        let residuals = |p: &[f64; 1]| vec![p[0] - 5.0];
        let bounds = Bounds {
            lower: [0.0],
            upper: [3.0],
        };
        let solution = BoundedLevenbergMarquardt::default()
            .solve(residuals, [1.0], &bounds)
            .unwrap();
        assert!((solution.x[0] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fits_exponential_decay() {
        let t: Vec<f64> = (0..30).map(f64::from).collect();
        let y: Vec<f64> = t.iter().map(|x| 3.0 * (-0.2 * x).exp()).collect();
        let residuals = |p: &[f64; 2]| -> Vec<f64> {
            t.iter()
                .zip(&y)
                .map(|(x, yi)| p[0].mul_add((-p[1] * x).exp(), -yi))
                .collect()
        };
        let bounds = Bounds {
            lower: [0.0, 0.0],
            upper: [10.0, 2.0],
        };
        let solution = BoundedLevenbergMarquardt::default()
            .solve(residuals, [1.0, 1.0], &bounds)
            .unwrap();
        assert!((solution.x[0] - 3.0).abs() < 1e-4);
        assert!((solution.x[1] - 0.2).abs() < 1e-4);
        assert!(solution.cost < 1e-6);
    }

    #[test]
    fn test_damped_step_solves_indefinite_system_with_lu() {
        // Not positive definite, so Cholesky fails and LU takes over
        let normal = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let gradient = DVector::from_vec(vec![-3.0, -3.0]);
        assert!(normal.clone().cholesky().is_none());
        let step = damped_step(&normal, &gradient, 0.0).unwrap();
        assert!((step[0] - 1.0).abs() < 1e-12);
        assert!((step[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_damped_step_uses_cholesky_for_positive_definite_system() {
        let normal = DMatrix::from_row_slice(2, 2, &[4.0, 0.0, 0.0, 2.0]);
        let gradient = DVector::from_vec(vec![-8.0, 2.0]);
        // Damping scales the diagonal: (4 * 1.5) δ0 = 8, (2 * 1.5) δ1 = -2
        let step = damped_step(&normal, &gradient, 0.5).unwrap();
        assert!((step[0] - 8.0 / 6.0).abs() < 1e-12);
        assert!((step[1] + 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_infeasible_bounds_rejected() {
        let residuals = |p: &[f64; 1]| vec![p[0]];
        let bounds = Bounds {
            lower: [6.0],
            upper: [4.0],
        };
        assert!(matches!(
            BoundedLevenbergMarquardt::default().solve(residuals, [5.0], &bounds),
            Err(SolverError::InfeasibleBounds { index: 0, .. })
        ));
    }

    #[test]
    fn test_non_finite_start_rejected() {
        let residuals = |_: &[f64; 1]| vec![f64::NAN];
        let bounds = Bounds {
            lower: [0.0],
            upper: [1.0],
        };
        assert_eq!(
            BoundedLevenbergMarquardt::default().solve(residuals, [0.5], &bounds),
            Err(SolverError::NonFiniteCost)
        );
    }

    #[test]
    fn test_budget_exhaustion_reported() {
        let settings = SolverSettings {
            max_iterations: 1,
            ftol: 0.0,
            xtol: 0.0,
            gtol: 0.0,
            ..SolverSettings::default()
        };
        let residuals = |p: &[f64; 1]| vec![p[0].powi(3) - 0.2, p[0] - 0.3];
        let bounds = Bounds {
            lower: [-1.0],
            upper: [1.0],
        };
        assert!(matches!(
            BoundedLevenbergMarquardt::new(settings).solve(residuals, [0.9], &bounds),
            Err(SolverError::IterationBudgetExhausted { iterations: 1 })
        ));
    }
}
