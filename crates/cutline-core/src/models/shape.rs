// ABOUTME: Parameters of the growth + panic-sprint shape curve
// ABOUTME: Conversion to/from solver vectors, averaging and ratio rescaling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use serde::{Deserialize, Serialize};

use crate::constants::shape::{INITIAL_GUESS, PANIC_RATIO_EXPONENT};

/// `(Base, A, B, B_end, T_panic)` of the shape model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeParameters {
    /// Constant baseline (normalized speed)
    pub base: f64,
    /// Linear growth per hour
    pub a: f64,
    /// Quadratic growth per hour squared
    pub b: f64,
    /// Amplitude of the final sprint
    pub b_end: f64,
    /// Length of the sprint window (hours)
    pub t_panic: f64,
}

impl ShapeParameters {
    /// Solver starting point
    pub const INITIAL_GUESS: Self = Self::from_array(INITIAL_GUESS);

    /// Build from `[base, a, b, b_end, t_panic]`
    #[must_use]
    pub const fn from_array(values: [f64; 5]) -> Self {
        Self {
            base: values[0],
            a: values[1],
            b: values[2],
            b_end: values[3],
            t_panic: values[4],
        }
    }

    /// `[base, a, b, b_end, t_panic]`
    #[must_use]
    pub const fn to_array(self) -> [f64; 5] {
        [self.base, self.a, self.b, self.b_end, self.t_panic]
    }

    /// Component-wise mean; `None` for an empty input
    #[must_use]
    pub fn mean<'a>(params: impl IntoIterator<Item = &'a Self>) -> Option<Self> {
        let mut sum = [0.0; 5];
        let mut count = 0_usize;
        for p in params {
            for (acc, value) in sum.iter_mut().zip(p.to_array()) {
                *acc += value;
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Self::from_array(sum.map(|s| s / count as f64)))
    }

    /// Scale magnitude terms by `ratio` (`B_end` by `ratio^1.1`); `T_panic` is kept
    #[must_use]
    pub fn rescaled(self, ratio: f64) -> Self {
        Self {
            base: self.base * ratio,
            a: self.a * ratio,
            b: self.b * ratio,
            b_end: self.b_end * ratio.powf(PANIC_RATIO_EXPONENT),
            t_panic: self.t_panic,
        }
    }

    /// Whether every component is finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}
