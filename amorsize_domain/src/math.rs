// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Compensated Summation
//!
//! Numerically careful aggregation for profiling measurements.
//!
//! Per-item compute times are frequently sub-microsecond, so a profile sums
//! tens of values whose magnitudes sit near the bottom of the `f64` range,
//! sometimes mixed with occasional slow outliers ten orders of magnitude
//! larger. Naive left-to-right addition loses low-order bits in exactly that
//! regime, and the loss propagates into the mean, the variance, and finally
//! the speedup prediction. This is a correctness concern, not an
//! optimization.
//!
//! The accumulator here implements Neumaier's variant of Kahan summation: a
//! running compensation term captures the bits the primary sum drops,
//! regardless of which operand is larger. Mean and variance helpers are
//! built on top of it; the variance uses the two-pass formulation so the
//! compensated mean is reused rather than squared away.

/// Running compensated sum (Kahan-Babuska/Neumaier).
///
/// Tracks the rounding error of each addition in a separate compensation
/// term and folds it back in when the total is read. Accurate for inputs
/// whose magnitudes differ by many orders, where a plain `f64` sum visibly
/// drifts.
///
/// # Examples
///
/// ```
/// use amorsize_domain::math::CompensatedSum;
///
/// let mut sum = CompensatedSum::new();
/// for v in [1.0, 1e100, 1.0, -1e100] {
///     sum.add(v);
/// }
/// assert_eq!(sum.value(), 2.0); // naive summation yields 0.0
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one value, tracking the rounding error of the addition.
    pub fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    /// Returns the compensated total.
    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Compensated arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sum = CompensatedSum::new();
    for &v in values {
        sum.add(v);
    }
    sum.value() / (values.len() as f64)
}

/// Compensated population variance (two-pass). Returns 0.0 for fewer than
/// two values.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let mut sum = CompensatedSum::new();
    for &v in values {
        let d = v - avg;
        sum.add(d * d);
    }
    (sum.value() / (values.len() as f64)).max(0.0)
}

/// Compensated population standard deviation.
pub fn population_stddev(values: &[f64]) -> f64 {
    population_variance(values).sqrt()
}

/// Coefficient of variation (stddev / mean).
///
/// Returns 0.0 when the mean is zero or not positive: a workload whose mean
/// cost is immeasurable carries no usable dispersion signal either.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let avg = mean(values);
    if avg <= 0.0 {
        return 0.0;
    }
    population_stddev(values) / avg
}
