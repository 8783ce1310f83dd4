// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Workload Profile Entity
//!
//! The aggregate of a profiling run: robust per-item cost means, an output
//! size estimate, and a heterogeneity indicator. A profile lives only
//! within a single planning call - it is never cached, because the decision
//! derived from it is the durable artifact.
//!
//! ## Aggregation Rules
//!
//! - Means and variances are computed with compensated summation
//!   ([`crate::math`]); per-item compute times are routinely sub-microsecond
//!   and naive addition measurably drifts at that scale.
//! - With twenty or more samples, the single largest and single smallest
//!   compute times are dropped before aggregation (trimmed mean), so a
//!   one-off scheduler hiccup cannot skew the plan.
//! - Heterogeneity is the coefficient of variation of the (untrimmed)
//!   compute times; a workload above 0.5 is flagged heterogeneous and the
//!   engine halves its chunk size in response.

use std::time::Duration;

use crate::entities::SampleMeasurement;
use crate::math;

/// Coefficient-of-variation threshold above which a workload is flagged
/// heterogeneous.
pub const HETEROGENEITY_THRESHOLD: f64 = 0.5;

/// Minimum sample count before the trimmed mean drops extrema.
const TRIM_THRESHOLD: usize = 20;

/// Aggregated measurements of one profiling run.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadProfile {
    mean_compute: Duration,
    mean_encode_input: Duration,
    mean_encode_output: Duration,
    output_size_estimate: u64,
    heterogeneity: f64,
    sample_count: usize,
    encoder_failed: bool,
    stopped_early: bool,
}

impl WorkloadProfile {
    /// Aggregates raw sample measurements into a profile.
    ///
    /// # Arguments
    /// * `samples` - At least one measurement, in observation order
    /// * `encoder_failed` - Whether any encode call failed during sampling
    /// * `stopped_early` - Whether the wall-clock budget cut sampling short
    pub fn from_samples(
        samples: &[SampleMeasurement],
        encoder_failed: bool,
        stopped_early: bool,
    ) -> Self {
        let compute_secs: Vec<f64> = samples.iter().map(|s| s.compute.as_secs_f64()).collect();

        // Heterogeneity reflects the workload as observed, before trimming.
        let heterogeneity = math::coefficient_of_variation(&compute_secs);

        let trimmed = Self::trim_extrema(&compute_secs);
        let mean_compute = Duration::from_secs_f64(math::mean(&trimmed).max(0.0));

        let encode_input_secs: Vec<f64> =
            samples.iter().map(|s| s.encode_input.as_secs_f64()).collect();
        let encode_output_secs: Vec<f64> =
            samples.iter().map(|s| s.encode_output.as_secs_f64()).collect();
        let mean_encode_input = Duration::from_secs_f64(math::mean(&encode_input_secs).max(0.0));
        let mean_encode_output = Duration::from_secs_f64(math::mean(&encode_output_secs).max(0.0));

        let output_size_estimate = if encoder_failed
            || samples.iter().any(|s| s.output_bytes == u64::MAX)
        {
            u64::MAX
        } else {
            let sizes: Vec<f64> = samples.iter().map(|s| s.output_bytes as f64).collect();
            math::mean(&sizes).round() as u64
        };

        Self {
            mean_compute,
            mean_encode_input,
            mean_encode_output,
            output_size_estimate,
            heterogeneity,
            sample_count: samples.len(),
            encoder_failed,
            stopped_early,
        }
    }

    /// Drops the single largest and smallest value when the sample set is
    /// big enough for a trimmed mean.
    fn trim_extrema(values: &[f64]) -> Vec<f64> {
        if values.len() < TRIM_THRESHOLD {
            return values.to_vec();
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted[1..sorted.len() - 1].to_vec()
    }

    /// Robust mean compute time per item.
    pub fn mean_compute(&self) -> Duration {
        self.mean_compute
    }

    /// Mean time to encode one input item.
    pub fn mean_encode_input(&self) -> Duration {
        self.mean_encode_input
    }

    /// Mean time to encode one output item.
    pub fn mean_encode_output(&self) -> Duration {
        self.mean_encode_output
    }

    /// Combined per-item serialization cost.
    pub fn mean_transfer(&self) -> Duration {
        self.mean_encode_input + self.mean_encode_output
    }

    /// Estimated serialized output size per item. `u64::MAX` when the
    /// encoder failed and the size must be assumed infinite.
    pub fn output_size_estimate(&self) -> u64 {
        self.output_size_estimate
    }

    /// Coefficient of variation of per-item compute time.
    pub fn heterogeneity(&self) -> f64 {
        self.heterogeneity
    }

    /// Whether the workload's compute cost varies enough to matter for
    /// chunking.
    pub fn is_heterogeneous(&self) -> bool {
        self.heterogeneity > HETEROGENEITY_THRESHOLD
    }

    /// Number of samples aggregated (before trimming).
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Whether any encode call failed during sampling.
    pub fn encoder_failed(&self) -> bool {
        self.encoder_failed
    }

    /// Whether the wall-clock budget cut sampling short.
    pub fn stopped_early(&self) -> bool {
        self.stopped_early
    }
}
