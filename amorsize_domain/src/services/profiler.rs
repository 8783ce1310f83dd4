// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Profiler Service
//!
//! The bounded sampling harness that measures what a workload actually
//! costs. It executes the user function on a small, serially-evaluated
//! prefix of the workload, timing three things per item - input encode,
//! compute, output encode - plus the encoded output size, and aggregates
//! the observations into a [`WorkloadProfile`].
//!
//! ## Why Serial, Why On The Calling Thread
//!
//! Profiling must measure *single-worker* cost: the cost model multiplies
//! the per-item figure out to `n` items and divides across `w` workers, so
//! any parallelism inside the profiler would contaminate the baseline with
//! exactly the coordination overhead the advisor is trying to predict.
//!
//! ## Sampling Bounds
//!
//! The sample count is `clamp(⌈n / 20⌉, 10, 100)`, additionally bounded by
//! the caller's `max_samples` and by the workload itself. An absolute
//! wall-clock budget (default 5 s) caps the harness: when the budget runs
//! out with at least three samples gathered, profiling stops early and the
//! partial profile is used; with fewer, the call surfaces a timeout error.
//! The budget is checked between samples - a single long-running sample is
//! never interrupted, so one pathological item can overshoot the budget by
//! its own duration.
//!
//! ## Failure Semantics
//!
//! - The work function failing on a sample aborts profiling: the caller's
//!   function is broken, and no amount of planning fixes that.
//! - The encoder failing does *not* abort. The measurement is recorded
//!   with an infinite output size, the profile is flagged, and the memory
//!   estimate downstream turns pessimistic.

use std::time::{Duration, Instant};

use crate::entities::{SampleMeasurement, WorkloadProfile};
use crate::services::{Codec, Worker};
use crate::AmorsizeError;

/// Smallest sample count the clamp rule allows.
pub const MIN_SAMPLES: usize = 10;

/// Largest sample count the clamp rule allows.
pub const MAX_SAMPLES: usize = 100;

/// Fewest samples a timed-out run may survive with.
pub const MIN_SAMPLES_ON_TIMEOUT: usize = 3;

/// Default wall-clock budget for one profiling run.
pub const DEFAULT_PROFILE_BUDGET: Duration = Duration::from_secs(5);

/// Default caller-facing sample cap.
pub const DEFAULT_MAX_SAMPLES: usize = 20;

/// Sampling harness configuration.
///
/// Stateless between runs; construct once and reuse, or build per call
/// from caller options.
#[derive(Debug, Clone, Copy)]
pub struct Profiler {
    max_samples: usize,
    budget: Duration,
}

impl Profiler {
    /// Creates a profiler with the default sample cap and budget.
    pub fn new() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            budget: DEFAULT_PROFILE_BUDGET,
        }
    }

    /// Creates a profiler with explicit limits.
    ///
    /// # Arguments
    /// * `max_samples` - Caller's sample cap, clamped into [10, 100]
    /// * `budget` - Absolute wall-clock budget for the whole run
    pub fn with_limits(max_samples: usize, budget: Duration) -> Self {
        Self {
            max_samples: max_samples.clamp(MIN_SAMPLES, MAX_SAMPLES),
            budget,
        }
    }

    /// The effective sample count for a workload of `n` items.
    ///
    /// `clamp(⌈n / 20⌉, 10, 100)`, bounded by the configured cap and by
    /// the workload itself.
    pub fn sample_count_for(&self, workload_size: usize) -> usize {
        let proportional = workload_size.div_ceil(20);
        proportional
            .clamp(MIN_SAMPLES, MAX_SAMPLES)
            .min(self.max_samples)
            .min(workload_size)
    }

    /// Profiles a workload by executing its function on a prefix of the
    /// items.
    ///
    /// Side effect: each sampled item is actually executed once; the
    /// outputs are measured and discarded.
    ///
    /// # Arguments
    /// * `worker` - The user function under measurement
    /// * `items` - The full workload; only a prefix is sampled
    /// * `input_codec` - Encoder for input items
    /// * `output_codec` - Encoder for the function's outputs
    ///
    /// # Errors
    /// * [`AmorsizeError::InvalidInput`] - Empty workload
    /// * [`AmorsizeError::UserFunctionFailed`] - The function failed on a
    ///   sample
    /// * [`AmorsizeError::ProfileTimeout`] - Budget exhausted with fewer
    ///   than three samples gathered
    pub fn profile<In, Out>(
        &self,
        worker: &dyn Worker<In, Out>,
        items: &[In],
        input_codec: &dyn Codec<In>,
        output_codec: &dyn Codec<Out>,
    ) -> Result<WorkloadProfile, AmorsizeError> {
        if items.is_empty() {
            return Err(AmorsizeError::invalid_input(
                "cannot profile an empty workload",
            ));
        }

        let target = self.sample_count_for(items.len());
        let started = Instant::now();
        let mut samples = Vec::with_capacity(target);
        let mut encoder_failed = false;
        let mut stopped_early = false;

        for (index, item) in items.iter().take(target).enumerate() {
            if started.elapsed() > self.budget {
                if samples.len() >= MIN_SAMPLES_ON_TIMEOUT {
                    stopped_early = true;
                    break;
                }
                return Err(AmorsizeError::profile_timeout(format!(
                    "budget of {:?} exhausted after {} of {} samples",
                    self.budget,
                    samples.len(),
                    target
                )));
            }

            let encode_input_started = Instant::now();
            let input_encoded = input_codec.encode(item);
            let encode_input = encode_input_started.elapsed();
            if input_encoded.is_err() {
                encoder_failed = true;
            }

            let compute_started = Instant::now();
            let output = worker.call(item).map_err(|e| {
                AmorsizeError::user_function_failed(format!("sample {}: {}", index, e))
            })?;
            let compute = compute_started.elapsed();

            let encode_output_started = Instant::now();
            let output_encoded = output_codec.encode(&output);
            let encode_output = encode_output_started.elapsed();

            let output_bytes = match output_encoded {
                Ok(bytes) => bytes.len() as u64,
                Err(_) => {
                    encoder_failed = true;
                    u64::MAX
                }
            };

            samples.push(SampleMeasurement {
                compute,
                encode_input,
                encode_output,
                output_bytes,
            });
        }

        Ok(WorkloadProfile::from_samples(
            &samples,
            encoder_failed,
            stopped_early,
        ))
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}
