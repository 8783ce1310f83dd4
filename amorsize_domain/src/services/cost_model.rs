// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cost Model Service
//!
//! Converts a measured [`WorkloadProfile`] plus a [`HostSnapshot`] into the
//! derived figures the decision engine reasons about, and owns the timing
//! model that predicts serial and parallel wall-clock durations.
//!
//! ## The Timing Model
//!
//! ```text
//! T_serial(n)              = n · t_exec
//! T_parallel(n, w, exec)   = n/w · t_exec + startup(exec, w) + overhead(exec) · n
//! ```
//!
//! where `overhead(process_pool)` is the measured per-item transfer cost
//! (the serialization tax paid at the pool boundary) and
//! `overhead(thread_pool)` is a small constant for queue handoff. Startup
//! is linear in the worker count, with the per-worker cost depending on the
//! host's spawn model: forked workers inherit memory copy-on-write and
//! start cheaply, spawned workers boot a fresh image.
//!
//! ## Memory Figure
//!
//! `per_worker_memory = output_size × nominal_chunk × safety_margin`. The
//! nominal chunk is the chunk a full-width plan would use
//! (`max(1, ⌊n / (cores × 4)⌋)`); the engine divides available memory by
//! this figure to find the widest plan that fits. A failed encoder makes
//! the output size - and therefore the memory figure - infinite, which the
//! engine resolves to a serial plan.

use std::time::Duration;

use crate::entities::{CostEstimate, HostSnapshot, WorkloadProfile};
use crate::value_objects::{ChunkSize, ExecutorKind, SpawnModel};

/// Multiplier biasing the per-worker memory estimate upward.
pub const MEMORY_SAFETY_MARGIN: f64 = 2.0;

/// Per-worker startup cost of a forked process pool.
pub const PROCESS_STARTUP_FORKED: Duration = Duration::from_millis(8);

/// Per-worker startup cost of a spawned process pool.
pub const PROCESS_STARTUP_SPAWNED: Duration = Duration::from_millis(60);

/// Per-worker startup cost of a thread pool.
pub const THREAD_STARTUP: Duration = Duration::from_micros(50);

/// Per-item queue-handoff overhead of a thread pool.
pub const THREAD_ITEM_OVERHEAD: Duration = Duration::from_nanos(200);

/// Derives cost estimates and predicts execution durations.
///
/// Stateless; pure function of its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostModel;

impl CostModel {
    pub fn new() -> Self {
        Self
    }

    /// Derives the decision engine's inputs from a profile and host.
    ///
    /// # Arguments
    /// * `profile` - Aggregated profiling measurements
    /// * `host` - Snapshot captured at decision time
    /// * `workload_size` - Total item count
    pub fn estimate(
        &self,
        profile: &WorkloadProfile,
        host: &HostSnapshot,
        workload_size: usize,
    ) -> CostEstimate {
        let nominal_chunk = ChunkSize::for_workload(workload_size, host.physical_cores()).items();

        let output_size = profile.output_size_estimate();
        let per_worker_memory = if output_size == u64::MAX {
            u64::MAX
        } else {
            let scaled = output_size.saturating_mul(nominal_chunk as u64);
            let with_margin = (scaled as f64) * MEMORY_SAFETY_MARGIN;
            if with_margin >= u64::MAX as f64 {
                u64::MAX
            } else {
                with_margin as u64
            }
        };

        CostEstimate {
            per_item_compute: profile.mean_compute(),
            per_item_transfer: profile.mean_transfer(),
            per_worker_memory,
            nominal_chunk,
            heterogeneous: profile.is_heterogeneous(),
            encoder_failed: profile.encoder_failed(),
        }
    }

    /// Predicted serial wall-clock time for `n` items.
    pub fn serial_duration(&self, estimate: &CostEstimate, workload_size: usize) -> Duration {
        Duration::from_secs_f64(
            estimate.per_item_compute.as_secs_f64() * (workload_size as f64),
        )
    }

    /// Predicted parallel wall-clock time for `n` items across `workers`
    /// workers under the given executor.
    ///
    /// Serial executors are answered with the serial prediction so that
    /// callers can compare uniformly.
    pub fn parallel_duration(
        &self,
        estimate: &CostEstimate,
        workload_size: usize,
        workers: usize,
        executor: ExecutorKind,
        spawn_model: SpawnModel,
    ) -> Duration {
        let n = workload_size as f64;
        let w = workers.max(1) as f64;
        let compute = estimate.per_item_compute.as_secs_f64();

        let (startup_per_worker, per_item_overhead) = match executor {
            ExecutorKind::Serial => return self.serial_duration(estimate, workload_size),
            ExecutorKind::ThreadPool => (
                THREAD_STARTUP.as_secs_f64(),
                THREAD_ITEM_OVERHEAD.as_secs_f64(),
            ),
            ExecutorKind::ProcessPool => {
                let startup = match spawn_model {
                    SpawnModel::Forked => PROCESS_STARTUP_FORKED,
                    SpawnModel::Spawned => PROCESS_STARTUP_SPAWNED,
                };
                (startup.as_secs_f64(), estimate.per_item_transfer.as_secs_f64())
            }
        };

        let total = n / w * compute + w * startup_per_worker + n * per_item_overhead;
        Duration::from_secs_f64(total.max(0.0))
    }
}
