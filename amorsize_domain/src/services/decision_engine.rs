// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Decision Engine Service
//!
//! The policy that turns a [`CostEstimate`] into a [`Decision`]. Stateless;
//! a pure function of its inputs.
//!
//! ## Policy, Evaluated In Order
//!
//! 1. **Tiny workload short-circuit.** Too few items, or a serial run
//!    cheaper than the startup floor: serial.
//! 2. **Transfer-dominated.** Serialization tax above half the compute
//!    cost: prefer threads over processes (and fall through to serial if
//!    even threads don't pay).
//! 3. **Memory ceiling.** Available memory caps the width; a width below
//!    one means serial.
//! 4. **Ideal width.** Argmin of predicted parallel time over widths up to
//!    the core count, ties toward fewer workers.
//! 5. **Final width.** Minimum of ideal width, memory width, core count,
//!    and workload size.
//! 6. **Chunking.** Four chunks per worker, halved for heterogeneous
//!    workloads.
//! 7. **Executor kind.** Process pool by default, thread pool when step 2
//!    chose it, serial when forced.
//! 8. **Profitability.** Predicted speedup below 1.05 rewrites the plan to
//!    serial.
//!
//! ## Failure Semantics
//!
//! Input validation failures produce a serial decision with an advisory;
//! they are never fatal to the caller. A plan is always emitted.

use std::time::Duration;

use crate::entities::{CostEstimate, Decision, HostSnapshot};
use crate::services::CostModel;
use crate::value_objects::{ChunkSize, ExecutorKind, WorkerCount};

/// Workload sizes at or below this threshold are never worth parallelism.
pub const SMALL_N_THRESHOLD: usize = 100;

/// Serial runs cheaper than this never amortize pool startup.
pub const PARALLEL_STARTUP_FLOOR: Duration = Duration::from_millis(50);

/// Minimum predicted speedup for a parallel plan to survive.
pub const MIN_PROFITABLE_SPEEDUP: f64 = 1.05;

/// Fraction of available memory the engine is willing to commit.
pub const MEMORY_CEILING_FACTOR: f64 = 0.9;

/// Transfer-to-compute ratio above which a workload is transfer-dominated.
pub const TRANSFER_DOMINANCE_RATIO: f64 = 0.5;

/// The planning policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEngine {
    cost_model: CostModel,
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self {
            cost_model: CostModel::new(),
        }
    }

    /// Produces a plan for a workload characterized by `estimate` on
    /// `host`.
    ///
    /// # Arguments
    /// * `estimate` - Derived workload costs
    /// * `host` - Snapshot captured at decision time
    /// * `workload_size` - Total item count
    pub fn decide(
        &self,
        estimate: &CostEstimate,
        host: &HostSnapshot,
        workload_size: usize,
    ) -> Decision {
        let n = workload_size;

        if n == 0 {
            return Decision::serial(n, "workload too small")
                .with_advisory("invalid input: empty workload");
        }

        let mut advisories: Vec<String> = Vec::new();
        if estimate.encoder_failed {
            advisories
                .push("encoder failed during profiling - memory estimate is pessimistic".into());
        }

        // Rule 1: tiny workload short-circuit.
        if n <= SMALL_N_THRESHOLD {
            return Self::attach(Decision::serial(n, "workload too small"), advisories);
        }

        // Immeasurable compute would also sit under the startup floor, but
        // it deserves its own advisory: the plan is serial because nothing
        // could be measured, not because the workload is known to be cheap.
        if estimate.compute_immeasurable() {
            advisories.push("function too fast to measure".into());
            return Self::attach(
                Decision::serial(n, "per-item cost immeasurably small"),
                advisories,
            );
        }

        let t_serial = self.cost_model.serial_duration(estimate, n);
        if t_serial < PARALLEL_STARTUP_FLOOR {
            return Self::attach(Decision::serial(n, "workload too small"), advisories);
        }

        // Rule 2: transfer-dominated workloads avoid the process-pool tax.
        let transfer_dominated = estimate.per_item_transfer.as_secs_f64()
            > estimate.per_item_compute.as_secs_f64() * TRANSFER_DOMINANCE_RATIO;
        let executor = if transfer_dominated {
            advisories.push(
                "transfer-dominated workload - preferring threads over processes".into(),
            );
            ExecutorKind::ThreadPool
        } else {
            ExecutorKind::ProcessPool
        };

        // Rule 3: memory ceiling.
        let cores = host.physical_cores();
        let budget = (host.available_memory_bytes() as f64) * MEMORY_CEILING_FACTOR;
        let w_mem = if estimate.per_worker_memory == 0 {
            cores
        } else {
            (budget / (estimate.per_worker_memory as f64)).floor() as usize
        };
        if w_mem < 1 {
            advisories.push("insufficient memory for even one pooled worker".into());
            return Self::attach(
                Decision::serial(n, "memory ceiling forbids parallel workers"),
                advisories,
            );
        }

        // Rule 4: ideal width by argmin of predicted time, ties toward
        // fewer workers.
        let spawn_model = host.spawn_model();
        let mut w_ideal = 1usize;
        let mut best = self
            .cost_model
            .parallel_duration(estimate, n, 1, executor, spawn_model);
        for w in 2..=cores {
            let t = self
                .cost_model
                .parallel_duration(estimate, n, w, executor, spawn_model);
            if t < best {
                best = t;
                w_ideal = w;
            }
        }

        // Rule 5: final width.
        let width = w_ideal.min(w_mem).min(cores).min(n);
        if width <= 1 {
            return Self::attach(
                Decision::serial(n, "one worker is the predicted optimum"),
                advisories,
            );
        }
        let worker_count = WorkerCount::new(width).capped_at(cores);

        // Rule 6: chunking, halved under heterogeneity.
        let mut chunk = ChunkSize::for_workload(n, worker_count.count());
        if estimate.heterogeneous {
            chunk = chunk.halved();
            advisories.push("heterogeneous workload - smaller chunks for balance".into());
        }

        // Rule 8: profitability check against the final plan.
        let t_parallel = self.cost_model.parallel_duration(
            estimate,
            n,
            worker_count.count(),
            executor,
            spawn_model,
        );
        let speedup = if t_parallel.is_zero() {
            1.0
        } else {
            t_serial.as_secs_f64() / t_parallel.as_secs_f64()
        };
        if speedup < MIN_PROFITABLE_SPEEDUP {
            advisories.push("parallelism would not be profitable".into());
            return Self::attach(
                Decision::serial(n, "predicted speedup below profitability threshold"),
                advisories,
            );
        }

        let reason = format!(
            "{} items at {:.1}us/item: {} across {} predicted {:.2}x over serial",
            n,
            estimate.per_item_compute.as_secs_f64() * 1e6,
            executor,
            worker_count,
            speedup
        );
        Self::attach(
            Decision::new(executor, worker_count, chunk, speedup, reason),
            advisories,
        )
    }

    fn attach(mut decision: Decision, advisories: Vec<String>) -> Decision {
        for advisory in advisories {
            decision.push_advisory(advisory);
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::SpawnModel;

    fn estimate(
        compute: Duration,
        transfer: Duration,
        per_worker_memory: u64,
        heterogeneous: bool,
    ) -> CostEstimate {
        CostEstimate {
            per_item_compute: compute,
            per_item_transfer: transfer,
            per_worker_memory,
            nominal_chunk: 1,
            heterogeneous,
            encoder_failed: false,
        }
    }

    fn host(cores: usize, memory: u64) -> HostSnapshot {
        HostSnapshot::new(cores, memory, SpawnModel::Forked)
    }

    fn engine() -> DecisionEngine {
        DecisionEngine::new()
    }

    /// Scenario S1: ten items always plan serial with the canonical reason.
    #[test]
    fn test_tiny_workload_short_circuit() {
        let est = estimate(Duration::from_millis(1), Duration::ZERO, 1024, false);
        let d = engine().decide(&est, &host(8, 8 << 30), 10);
        assert_eq!(d.executor_kind(), ExecutorKind::Serial);
        assert_eq!(d.worker_count().count(), 1);
        assert_eq!(d.chunk_size().items(), 10);
        assert_eq!(d.estimated_speedup(), 1.0);
        assert_eq!(d.reason(), "workload too small");
    }

    /// Fast serial runs below the startup floor stay serial even when the
    /// item count is large.
    #[test]
    fn test_startup_floor_short_circuit() {
        // 10_000 items at 1us each: 10ms serial, under the 50ms floor.
        let est = estimate(Duration::from_micros(1), Duration::ZERO, 1024, false);
        let d = engine().decide(&est, &host(8, 8 << 30), 10_000);
        assert_eq!(d.executor_kind(), ExecutorKind::Serial);
        assert_eq!(d.reason(), "workload too small");
    }

    /// Scenario S2: compute-heavy workload fills all eight cores with a
    /// process pool.
    #[test]
    fn test_compute_heavy_uses_process_pool() {
        let est = estimate(
            Duration::from_millis(1),
            Duration::from_micros(1),
            1 << 20,
            false,
        );
        let d = engine().decide(&est, &host(8, 8 << 30), 100_000);
        assert_eq!(d.executor_kind(), ExecutorKind::ProcessPool);
        assert_eq!(d.worker_count().count(), 8);
        assert_eq!(d.chunk_size().items(), 3125);
        assert!(d.estimated_speedup() > 7.0 && d.estimated_speedup() < 8.0);
    }

    /// Scenario S3: transfer-dominated workload prefers threads.
    #[test]
    fn test_transfer_dominated_prefers_threads() {
        let est = estimate(
            Duration::from_micros(10),
            Duration::from_micros(100),
            1 << 20,
            false,
        );
        let d = engine().decide(&est, &host(8, 8 << 30), 100_000);
        assert_eq!(d.executor_kind(), ExecutorKind::ThreadPool);
        assert!(d
            .advisories()
            .iter()
            .any(|a| a.contains("transfer-dominated")));
    }

    /// Scenario S4: memory ceiling caps the width at two workers.
    #[test]
    fn test_memory_ceiling_caps_width() {
        let est = estimate(
            Duration::from_millis(1),
            Duration::from_micros(1),
            3 << 30, // 3 GiB per worker
            false,
        );
        let d = engine().decide(&est, &host(8, 8 << 30), 10_000);
        // floor(8 GiB * 0.9 / 3 GiB) = 2
        assert_eq!(d.worker_count().count(), 2);
        assert_eq!(d.chunk_size().items(), 1250);
        assert!(d.executor_kind().is_parallel());
    }

    /// Scenario S5: heterogeneity halves the chunk and leaves a trace.
    #[test]
    fn test_heterogeneous_workload_halves_chunks() {
        let est = estimate(
            Duration::from_millis(1),
            Duration::from_micros(1),
            1 << 20,
            true,
        );
        let d = engine().decide(&est, &host(8, 8 << 30), 5_000);
        assert!(d.executor_kind().is_parallel());
        // nominal 5_000 / (8 * 4) = 156, halved to 78
        assert_eq!(d.chunk_size().items(), 78);
        assert!(d
            .advisories()
            .iter()
            .any(|a| a.contains("heterogeneous workload")));
    }

    #[test]
    fn test_memory_exhaustion_forces_serial() {
        let est = estimate(
            Duration::from_millis(1),
            Duration::ZERO,
            u64::MAX,
            false,
        );
        let d = engine().decide(&est, &host(8, 8 << 30), 100_000);
        assert_eq!(d.executor_kind(), ExecutorKind::Serial);
        assert!(d
            .advisories()
            .iter()
            .any(|a| a.contains("insufficient memory")));
    }

    #[test]
    fn test_single_core_host_always_serial() {
        let est = estimate(
            Duration::from_millis(1),
            Duration::from_micros(1),
            1024,
            false,
        );
        let d = engine().decide(&est, &host(1, 8 << 30), 100_000);
        assert_eq!(d.executor_kind(), ExecutorKind::Serial);
        assert_eq!(d.worker_count().count(), 1);
        assert_eq!(d.chunk_size().items(), 100_000);
    }

    #[test]
    fn test_immeasurable_compute_yields_advisory() {
        let est = estimate(Duration::ZERO, Duration::from_micros(100), 1024, false);
        let d = engine().decide(&est, &host(8, 8 << 30), 1_000_000);
        assert_eq!(d.executor_kind(), ExecutorKind::Serial);
        assert!(d
            .advisories()
            .iter()
            .any(|a| a == "function too fast to measure"));
    }

    #[test]
    fn test_empty_workload_is_serial_with_advisory() {
        let est = estimate(Duration::from_millis(1), Duration::ZERO, 1024, false);
        let d = engine().decide(&est, &host(8, 8 << 30), 0);
        assert_eq!(d.executor_kind(), ExecutorKind::Serial);
        assert_eq!(d.worker_count().count(), 1);
        assert_eq!(d.chunk_size().items(), 1);
        assert!(d.advisories().iter().any(|a| a.contains("invalid input")));
    }

    /// Universal invariants hold across a sweep of workload shapes.
    #[test]
    fn test_invariants_across_sweep() {
        let eng = engine();
        for cores in [1usize, 2, 4, 8, 32] {
            for n in [0usize, 1, 10, 101, 1_000, 100_000] {
                for compute_us in [0u64, 1, 100, 1_000] {
                    for transfer_us in [0u64, 1, 200] {
                        let est = estimate(
                            Duration::from_micros(compute_us),
                            Duration::from_micros(transfer_us),
                            1 << 20,
                            false,
                        );
                        let h = host(cores, 8 << 30);
                        let d = eng.decide(&est, &h, n);

                        assert!(d.worker_count().count() >= 1);
                        assert!(d.worker_count().count() <= cores);
                        assert!(d.estimated_speedup() >= 1.0);
                        if d.executor_kind() == ExecutorKind::Serial {
                            assert_eq!(d.worker_count().count(), 1);
                            assert_eq!(d.chunk_size().items(), n.max(1));
                        }
                        if n >= d.worker_count().count() {
                            assert!(
                                d.chunk_size().items() * d.worker_count().count()
                                    <= n.max(d.worker_count().count())
                            );
                        }
                    }
                }
            }
        }
    }
}
