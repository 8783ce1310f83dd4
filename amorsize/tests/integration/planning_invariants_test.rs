// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Planning Invariant Tests
//!
//! Property-based validation of the decision engine's universal
//! invariants: every plan it can possibly emit respects the worker-count,
//! chunk-size, and speedup constraints regardless of workload shape, host
//! shape, or measured costs.

use std::time::Duration;

use proptest::prelude::*;

use amorsize::{ExecutorKind, HostSnapshot, SpawnModel};
use amorsize_domain::entities::CostEstimate;
use amorsize_domain::services::DecisionEngine;

fn arbitrary_estimate() -> impl Strategy<Value = CostEstimate> {
    (
        0u64..5_000_000,       // compute ns
        0u64..5_000_000,       // transfer ns
        0u64..(1u64 << 40),    // per-worker memory
        any::<bool>(),         // heterogeneous
    )
        .prop_map(|(compute_ns, transfer_ns, memory, heterogeneous)| CostEstimate {
            per_item_compute: Duration::from_nanos(compute_ns),
            per_item_transfer: Duration::from_nanos(transfer_ns),
            per_worker_memory: memory,
            nominal_chunk: 1,
            heterogeneous,
            encoder_failed: false,
        })
}

fn arbitrary_host() -> impl Strategy<Value = HostSnapshot> {
    (
        1usize..=64,
        (256u64 << 20)..(64u64 << 30),
        prop_oneof![Just(SpawnModel::Forked), Just(SpawnModel::Spawned)],
    )
        .prop_map(|(cores, memory, spawn)| HostSnapshot::new(cores, memory, spawn))
}

proptest! {
    /// 1 ≤ worker_count ≤ physical_cores, for every reachable plan.
    #[test]
    fn prop_worker_count_bounded_by_cores(
        estimate in arbitrary_estimate(),
        host in arbitrary_host(),
        n in 0usize..1_000_000,
    ) {
        let decision = DecisionEngine::new().decide(&estimate, &host, n);
        prop_assert!(decision.worker_count().count() >= 1);
        prop_assert!(decision.worker_count().count() <= host.physical_cores());
    }

    /// Serial plans always have one worker and the whole workload as one
    /// chunk.
    #[test]
    fn prop_serial_plans_are_degenerate(
        estimate in arbitrary_estimate(),
        host in arbitrary_host(),
        n in 0usize..1_000_000,
    ) {
        let decision = DecisionEngine::new().decide(&estimate, &host, n);
        if decision.executor_kind() == ExecutorKind::Serial {
            prop_assert_eq!(decision.worker_count().count(), 1);
            prop_assert_eq!(decision.chunk_size().items(), n.max(1));
        }
    }

    /// chunk_size x worker_count never exceeds the workload (when the
    /// workload is at least pool-sized).
    #[test]
    fn prop_chunks_never_overallocate(
        estimate in arbitrary_estimate(),
        host in arbitrary_host(),
        n in 0usize..1_000_000,
    ) {
        let decision = DecisionEngine::new().decide(&estimate, &host, n);
        let w = decision.worker_count().count();
        prop_assert!(
            decision.chunk_size().items() * w <= n.max(w),
            "chunk {} x {} workers vs workload {}",
            decision.chunk_size().items(), w, n
        );
    }

    /// Estimated speedup is at least 1.0; anything predicted below the
    /// profitability threshold was rewritten to serial.
    #[test]
    fn prop_speedup_at_least_one(
        estimate in arbitrary_estimate(),
        host in arbitrary_host(),
        n in 0usize..1_000_000,
    ) {
        let decision = DecisionEngine::new().decide(&estimate, &host, n);
        prop_assert!(decision.estimated_speedup() >= 1.0);
        if decision.executor_kind().is_parallel() {
            prop_assert!(decision.estimated_speedup() >= 1.05);
        }
    }

    /// A single-core host never receives a parallel plan.
    #[test]
    fn prop_single_core_is_always_serial(
        estimate in arbitrary_estimate(),
        n in 0usize..1_000_000,
    ) {
        let host = HostSnapshot::new(1, 8 << 30, SpawnModel::Forked);
        let decision = DecisionEngine::new().decide(&estimate, &host, n);
        prop_assert_eq!(decision.executor_kind(), ExecutorKind::Serial);
    }
}

mod boundaries {
    use super::*;

    fn estimate_ms(compute_ms: u64) -> CostEstimate {
        CostEstimate {
            per_item_compute: Duration::from_millis(compute_ms),
            per_item_transfer: Duration::from_micros(1),
            per_worker_memory: 1 << 20,
            nominal_chunk: 1,
            heterogeneous: false,
            encoder_failed: false,
        }
    }

    fn host() -> HostSnapshot {
        HostSnapshot::new(8, 8 << 30, SpawnModel::Forked)
    }

    #[test]
    fn test_zero_items_yields_serial_unit_chunk() {
        let decision = DecisionEngine::new().decide(&estimate_ms(1), &host(), 0);
        assert_eq!(decision.executor_kind(), ExecutorKind::Serial);
        assert_eq!(decision.worker_count().count(), 1);
        assert_eq!(decision.chunk_size().items(), 1);
    }

    #[test]
    fn test_one_item_is_serial() {
        let decision = DecisionEngine::new().decide(&estimate_ms(1), &host(), 1);
        assert_eq!(decision.executor_kind(), ExecutorKind::Serial);
    }

    #[test]
    fn test_memory_starved_host_is_serial() {
        let mut estimate = estimate_ms(1);
        estimate.per_worker_memory = u64::MAX;
        let decision = DecisionEngine::new().decide(&estimate, &host(), 100_000);
        assert_eq!(decision.executor_kind(), ExecutorKind::Serial);
    }

    #[test]
    fn test_immeasurable_compute_is_serial_with_advisory() {
        let mut estimate = estimate_ms(0);
        estimate.per_item_transfer = Duration::from_micros(50);
        let decision = DecisionEngine::new().decide(&estimate, &host(), 1_000_000);
        assert_eq!(decision.executor_kind(), ExecutorKind::Serial);
        assert!(decision
            .advisories()
            .iter()
            .any(|a| a == "function too fast to measure"));
    }
}
