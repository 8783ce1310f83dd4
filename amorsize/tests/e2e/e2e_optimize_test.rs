// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # End-to-End Optimize Tests
//!
//! Full planning calls through the coordinator: profiling, decision
//! making, both cache tiers, and the guarantees that hold when the same
//! workload is planned twice - the second call must skip profiling and
//! return a byte-for-byte equivalent decision.

use std::sync::Arc;

use tempfile::TempDir;

use amorsize::infrastructure::cache::transport::memory::InMemoryTransport;
use amorsize::{AmorsizeError, ExecutorKind, FnWorker, JsonCodec, OptimizeOptions};

use crate::common::{busy, coordinator_local_only, coordinator_with_shared};

fn workload() -> Vec<u64> {
    vec![50_000; 2_000]
}

fn busy_worker() -> FnWorker<impl Fn(&u64) -> Result<u64, AmorsizeError>> {
    FnWorker::new("e2e.busy", |x: &u64| Ok(busy(*x)))
}

/// A worker that must never be profiled; planning it means the cache
/// failed to serve.
fn sentinel_worker() -> FnWorker<impl Fn(&u64) -> Result<u64, AmorsizeError>> {
    FnWorker::new("e2e.busy", |_: &u64| -> Result<u64, AmorsizeError> {
        panic!("cache must have served this call")
    })
}

#[test]
fn test_second_run_skips_profiling_and_is_byte_equivalent() {
    let dir = TempDir::new().unwrap();
    let coordinator = coordinator_local_only(dir.path());
    let items = workload();
    let opts = OptimizeOptions::default();

    let first = coordinator
        .optimize(&busy_worker(), &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
        .unwrap();
    let second = coordinator
        .optimize(&sentinel_worker(), &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
        .unwrap();

    // Byte-for-byte equivalence of the serialized decisions.
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[test]
fn test_shared_tier_serves_a_second_host() {
    // Host A profiles and publishes; host B (separate local cache, same
    // shared store) must plan without profiling.
    let transport = Arc::new(InMemoryTransport::new());
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    let host_a = coordinator_with_shared(dir_a.path(), Arc::clone(&transport));
    let host_b = coordinator_with_shared(dir_b.path(), Arc::clone(&transport));

    let items = workload();
    let opts = OptimizeOptions::default();
    let published = host_a
        .optimize(&busy_worker(), &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
        .unwrap();

    let served = host_b
        .optimize(&sentinel_worker(), &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
        .unwrap();
    assert_eq!(published, served);
}

#[test]
fn test_local_hit_propagates_to_shared_tier() {
    let transport = Arc::new(InMemoryTransport::new());
    let dir = TempDir::new().unwrap();
    let items = workload();
    let opts = OptimizeOptions::default();

    // First: a local-only coordinator profiles and fills its local tier.
    let local_only = coordinator_local_only(dir.path());
    local_only
        .optimize(&busy_worker(), &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
        .unwrap();

    // Then: the same installation gains a shared tier. A local hit must be
    // written outward so the fleet benefits.
    let with_shared = coordinator_with_shared(dir.path(), Arc::clone(&transport));
    assert!(transport.is_empty());
    with_shared
        .optimize(&sentinel_worker(), &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
        .unwrap();
    assert_eq!(transport.len(), 1);
}

#[test]
fn test_shared_outage_degrades_to_local_end_to_end() {
    let transport = Arc::new(InMemoryTransport::new());
    let dir = TempDir::new().unwrap();
    let coordinator = coordinator_with_shared(dir.path(), Arc::clone(&transport));
    let items = workload();
    let opts = OptimizeOptions::default();

    transport.set_failing(true);
    let decision = coordinator
        .optimize(&busy_worker(), &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
        .unwrap();
    assert!(decision
        .advisories()
        .iter()
        .any(|a| a.contains("shared cache unavailable")));

    // The local tier still serves the repeat call during the outage.
    let repeat = coordinator
        .optimize(&sentinel_worker(), &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
        .unwrap();
    assert_eq!(decision, repeat);
}

#[test]
fn test_clear_cache_forces_a_fresh_profile() {
    let transport = Arc::new(InMemoryTransport::new());
    let dir = TempDir::new().unwrap();
    let coordinator = coordinator_with_shared(dir.path(), Arc::clone(&transport));
    let items = workload();
    let opts = OptimizeOptions::default();

    coordinator
        .optimize(&busy_worker(), &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
        .unwrap();
    let removed = coordinator.clear_cache("*").unwrap();
    assert_eq!(removed, 1);
    assert!(transport.is_empty());

    // The sentinel now IS profiled, so its panic surfaces as a
    // user-function failure: proof the caches are empty.
    let result = coordinator.optimize(
        &sentinel_worker(),
        &items,
        &JsonCodec::new(),
        &JsonCodec::new(),
        &opts,
    );
    assert!(matches!(result, Err(AmorsizeError::UserFunctionFailed(_))));
}

#[test]
fn test_compute_heavy_workload_plans_parallel_end_to_end() {
    let dir = TempDir::new().unwrap();
    let coordinator = coordinator_local_only(dir.path());
    // ~1ms per item of busy work, 2000 items: well past the startup floor
    // on the synthetic 8-core host.
    let items: Vec<u64> = vec![400_000; 2_000];
    let decision = coordinator
        .optimize(
            &busy_worker(),
            &items,
            &JsonCodec::new(),
            &JsonCodec::new(),
            &OptimizeOptions::default(),
        )
        .unwrap();

    assert!(decision.executor_kind().is_parallel());
    assert!(decision.worker_count().count() > 1);
    assert!(decision.worker_count().count() <= 8);
    assert!(decision.estimated_speedup() > 1.05);
    // Four chunks per worker over 2000 items.
    assert!(decision.chunk_size().items() >= 2_000 / (8 * 4) / 2);
}

#[test]
fn test_ttl_override_reaches_the_shared_store() {
    let transport = Arc::new(InMemoryTransport::new());
    let dir = TempDir::new().unwrap();
    let coordinator = coordinator_with_shared(dir.path(), Arc::clone(&transport));
    let items = workload();
    let opts = OptimizeOptions {
        ttl_override: Some(std::time::Duration::ZERO),
        ..OptimizeOptions::default()
    };

    coordinator
        .optimize(&busy_worker(), &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
        .unwrap();
    // A zero TTL means the shared store expired the entry immediately.
    assert!(transport.is_empty());
}
