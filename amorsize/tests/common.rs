// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Common Test Helpers
//!
//! Shared utilities for integration and end-to-end tests: a synthetic
//! host, a coordinator wired to temp storage and an in-memory shared
//! transport, and deterministic busy-work workers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use amorsize::infrastructure::cache::transport::memory::InMemoryTransport;
use amorsize::infrastructure::{LocalDecisionCache, RecordingDiagnostics, SharedDecisionCache};
use amorsize::{Coordinator, HostCapabilities, SpawnModel};
use amorsize_domain::StaticHostCapabilities;

/// Deterministic synthetic host: 8 forked cores, 8 GiB available.
pub fn synthetic_host() -> Arc<dyn HostCapabilities> {
    Arc::new(StaticHostCapabilities {
        physical_cores: 8,
        available_memory_bytes: 8 << 30,
        spawn_model: SpawnModel::Forked,
    })
}

/// Builds a coordinator over a temp-dir local tier and the given shared
/// transport.
pub fn coordinator_with_shared(
    cache_dir: &Path,
    transport: Arc<InMemoryTransport>,
) -> Coordinator {
    Coordinator::new(
        synthetic_host(),
        LocalDecisionCache::new(cache_dir, Duration::from_secs(3600)),
        Some(SharedDecisionCache::new(transport, "amorsize")),
        Arc::new(RecordingDiagnostics::new()),
        Duration::from_secs(3600),
    )
}

/// Builds a coordinator with the local tier only.
pub fn coordinator_local_only(cache_dir: &Path) -> Coordinator {
    Coordinator::new(
        synthetic_host(),
        LocalDecisionCache::new(cache_dir, Duration::from_secs(3600)),
        None,
        Arc::new(RecordingDiagnostics::new()),
        Duration::from_secs(3600),
    )
}

/// CPU-bound busy work the optimizer cannot elide.
pub fn busy(iterations: u64) -> u64 {
    let mut acc = 0u64;
    for i in 0..iterations {
        acc = acc.wrapping_mul(31).wrapping_add(i);
    }
    acc
}
