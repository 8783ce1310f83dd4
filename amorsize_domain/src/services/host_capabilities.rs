// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Host Capabilities Port
//!
//! The read-only snapshot source through which the advisor sees the host.
//! Each accessor returns a fresh observation; callers treat values as
//! instantaneous and capture a [`HostSnapshot`] once per planning call.
//!
//! Implementations live outside the domain (the bootstrap crate probes the
//! operating system natively). Probe failures inside an implementation must
//! fall back to conservative defaults - one core, 512 MiB, spawned workers -
//! rather than surface as errors, because a degraded plan beats no plan.

use crate::entities::HostSnapshot;
use crate::value_objects::SpawnModel;

/// Read-only host observation port.
pub trait HostCapabilities: Send + Sync {
    /// Physical core count (at least 1).
    fn physical_cores(&self) -> usize;

    /// Bytes of memory currently available to new workers.
    fn available_memory_bytes(&self) -> u64;

    /// Process-creation semantics of this host.
    fn worker_spawn_model(&self) -> SpawnModel;

    /// Captures all three observations into one snapshot.
    fn snapshot(&self) -> HostSnapshot {
        HostSnapshot::new(
            self.physical_cores(),
            self.available_memory_bytes(),
            self.worker_spawn_model(),
        )
    }
}

/// Fixed-value implementation for tests and deterministic planning runs.
#[derive(Debug, Clone, Copy)]
pub struct StaticHostCapabilities {
    pub physical_cores: usize,
    pub available_memory_bytes: u64,
    pub spawn_model: SpawnModel,
}

impl HostCapabilities for StaticHostCapabilities {
    fn physical_cores(&self) -> usize {
        self.physical_cores.max(1)
    }

    fn available_memory_bytes(&self) -> u64 {
        self.available_memory_bytes
    }

    fn worker_spawn_model(&self) -> SpawnModel {
        self.spawn_model
    }
}
