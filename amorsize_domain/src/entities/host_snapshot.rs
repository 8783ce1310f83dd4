// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Host Snapshot Entity
//!
//! A point-in-time observation of the host the plan was decided against:
//! physical core count, available memory, and the worker-spawn model. The
//! snapshot is captured once per planning call and then serves two roles:
//!
//! 1. It feeds the cost model and decision engine directly.
//! 2. It is embedded into every cache record, where it gates later reuse -
//!    a cached plan is only compatible with a host whose spawn model
//!    matches and whose core count is at least the recorded one.
//!
//! The second rule is deliberately one-sided. Reusing a plan decided on a
//! smaller machine remains safe (it merely underestimates the parallelism
//! the bigger machine could sustain), while reusing a plan decided on a
//! bigger machine could oversubscribe this one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::SpawnModel;

/// Captured host attributes used in planning and cache compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSnapshot {
    physical_cores: usize,
    available_memory_bytes: u64,
    spawn_model: SpawnModel,
}

impl HostSnapshot {
    /// Conservative fallback when host probing fails: one core, 512 MiB,
    /// spawned workers.
    pub fn conservative_fallback() -> Self {
        Self {
            physical_cores: 1,
            available_memory_bytes: 512 * 1024 * 1024,
            spawn_model: SpawnModel::Spawned,
        }
    }

    /// Creates a snapshot from probed values.
    ///
    /// # Arguments
    /// * `physical_cores` - Physical core count (floored at 1)
    /// * `available_memory_bytes` - Bytes of memory available to new workers
    /// * `spawn_model` - Process-creation semantics of this host
    pub fn new(physical_cores: usize, available_memory_bytes: u64, spawn_model: SpawnModel) -> Self {
        Self {
            physical_cores: physical_cores.max(1),
            available_memory_bytes,
            spawn_model,
        }
    }

    /// Physical core count at capture time.
    pub fn physical_cores(&self) -> usize {
        self.physical_cores
    }

    /// Available memory at capture time, in bytes.
    pub fn available_memory_bytes(&self) -> u64 {
        self.available_memory_bytes
    }

    /// Worker-spawn model of the captured host.
    pub fn spawn_model(&self) -> SpawnModel {
        self.spawn_model
    }

    /// Compatibility predicate for cached plans.
    ///
    /// `self` is the snapshot recorded in the cache entry; `current` is the
    /// host asking to reuse it. Compatible when the spawn-model tags are
    /// identical and the recorded core count does not exceed the current
    /// one. Available memory is deliberately not compared: it fluctuates
    /// per-run and the engine re-checks memory ceilings at decision time
    /// anyway.
    pub fn is_compatible_with(&self, current: &HostSnapshot) -> bool {
        self.spawn_model == current.spawn_model && self.physical_cores <= current.physical_cores
    }
}

impl fmt::Display for HostSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cores, {} MiB available, {} workers",
            self.physical_cores,
            self.available_memory_bytes / (1024 * 1024),
            self.spawn_model
        )
    }
}
