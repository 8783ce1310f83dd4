// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Worker Count Value Object
//!
//! This module provides the worker count value object used by every plan
//! the advisor emits. A worker count is always at least one and is bounded
//! above by an absolute ceiling that protects against runaway
//! oversubscription even when the host reports an implausible core count.
//!
//! ## Overview
//!
//! The worker count system provides:
//!
//! - **Bounded allocation**: Values are clamped into a valid operational
//!   range at construction
//! - **Host awareness**: Convenience constructors cap the count at the
//!   host's physical core count
//! - **Type safety**: A `WorkerCount` cannot be confused with a chunk size
//!   or an item count in a plan's signature
//! - **Serialization**: Plans round-trip through the cache tiers, so the
//!   value object serializes with `serde`
//!
//! ## Invariants
//!
//! - `1 ≤ count ≤ MAX_WORKERS` always holds after construction
//! - A plan's worker count never exceeds the physical core count of the
//!   host snapshot it was decided against; the decision engine enforces
//!   this with [`WorkerCount::capped_at`]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of workers a plan dispatches to.
///
/// # Benefits Over Raw Numbers
///
/// - **Type Safety**: `WorkerCount` cannot be confused with other numeric
///   plan fields
/// - **Domain Semantics**: Clear intent in plan signatures and cache
///   payloads
/// - **Bounded**: Enforces minimum and maximum limits for reliable
///   operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerCount {
    count: usize,
}

impl WorkerCount {
    /// Minimum number of workers (always at least 1)
    pub const MIN_WORKERS: usize = 1;

    /// Maximum number of workers (prevents resource exhaustion on hosts
    /// that report implausible core counts)
    pub const MAX_WORKERS: usize = 256;

    /// Creates a new WorkerCount, clamping into the valid range.
    ///
    /// # Arguments
    /// * `count` - Requested number of workers
    ///
    /// # Returns
    /// `WorkerCount` with value clamped to [`MIN_WORKERS`, `MAX_WORKERS`]
    pub fn new(count: usize) -> Self {
        Self {
            count: count.clamp(Self::MIN_WORKERS, Self::MAX_WORKERS),
        }
    }

    /// A single worker, the serial plan's width.
    pub fn serial() -> Self {
        Self::new(Self::MIN_WORKERS)
    }

    /// Returns the number of workers
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns a copy capped at the given physical core count.
    ///
    /// The decision engine calls this as its final width step so that
    /// `worker_count ≤ physical_cores` holds for every emitted plan.
    ///
    /// # Arguments
    /// * `physical_cores` - Core count from the host snapshot
    pub fn capped_at(&self, physical_cores: usize) -> Self {
        Self::new(self.count.min(physical_cores.max(Self::MIN_WORKERS)))
    }

    /// Returns true when this width means no parallel dispatch at all.
    pub fn is_serial(&self) -> bool {
        self.count == 1
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        Self::serial()
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} workers", self.count)
    }
}

impl From<usize> for WorkerCount {
    fn from(count: usize) -> Self {
        Self::new(count)
    }
}

impl From<WorkerCount> for usize {
    fn from(worker_count: WorkerCount) -> Self {
        worker_count.count
    }
}
