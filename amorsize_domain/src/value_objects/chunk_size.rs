// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunk Size Value Object
//!
//! The number of input items handed to one worker in one dispatch. Chunking
//! amortizes dispatch overhead across items while keeping enough chunks in
//! flight for the pool to balance load; heterogeneous workloads get smaller
//! chunks so a single slow item cannot strand a worker's whole allotment.
//!
//! Unlike a byte-oriented chunk, this value counts *items*: the advisor
//! plans over an ordered sequence of uniform inputs and leaves the byte
//! layout to the workload driver.
//!
//! ## Invariants
//!
//! - A chunk always holds at least one item
//! - For any plan, `chunk_size × worker_count ≤ workload_size` whenever
//!   `workload_size ≥ worker_count` (the engine derives chunks by dividing
//!   the workload across workers, never by padding it)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value object representing the items-per-dispatch granularity of a plan.
///
/// # Key Features
///
/// - **Validation**: A chunk can never be empty
/// - **Type Safety**: Cannot be confused with worker counts or item counts
/// - **Immutability**: Once created, chunk sizes cannot be modified
/// - **Serialization**: Full JSON serialization support for cache payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkSize {
    items: usize,
}

impl ChunkSize {
    /// Minimum chunk size (one item per dispatch)
    pub const MIN_ITEMS: usize = 1;

    /// Target number of chunks per worker for load balancing
    pub const TARGET_CHUNKS_PER_WORKER: usize = 4;

    /// Creates a new chunk size, clamping up to the minimum of one item.
    pub fn new(items: usize) -> Self {
        Self {
            items: items.max(Self::MIN_ITEMS),
        }
    }

    /// Derives the nominal chunk size for a workload divided across
    /// `workers`, targeting [`TARGET_CHUNKS_PER_WORKER`] chunks per worker.
    ///
    /// # Arguments
    /// * `workload_size` - Total number of input items
    /// * `workers` - Plan width the chunks will be dispatched across
    pub fn for_workload(workload_size: usize, workers: usize) -> Self {
        let per_worker = workload_size / (workers.max(1) * Self::TARGET_CHUNKS_PER_WORKER);
        Self::new(per_worker)
    }

    /// Returns a copy with half as many items, bounded below by one item.
    ///
    /// Applied when the profile flags the workload heterogeneous: smaller
    /// chunks keep a slow item from stranding a worker's whole allotment.
    pub fn halved(&self) -> Self {
        Self::new(self.items / 2)
    }

    /// Gets the chunk size in items
    pub fn items(&self) -> usize {
        self.items
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self::new(Self::MIN_ITEMS)
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} items/chunk", self.items)
    }
}

impl From<usize> for ChunkSize {
    fn from(items: usize) -> Self {
        Self::new(items)
    }
}

impl From<ChunkSize> for usize {
    fn from(chunk: ChunkSize) -> Self {
        chunk.items
    }
}
