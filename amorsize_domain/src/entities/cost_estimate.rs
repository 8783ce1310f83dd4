// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cost Estimate
//!
//! The cost model's characterization of a workload against a concrete
//! host: per-item compute and transfer costs, the memory one worker is
//! expected to hold, and the heterogeneity flag. The decision engine
//! consumes this and nothing else - the raw profile never reaches it.

use std::time::Duration;

/// Derived workload costs handed from the cost model to the decision
/// engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    /// Robust mean compute time per item.
    pub per_item_compute: Duration,
    /// Per-item serialization cost (input encode + output encode); the tax
    /// a process-pool pays per item, near-zero for a thread pool.
    pub per_item_transfer: Duration,
    /// Expected peak bytes held by one worker, derived from the output
    /// size estimate, the nominal chunk, and the safety margin.
    /// `u64::MAX` when the encoder failed and memory must be assumed
    /// unbounded.
    pub per_worker_memory: u64,
    /// Nominal chunk (items) the memory figure was computed against.
    pub nominal_chunk: usize,
    /// Whether per-item compute cost varies enough to matter for chunking.
    pub heterogeneous: bool,
    /// Whether the estimate rests on a failed encoder and is therefore
    /// pessimistic.
    pub encoder_failed: bool,
}

impl CostEstimate {
    /// True when the per-item compute cost was too small to measure.
    pub fn compute_immeasurable(&self) -> bool {
        self.per_item_compute.is_zero()
    }
}
