// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Decision Entity
//!
//! The recommendation the advisor surfaces to the caller: which executor to
//! use, how many workers, how many items per dispatch, the predicted
//! speedup over serial execution, and the human-readable story of how the
//! plan came to be.
//!
//! A decision is the durable artifact of a planning call. It is what the
//! cache tiers store and what the external workload driver consumes; the
//! profile it was derived from is discarded. Serialization is therefore
//! part of the contract: a decision must round-trip through JSON without
//! loss so that a cache hit is byte-for-byte equivalent to the original.
//!
//! ## Advisories
//!
//! Recoverable diagnostics travel on the decision itself rather than
//! through an error channel: "heterogeneous workload - smaller chunks for
//! balance", "shared cache unavailable - continuing with local cache only",
//! and similar. The ordered list preserves the sequence in which the
//! conditions were detected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{ChunkSize, ExecutorKind, WorkerCount};

/// The plan recommendation surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    executor_kind: ExecutorKind,
    worker_count: WorkerCount,
    chunk_size: ChunkSize,
    estimated_speedup: f64,
    reason: String,
    advisories: Vec<String>,
}

impl Decision {
    /// Creates a parallel plan.
    ///
    /// # Arguments
    /// * `executor_kind` - Recommended executor
    /// * `worker_count` - Plan width
    /// * `chunk_size` - Items per dispatch
    /// * `estimated_speedup` - Predicted wall-clock gain over serial (≥ 1.0)
    /// * `reason` - One-line human explanation
    pub fn new(
        executor_kind: ExecutorKind,
        worker_count: WorkerCount,
        chunk_size: ChunkSize,
        estimated_speedup: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            executor_kind,
            worker_count,
            chunk_size,
            estimated_speedup: estimated_speedup.max(1.0),
            reason: reason.into(),
            advisories: Vec::new(),
        }
    }

    /// Creates a serial plan: one worker, the whole workload as a single
    /// chunk, unit speedup.
    ///
    /// # Arguments
    /// * `workload_size` - Item count; an empty workload still yields a
    ///   chunk size of one (a chunk can never be empty)
    /// * `reason` - One-line human explanation
    pub fn serial(workload_size: usize, reason: impl Into<String>) -> Self {
        Self::new(
            ExecutorKind::Serial,
            WorkerCount::serial(),
            ChunkSize::new(workload_size.max(1)),
            1.0,
            reason,
        )
    }

    /// Recommended executor.
    pub fn executor_kind(&self) -> ExecutorKind {
        self.executor_kind
    }

    /// Plan width.
    pub fn worker_count(&self) -> WorkerCount {
        self.worker_count
    }

    /// Items per dispatch.
    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    /// Predicted wall-clock gain over serial execution.
    pub fn estimated_speedup(&self) -> f64 {
        self.estimated_speedup
    }

    /// One-line human explanation of the plan.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Ordered recoverable diagnostics attached to the plan.
    pub fn advisories(&self) -> &[String] {
        &self.advisories
    }

    /// Appends one advisory, preserving detection order.
    pub fn push_advisory(&mut self, advisory: impl Into<String>) {
        self.advisories.push(advisory.into());
    }

    /// Builder-style advisory attachment.
    pub fn with_advisory(mut self, advisory: impl Into<String>) -> Self {
        self.push_advisory(advisory);
        self
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}, est. {:.2}x): {}",
            self.executor_kind, self.worker_count, self.chunk_size, self.estimated_speedup, self.reason
        )
    }
}
