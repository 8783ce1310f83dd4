// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Executor Kind Value Object
//!
//! The execution strategy a plan recommends to the workload driver. The
//! advisor never runs the workload itself; this value object is the contract
//! vocabulary between the decision engine and whatever pool implementation
//! the caller wires up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AmorsizeError;

/// Execution strategy recommended by a [`Decision`](crate::entities::Decision).
///
/// # Variants
///
/// - `Serial` - run on the calling thread; coordination overhead would
///   exceed the work saved
/// - `ThreadPool` - shared-memory workers; near-zero per-item transfer cost
/// - `ProcessPool` - isolated workers; pays the per-item serialization tax
///   but sidesteps shared-state contention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorKind {
    Serial,
    ThreadPool,
    ProcessPool,
}

impl ExecutorKind {
    /// Returns true when the plan involves more than one worker.
    pub fn is_parallel(&self) -> bool {
        !matches!(self, ExecutorKind::Serial)
    }

    /// Returns true when workers share the caller's address space, making
    /// per-item transfer cost negligible.
    pub fn shares_memory(&self) -> bool {
        matches!(self, ExecutorKind::Serial | ExecutorKind::ThreadPool)
    }

    /// Stable lowercase name used in reason strings and cache payloads.
    pub fn name(&self) -> &'static str {
        match self {
            ExecutorKind::Serial => "serial",
            ExecutorKind::ThreadPool => "thread_pool",
            ExecutorKind::ProcessPool => "process_pool",
        }
    }
}

impl fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ExecutorKind {
    type Err = AmorsizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serial" => Ok(ExecutorKind::Serial),
            "thread_pool" => Ok(ExecutorKind::ThreadPool),
            "process_pool" => Ok(ExecutorKind::ProcessPool),
            other => Err(AmorsizeError::invalid_input(format!(
                "unknown executor kind: {}",
                other
            ))),
        }
    }
}
