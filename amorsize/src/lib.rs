// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Amorsize
//!
//! An adaptive parallelism advisor: give it a compute function and an
//! input dataset, and it recommends how the work should be executed -
//! worker count, chunk size, and whether to use process-level or
//! thread-level parallelism - so that wall-clock time is minimized without
//! exhausting memory or paying more coordination overhead than the work
//! saves.
//!
//! The advisor emits a [`Decision`]; it never executes the workload. An
//! external workload driver (process pool, thread pool) consumes the plan.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use amorsize::{Coordinator, OptimizeOptions};
//! use amorsize::infrastructure::AmorsizeConfig;
//! use amorsize::{FnWorker, JsonCodec};
//!
//! fn checksum(line: &String) -> Result<u64, amorsize::AmorsizeError> {
//!     Ok(line.bytes().map(u64::from).sum())
//! }
//!
//! let coordinator = Coordinator::from_config(&AmorsizeConfig::from_env())?;
//! let lines: Vec<String> = std::fs::read_to_string("input.txt")?
//!     .lines()
//!     .map(str::to_owned)
//!     .collect();
//!
//! let worker = FnWorker::new("examples.checksum", checksum);
//! let decision = coordinator.optimize(
//!     &worker,
//!     &lines,
//!     &JsonCodec::new(),
//!     &JsonCodec::new(),
//!     &OptimizeOptions::default(),
//! )?;
//!
//! println!("{decision}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Layout
//!
//! - [`application`] - the [`Coordinator`] façade and per-call options
//! - [`infrastructure`] - cache tiers, transports, configuration,
//!   diagnostics, logging
//! - The planning logic itself (profiler, cost model, decision engine,
//!   value objects) lives in `amorsize_domain` and is re-exported here

pub mod application;
pub mod infrastructure;

pub use application::{Coordinator, OptimizeOptions};
pub use infrastructure::{AmorsizeConfig, Diagnostics, TracingDiagnostics};

// Re-export the domain vocabulary so one `use amorsize::...` reaches the
// whole planning surface.
pub use amorsize_domain::{
    AmorsizeError, CacheEntry, CacheLookup, ChunkSize, Codec, Decision, DecisionCache,
    ExecutorKind, Fingerprint, FnCodec, FnWorker, FunctionIdentity, HostCapabilities,
    HostSnapshot, JsonCodec, MagnitudeBucket, MissReason, Profiler, SizeBucket, SpawnModel,
    WorkerCount, WorkloadProfile, Worker,
};

// Host probing re-export for embedders that want to inspect what the
// advisor sees.
pub use amorsize_bootstrap::SystemHostCapabilities;
