// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Amorsize Domain
//!
//! Pure planning logic for the amorsize adaptive parallelism advisor:
//! given a user-supplied compute function and an input dataset, decide how
//! that work should be executed - worker count, chunk size, and executor
//! kind - so that wall-clock time is minimized without exhausting memory
//! or paying more coordination overhead than the work saves.
//!
//! ## Architecture
//!
//! This crate is the domain layer of a three-crate workspace, following
//! Domain-Driven Design principles:
//!
//! - **Value objects** - [`value_objects`]: fingerprints, worker counts,
//!   chunk sizes, executor kinds, spawn models, function identities
//! - **Entities** - [`entities`]: host snapshots, sample measurements,
//!   workload profiles, cost estimates, decisions, cache entries
//! - **Domain services** - [`services`]: the Profiler / CostModel /
//!   DecisionEngine pipeline plus the capability ports (work function,
//!   encoder, host)
//! - **Repository ports** - [`repositories`]: the cache-tier storage
//!   contract the infrastructure layer implements
//!
//! The domain performs no I/O beyond reading the monotonic clock while
//! profiling. Everything that touches the filesystem, the network, or the
//! operating system lives in the `amorsize` and `amorsize_bootstrap`
//! crates.
//!
//! ## Planning Pipeline
//!
//! ```text
//! Workload ──► Profiler ──► WorkloadProfile
//!                               │
//! HostSnapshot ──────────► CostModel ──► CostEstimate
//!                                            │
//!                                      DecisionEngine ──► Decision
//! ```

pub mod entities;
pub mod error;
pub mod math;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use error::AmorsizeError;

// Flat re-exports of the vocabulary types, so callers can reach the
// planning surface without memorizing the layer layout.
pub use entities::{
    CacheEntry, CostEstimate, Decision, HostSnapshot, SampleMeasurement, WorkloadProfile,
    CACHE_SCHEMA_VERSION,
};
pub use repositories::{CacheLookup, DecisionCache, MissReason};
pub use services::{
    Codec, CostModel, DecisionEngine, Describe, FnCodec, FnWorker, HostCapabilities, JsonCodec,
    Profiler, StaticHostCapabilities, Worker,
};
pub use value_objects::{
    ChunkSize, ExecutorKind, Fingerprint, FunctionIdentity, MagnitudeBucket, SizeBucket,
    SpawnModel, WorkerCount,
};
