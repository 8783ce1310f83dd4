// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Value Objects
//!
//! Immutable, validated domain values following Domain-Driven Design value
//! object patterns: identity-free, compared structurally, cheap to copy,
//! and safe to embed in cached plans.

pub mod chunk_size;
pub mod executor_kind;
pub mod fingerprint;
pub mod function_identity;
pub mod spawn_model;
pub mod worker_count;

pub use chunk_size::ChunkSize;
pub use executor_kind::ExecutorKind;
pub use fingerprint::{Fingerprint, MagnitudeBucket, SizeBucket, FINGERPRINT_SCHEMA_VERSION};
pub use function_identity::FunctionIdentity;
pub use spawn_model::SpawnModel;
pub use worker_count::WorkerCount;
