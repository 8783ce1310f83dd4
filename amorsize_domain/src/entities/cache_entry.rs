// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cache Entry Entity
//!
//! The immutable record a cache tier stores for one fingerprint: the
//! decision, the host snapshot it was decided against, a creation
//! timestamp, and the schema version of the record format.
//!
//! The JSON payload is deliberately self-describing and identical across
//! both cache tiers: the local tier prepends a small binary header (magic,
//! version, timestamp, TTL) for cheap validity checks without JSON parsing,
//! while the shared tier stores the bare payload and lets the backing
//! store enforce TTL natively.
//!
//! Expiry is a property of the *storage*, not the entry: the entry records
//! when it was created, and each tier decides staleness against its own
//! TTL configuration.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::entities::{Decision, HostSnapshot};
use crate::AmorsizeError;

/// Version of the cache record format. Lives in file names, binary
/// headers, shared-store keys, and the JSON payload itself, so any format
/// change presents as a clean miss everywhere at once.
pub const CACHE_SCHEMA_VERSION: u16 = 1;

/// Immutable record of a past decision plus its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    schema_version: u16,
    decision: Decision,
    host: HostSnapshot,
    created_at_micros: i64,
}

impl CacheEntry {
    /// Creates an entry stamped with the current wall-clock time.
    pub fn new(decision: Decision, host: HostSnapshot) -> Self {
        Self::with_timestamp(decision, host, Utc::now().timestamp_micros())
    }

    /// Creates an entry with an explicit creation timestamp (Unix
    /// microseconds).
    pub fn with_timestamp(decision: Decision, host: HostSnapshot, created_at_micros: i64) -> Self {
        Self {
            schema_version: CACHE_SCHEMA_VERSION,
            decision,
            host,
            created_at_micros,
        }
    }

    /// Record format version this entry was written with.
    pub fn schema_version(&self) -> u16 {
        self.schema_version
    }

    /// The stored decision.
    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    /// Consumes the entry, yielding the stored decision.
    pub fn into_decision(self) -> Decision {
        self.decision
    }

    /// Host snapshot the decision was made against.
    pub fn host(&self) -> &HostSnapshot {
        &self.host
    }

    /// Creation time in Unix microseconds.
    pub fn created_at_micros(&self) -> i64 {
        self.created_at_micros
    }

    /// Whether the entry has outlived `ttl` as of `now_micros`.
    pub fn is_expired(&self, now_micros: i64, ttl: Duration) -> bool {
        let ttl_micros = ttl.as_micros().min(i64::MAX as u128) as i64;
        now_micros.saturating_sub(self.created_at_micros) > ttl_micros
    }

    /// Whether this entry's recorded host permits reuse on `current`.
    pub fn is_compatible_with(&self, current: &HostSnapshot) -> bool {
        self.host.is_compatible_with(current)
    }

    /// Serializes the entry to the shared JSON payload format.
    pub fn to_json(&self) -> Result<Vec<u8>, AmorsizeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserializes an entry from the shared JSON payload format.
    pub fn from_json(bytes: &[u8]) -> Result<Self, AmorsizeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
