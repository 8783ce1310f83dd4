// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Decision Cache Port
//!
//! The storage contract both cache tiers implement. The port speaks in
//! domain terms - fingerprints in, decisions out - and encodes the
//! degradation story as a sum type rather than an error channel: a lookup
//! is a hit, a miss with a reason, or a backend outage the coordinator
//! falls through.

use std::fmt;
use std::time::Duration;

use crate::entities::{Decision, HostSnapshot};
use crate::value_objects::Fingerprint;
use crate::AmorsizeError;

/// Why a cache lookup failed to produce a reusable decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// No entry stored under the fingerprint.
    NotFound,
    /// An entry existed but outlived its TTL (and was removed).
    Expired,
    /// The recorded host snapshot is incompatible with the current host.
    HostMismatch,
    /// The record format version does not match this build.
    SchemaMismatch,
    /// The stored bytes were malformed (and were removed).
    Corrupt,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MissReason::NotFound => "not found",
            MissReason::Expired => "expired",
            MissReason::HostMismatch => "host mismatch",
            MissReason::SchemaMismatch => "schema mismatch",
            MissReason::Corrupt => "corrupt entry",
        };
        write!(f, "{}", text)
    }
}

/// Outcome of one cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// A valid, compatible, unexpired decision.
    Hit(Decision),
    /// No reusable decision; the reason says why.
    Miss(MissReason),
    /// The backend itself failed. Only the shared tier produces this; the
    /// coordinator degrades to the next tier.
    BackendDown(String),
}

impl CacheLookup {
    /// True for [`CacheLookup::Hit`].
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

/// Storage contract of a cache tier.
pub trait DecisionCache: Send + Sync {
    /// Looks up the decision for a fingerprint, validating expiry and host
    /// compatibility against `current_host`.
    fn load(&self, fingerprint: &Fingerprint, current_host: &HostSnapshot) -> CacheLookup;

    /// Stores a decision under a fingerprint with the given TTL.
    fn save(
        &self,
        fingerprint: &Fingerprint,
        decision: &Decision,
        host: &HostSnapshot,
        ttl: Duration,
    ) -> Result<(), AmorsizeError>;

    /// Removes entries whose fingerprint matches `pattern` (`*` clears
    /// everything; a trailing `*` matches a hex prefix). Returns the
    /// number of entries removed.
    fn clear(&self, pattern: &str) -> Result<usize, AmorsizeError>;
}
