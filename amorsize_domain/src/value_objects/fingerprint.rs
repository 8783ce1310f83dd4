// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Workload Fingerprint Value Object
//!
//! This module provides the content-addressed key that identifies a class
//! of workloads across planning calls, processes, and hosts. Two workloads
//! with the same fingerprint are assumed interchangeable for the purpose of
//! planning, so the fingerprint deliberately discretizes its inputs:
//!
//! - **Function identity** - the module-qualified name and optional content
//!   digest from the [`Describe`](crate::services::Describe) capability
//! - **Size bucket** - `⌊log₁₀(max(n, 1))⌋`, so a 12,000-item workload and
//!   a 90,000-item workload share a bucket while a 120,000-item one does not
//! - **Magnitude bucket** - the typical serialized item length, discretized
//!   into five coarse classes from `tiny` (< 64 B) to `huge` (≥ 1 MiB)
//! - **Schema version** - bumping it makes every previously cached plan a
//!   clean miss after a planning-format change
//!
//! ## Derivation
//!
//! The four components feed a SHA-256 digest truncated to 128 bits.
//! Collisions across distinct work functions are astronomically unlikely at
//! that width, and truncating a cryptographic hash preserves its
//! distribution. The derivation is pure: equal inputs produce equal
//! fingerprints on every host, architecture, and run.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::value_objects::FunctionIdentity;

/// Version of the fingerprint derivation scheme. Part of the hash input, so
/// bumping it invalidates every cached plan at once.
pub const FINGERPRINT_SCHEMA_VERSION: u16 = 1;

/// Order-of-magnitude bucket for the workload's item count.
///
/// `⌊log₁₀(max(n, 1))⌋` computed in integer arithmetic, so there is no
/// floating-point boundary jitter at powers of ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SizeBucket(u32);

impl SizeBucket {
    /// Buckets an item count.
    pub fn for_item_count(n: usize) -> Self {
        let mut n = n.max(1);
        let mut bucket = 0u32;
        while n >= 10 {
            n /= 10;
            bucket += 1;
        }
        Self(bucket)
    }

    /// The bucket ordinal (0 for 1..=9 items, 1 for 10..=99, ...).
    pub fn ordinal(&self) -> u32 {
        self.0
    }
}

/// Coarse class of the typical serialized byte length of one input item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeBucket {
    /// Less than 64 bytes
    Tiny,
    /// 64 bytes up to 1 KiB
    Small,
    /// 1 KiB up to 64 KiB
    Medium,
    /// 64 KiB up to 1 MiB
    Large,
    /// 1 MiB and above
    Huge,
}

impl MagnitudeBucket {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    /// Buckets a serialized item length in bytes.
    pub fn for_item_bytes(bytes: u64) -> Self {
        if bytes < 64 {
            MagnitudeBucket::Tiny
        } else if bytes < Self::KIB {
            MagnitudeBucket::Small
        } else if bytes < 64 * Self::KIB {
            MagnitudeBucket::Medium
        } else if bytes < Self::MIB {
            MagnitudeBucket::Large
        } else {
            MagnitudeBucket::Huge
        }
    }

    /// Stable single-byte tag fed into the fingerprint digest.
    pub fn tag(&self) -> u8 {
        match self {
            MagnitudeBucket::Tiny => 0,
            MagnitudeBucket::Small => 1,
            MagnitudeBucket::Medium => 2,
            MagnitudeBucket::Large => 3,
            MagnitudeBucket::Huge => 4,
        }
    }
}

impl fmt::Display for MagnitudeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MagnitudeBucket::Tiny => "tiny",
            MagnitudeBucket::Small => "small",
            MagnitudeBucket::Medium => "medium",
            MagnitudeBucket::Large => "large",
            MagnitudeBucket::Huge => "huge",
        };
        write!(f, "{}", name)
    }
}

/// Content-addressed key identifying a workload class.
///
/// A 128-bit digest over the bucketed workload shape and the work
/// function's identity. Pure, deterministic, side-effect-free.
///
/// # Key Features
///
/// - **Stable**: Equal inputs yield equal fingerprints across runs and hosts
/// - **Bucketed**: Similar workloads share a fingerprint by construction
/// - **Compact**: 16 bytes, rendered as 32 lowercase hex characters for
///   file names and shared-store keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Derives the fingerprint for a workload class.
    ///
    /// # Arguments
    /// * `identity` - Work function identity from the `Describe` capability
    /// * `workload_size` - Number of input items (bucketed before hashing)
    /// * `item_magnitude_bytes` - Typical serialized item length (bucketed
    ///   before hashing)
    pub fn derive(
        identity: &FunctionIdentity,
        workload_size: usize,
        item_magnitude_bytes: u64,
    ) -> Self {
        let size_bucket = SizeBucket::for_item_count(workload_size);
        let magnitude_bucket = MagnitudeBucket::for_item_bytes(item_magnitude_bytes);
        Self::from_buckets(identity, size_bucket, magnitude_bucket)
    }

    /// Derives the fingerprint from already-bucketed components.
    pub fn from_buckets(
        identity: &FunctionIdentity,
        size_bucket: SizeBucket,
        magnitude_bucket: MagnitudeBucket,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_SCHEMA_VERSION.to_le_bytes());
        // Length-prefix the variable-width fields so that ("ab", "c") and
        // ("a", "bc") cannot collide.
        let name = identity.qualified_name().as_bytes();
        hasher.update((name.len() as u64).to_le_bytes());
        hasher.update(name);
        match identity.content_digest() {
            Some(digest) => {
                hasher.update([1u8]);
                hasher.update((digest.len() as u64).to_le_bytes());
                hasher.update(digest.as_bytes());
            }
            None => hasher.update([0u8]),
        }
        hasher.update(size_bucket.ordinal().to_le_bytes());
        hasher.update([magnitude_bucket.tag()]);

        let digest = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self(bytes)
    }

    /// The raw 16-byte digest.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex rendering used in cache file names and store keys.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
