// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Memoized Availability Flag
//!
//! The shared tier's liveness probe sits on the hot planning path, so its
//! result is memoized for a short window. [`CachedFlag`] stores the
//! `(value, expiry)` pair behind a single mutex and holds that mutex
//! across the probe itself.
//!
//! Holding the lock during the probe is the point, not an accident: `k`
//! concurrent callers inside one TTL window must issue at most one network
//! probe, and the only way to guarantee that is to make the late arrivals
//! wait on the prober. The wait is bounded by the transport's socket
//! timeout. Every read acquires the lock - there is no fast-path stale
//! read outside it - so the memory-visibility story is simply the mutex;
//! no atomics, no ordering subtleties.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default memoization window for availability probes.
pub const DEFAULT_PROBE_TTL: Duration = Duration::from_secs(1);

/// A boolean whose refresh is rate-limited to one probe per TTL window.
pub struct CachedFlag {
    state: Mutex<Option<(bool, Instant)>>,
    ttl: Duration,
}

impl CachedFlag {
    /// Creates a flag with the given memoization window.
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Mutex::new(None),
            ttl,
        }
    }

    /// Returns the memoized value, or runs `probe` to refresh it when the
    /// window has lapsed.
    ///
    /// The lock is held for the duration of `probe`, so concurrent callers
    /// within one window observe exactly one probe.
    pub fn get_or_probe(&self, probe: impl FnOnce() -> bool) -> bool {
        let mut state = self.state.lock();
        if let Some((value, probed_at)) = *state {
            if probed_at.elapsed() < self.ttl {
                return value;
            }
        }
        let value = probe();
        *state = Some((value, Instant::now()));
        value
    }

    /// Drops the memoized value so the next read probes again. Used when
    /// the transport is reconfigured.
    pub fn invalidate(&self) {
        *self.state.lock() = None;
    }
}

impl Default for CachedFlag {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TTL)
    }
}
