// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Shared Decision Cache
//!
//! The optional cross-host cache tier: the same logical contract as the
//! local tier, spoken over a [`KeyValueTransport`]. Keys are namespaced by
//! a configurable prefix and carry the record schema version; values are
//! the same JSON cache-entry payload the local tier stores, without the
//! binary header - the backing store enforces TTL natively, so the header's
//! expiry bookkeeping would be dead weight.
//!
//! ## Degradation Policy
//!
//! No shared-cache failure may reach the planning caller as an error.
//! Every transport failure is converted to [`CacheLookup::BackendDown`] or
//! a swallowed save, logged at warning grade, and the coordinator falls
//! through to the local tier as if the shared tier were absent.
//!
//! ## Availability Memoization
//!
//! [`SharedDecisionCache::available`] is consulted on the hot path before
//! every lookup, so the liveness probe is memoized for one second behind a
//! mutex (see [`CachedFlag`]). One probe per window, fleet-wide traffic
//! notwithstanding.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use amorsize_domain::{
    AmorsizeError, CacheEntry, CacheLookup, Decision, DecisionCache, Fingerprint, HostSnapshot,
    MissReason, CACHE_SCHEMA_VERSION,
};

use super::availability::CachedFlag;
use super::transport::KeyValueTransport;

/// Cross-host decision store over a key/value transport.
pub struct SharedDecisionCache {
    transport: Arc<dyn KeyValueTransport>,
    key_prefix: String,
    availability: CachedFlag,
}

impl SharedDecisionCache {
    /// Wraps a transport under a key namespace.
    ///
    /// # Arguments
    /// * `transport` - The backing key/value store client
    /// * `key_prefix` - Namespace prepended to every key
    pub fn new(transport: Arc<dyn KeyValueTransport>, key_prefix: impl Into<String>) -> Self {
        Self {
            transport,
            key_prefix: key_prefix.into(),
            availability: CachedFlag::default(),
        }
    }

    /// True when a liveness probe has succeeded within the last second.
    ///
    /// The probe result is memoized for that second; concurrent callers
    /// share a single probe.
    pub fn available(&self) -> bool {
        self.availability.get_or_probe(|| match self.transport.ping() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "shared cache liveness probe failed");
                false
            }
        })
    }

    fn key_for(&self, fingerprint: &Fingerprint) -> String {
        format!(
            "{}:{}-{}",
            self.key_prefix,
            CACHE_SCHEMA_VERSION,
            fingerprint.to_hex()
        )
    }
}

impl DecisionCache for SharedDecisionCache {
    fn load(&self, fingerprint: &Fingerprint, current_host: &HostSnapshot) -> CacheLookup {
        let key = self.key_for(fingerprint);
        let bytes = match self.transport.get(&key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return CacheLookup::Miss(MissReason::NotFound),
            Err(e) => {
                warn!(key = %key, error = %e, "shared cache load failed; degrading to local tier");
                return CacheLookup::BackendDown(e.to_string());
            }
        };

        let entry = match CacheEntry::from_json(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                // A malformed shared value is some other writer's bug;
                // delete it so the fleet stops tripping over it.
                warn!(key = %key, error = %e, "corrupt shared cache value removed");
                let _ = self.transport.delete(std::slice::from_ref(&key));
                return CacheLookup::Miss(MissReason::Corrupt);
            }
        };

        if entry.schema_version() != CACHE_SCHEMA_VERSION {
            return CacheLookup::Miss(MissReason::SchemaMismatch);
        }
        if !entry.is_compatible_with(current_host) {
            return CacheLookup::Miss(MissReason::HostMismatch);
        }

        CacheLookup::Hit(entry.into_decision())
    }

    fn save(
        &self,
        fingerprint: &Fingerprint,
        decision: &Decision,
        host: &HostSnapshot,
        ttl: Duration,
    ) -> Result<(), AmorsizeError> {
        let key = self.key_for(fingerprint);
        let entry = CacheEntry::new(decision.clone(), *host);
        let payload = entry.to_json()?;
        self.transport.setex(&key, ttl, &payload).map_err(|e| {
            warn!(key = %key, error = %e, "shared cache save failed");
            AmorsizeError::backend_unavailable(e.to_string())
        })
    }

    fn clear(&self, pattern: &str) -> Result<usize, AmorsizeError> {
        let wire_pattern = format!("{}:{}", self.key_prefix, pattern);
        let keys = self
            .transport
            .keys(&wire_pattern)
            .map_err(|e| AmorsizeError::backend_unavailable(e.to_string()))?;
        if keys.is_empty() {
            return Ok(0);
        }
        let removed = self
            .transport
            .delete(&keys)
            .map_err(|e| AmorsizeError::backend_unavailable(e.to_string()))?;
        Ok(removed as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::transport::memory::InMemoryTransport;
    use amorsize_domain::{FunctionIdentity, SpawnModel};

    fn fingerprint(name: &str) -> Fingerprint {
        Fingerprint::derive(&FunctionIdentity::named(name), 1_000, 100)
    }

    fn host() -> HostSnapshot {
        HostSnapshot::new(8, 8 << 30, SpawnModel::Forked)
    }

    fn decision() -> Decision {
        Decision::serial(10, "workload too small")
    }

    fn cache_over(transport: Arc<InMemoryTransport>) -> SharedDecisionCache {
        SharedDecisionCache::new(transport, "amorsize")
    }

    #[test]
    fn test_save_then_load_roundtrips() {
        let transport = Arc::new(InMemoryTransport::new());
        let cache = cache_over(Arc::clone(&transport));
        let fp = fingerprint("f");

        cache
            .save(&fp, &decision(), &host(), Duration::from_secs(60))
            .unwrap();
        match cache.load(&fp, &host()) {
            CacheLookup::Hit(d) => assert_eq!(d, decision()),
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[test]
    fn test_keys_are_namespaced_and_versioned() {
        let transport = Arc::new(InMemoryTransport::new());
        let cache = cache_over(Arc::clone(&transport));
        let fp = fingerprint("f");
        cache
            .save(&fp, &decision(), &host(), Duration::from_secs(60))
            .unwrap();

        let keys = transport.keys("amorsize:*").unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(
            keys[0],
            format!("amorsize:{}-{}", CACHE_SCHEMA_VERSION, fp.to_hex())
        );
    }

    #[test]
    fn test_transport_outage_degrades_not_errors() {
        let transport = Arc::new(InMemoryTransport::new());
        let cache = cache_over(Arc::clone(&transport));
        transport.set_failing(true);

        match cache.load(&fingerprint("f"), &host()) {
            CacheLookup::BackendDown(detail) => assert!(detail.contains("offline")),
            other => panic!("expected BackendDown, got {other:?}"),
        }
        assert!(!cache.available());
    }

    #[test]
    fn test_corrupt_shared_value_is_deleted_and_missed() {
        let transport = Arc::new(InMemoryTransport::new());
        let cache = cache_over(Arc::clone(&transport));
        let fp = fingerprint("f");
        transport
            .setex(&cache.key_for(&fp), Duration::from_secs(60), b"{broken")
            .unwrap();

        assert_eq!(
            cache.load(&fp, &host()),
            CacheLookup::Miss(MissReason::Corrupt)
        );
        assert!(transport.is_empty());
    }

    #[test]
    fn test_host_mismatch_is_a_miss() {
        let transport = Arc::new(InMemoryTransport::new());
        let cache = cache_over(Arc::clone(&transport));
        let fp = fingerprint("f");
        let big_host = HostSnapshot::new(32, 8 << 30, SpawnModel::Forked);
        cache
            .save(&fp, &decision(), &big_host, Duration::from_secs(60))
            .unwrap();

        assert_eq!(
            cache.load(&fp, &host()),
            CacheLookup::Miss(MissReason::HostMismatch)
        );
    }

    #[test]
    fn test_clear_removes_namespaced_entries() {
        let transport = Arc::new(InMemoryTransport::new());
        let cache = cache_over(Arc::clone(&transport));
        for name in ["a", "b"] {
            cache
                .save(&fingerprint(name), &decision(), &host(), Duration::from_secs(60))
                .unwrap();
        }
        // A foreign key in the same store survives the namespaced clear.
        transport
            .setex("other:1-ff", Duration::from_secs(60), b"{}")
            .unwrap();

        assert_eq!(cache.clear("*").unwrap(), 2);
        assert_eq!(transport.len(), 1);
    }

    #[test]
    fn test_availability_memoizes_probes() {
        let transport = Arc::new(InMemoryTransport::new());
        let cache = cache_over(Arc::clone(&transport));

        assert!(cache.available());
        assert!(cache.available());
        assert!(cache.available());
        assert_eq!(transport.ping_count(), 1);
    }
}
