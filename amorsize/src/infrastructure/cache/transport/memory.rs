// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # In-Memory Transport
//!
//! A process-local [`KeyValueTransport`] with native TTL semantics and
//! fault injection. This is the shared tier's test double: outage
//! behavior, availability memoization, and cross-"host" coherence tests
//! all run against it without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::{KeyValueTransport, TransportError};

struct StoredValue {
    bytes: Vec<u8>,
    expires_at: Instant,
}

/// In-process key/value store with TTL expiry and fault injection.
#[derive(Default)]
pub struct InMemoryTransport {
    store: Mutex<HashMap<String, StoredValue>>,
    failing: AtomicBool,
    ping_count: AtomicUsize,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches every subsequent operation to failure (or back).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of liveness probes received; availability-memoization tests
    /// assert on this.
    pub fn ping_count(&self) -> usize {
        self.ping_count.load(Ordering::SeqCst)
    }

    /// Number of live (unexpired) keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.store
            .lock()
            .values()
            .filter(|v| v.expires_at > now)
            .count()
    }

    /// True when no live keys remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_fault(&self) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(TransportError::Injected("transport offline".into()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueTransport for InMemoryTransport {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TransportError> {
        self.check_fault()?;
        let mut store = self.store.lock();
        match store.get(key) {
            Some(value) if value.expires_at > Instant::now() => Ok(Some(value.bytes.clone())),
            Some(_) => {
                store.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn setex(&self, key: &str, ttl: Duration, value: &[u8]) -> Result<(), TransportError> {
        self.check_fault()?;
        self.store.lock().insert(
            key.to_string(),
            StoredValue {
                bytes: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn delete(&self, keys: &[String]) -> Result<u64, TransportError> {
        self.check_fault()?;
        let mut store = self.store.lock();
        let mut removed = 0u64;
        for key in keys {
            if store.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>, TransportError> {
        self.check_fault()?;
        let now = Instant::now();
        let store = self.store.lock();
        let matches = |key: &str| -> bool {
            match pattern.strip_suffix('*') {
                Some(prefix) => key.starts_with(prefix),
                None => key == pattern,
            }
        };
        Ok(store
            .iter()
            .filter(|(k, v)| v.expires_at > now && matches(k))
            .map(|(k, _)| k.clone())
            .collect())
    }

    fn ping(&self) -> Result<(), TransportError> {
        self.ping_count.fetch_add(1, Ordering::SeqCst);
        self.check_fault()
    }
}
