// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Shared Cache Transport Port
//!
//! The wire contract the shared tier speaks: a key/value store with string
//! keys, binary values, native TTL expiry, prefix enumeration, and a
//! liveness verb. The shared cache never sees sockets - it sees this trait,
//! which keeps the degradation policy testable without a server.
//!
//! Implementations:
//! - [`resp::RespTransport`] - a minimal RESP (Redis protocol) TCP client
//!   with connect/read/write timeouts
//! - [`memory::InMemoryTransport`] - an in-process store with fault
//!   injection, for tests

use std::time::Duration;

use thiserror::Error;

pub mod memory;
pub mod resp;

/// Transport-level failures. Always absorbed by the shared cache tier;
/// never visible to planning callers.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, read, or write failure (including timeouts).
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer answered outside the wire protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The peer answered with an explicit error reply.
    #[error("server error: {0}")]
    Server(String),

    /// The endpoint configuration is unusable.
    #[error("bad endpoint: {0}")]
    BadEndpoint(String),

    /// Fault injected by a test.
    #[error("injected fault: {0}")]
    Injected(String),
}

/// Key/value wire contract of the shared cache backing store.
pub trait KeyValueTransport: Send + Sync {
    /// Fetches a value; `None` when the key is absent or expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TransportError>;

    /// Stores a value with a native expiry.
    fn setex(&self, key: &str, ttl: Duration, value: &[u8]) -> Result<(), TransportError>;

    /// Deletes keys, returning how many existed.
    fn delete(&self, keys: &[String]) -> Result<u64, TransportError>;

    /// Enumerates keys matching `pattern` (`prefix*` or a literal key).
    fn keys(&self, pattern: &str) -> Result<Vec<String>, TransportError>;

    /// Liveness probe.
    fn ping(&self) -> Result<(), TransportError>;
}
