// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cache Tiers
//!
//! The two-tier recommendation cache: a per-host persistent file store and
//! an optional cross-host store over a key/value transport, plus the
//! memoized availability flag guarding the shared tier's hot path.

pub mod availability;
pub mod local;
pub mod shared;
pub mod transport;

pub use availability::CachedFlag;
pub use local::LocalDecisionCache;
pub use shared::SharedDecisionCache;
pub use transport::{KeyValueTransport, TransportError};
